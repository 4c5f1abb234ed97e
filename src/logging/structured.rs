//! Subscriber setup and document spans
//!
//! Console events go to stderr in compact form so reports printed on
//! stdout stay machine-readable. The optional file sink writes JSON lines
//! that carry the enclosing `document` and `part` spans, so every event can
//! be traced back to the file it came from.

use crate::config::LoggingConfig;
use crate::domain::{DocmaskError, Result};
use std::path::Path;
use tracing::{Level, Span};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Dependencies capped at `warn` unless `RUST_LOG` says otherwise
const QUIET_DEPENDENCIES: [&str; 5] = ["hyper", "reqwest", "rustls", "tokio_postgres", "calamine"];

/// Log file name prefix; the rotation date is appended
const LOG_FILE_PREFIX: &str = "docmask";

/// Guard that must be kept alive for the duration of the program
/// to ensure logs are flushed properly
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system based on configuration
///
/// `RUST_LOG` takes precedence over `log_level_str` when set.
///
/// # Example
///
/// ```no_run
/// use docmask::logging::init_logging;
/// use docmask::config::LoggingConfig;
///
/// let config = LoggingConfig::default();
/// let _guard = init_logging("info", &config).expect("Failed to initialize logging");
/// // Keep _guard alive for the duration of the program
/// ```
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let directives = filter_directives(parse_log_level(log_level_str)?);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter.clone());

    let (file_layer, file_guard) = match file_sink(config)? {
        Some((writer, guard)) => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(writer)
                .with_filter(env_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!(
        filter = %directives,
        log_dir = config.local_enabled.then_some(config.local_path.as_str()),
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Span covering the processing of one document
///
/// Closing the span records its duration in the file sink.
///
/// ```
/// use docmask::logging::document_span;
/// use std::path::Path;
///
/// let span = document_span(Path::new("계약서.docx"), "mask");
/// let _entered = span.enter();
/// tracing::info!("Processing document");
/// ```
pub fn document_span(path: &Path, operation: &'static str) -> Span {
    tracing::info_span!("document", file = %path.display(), operation)
}

/// Span covering one part of a package, nested in [`document_span`]
pub fn part_span(name: &str) -> Span {
    tracing::debug_span!("part", part = name)
}

fn filter_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    let mut directives = vec![format!("docmask={level}")];
    directives.extend(QUIET_DEPENDENCIES.iter().map(|name| format!("{name}=warn")));
    directives.join(",")
}

fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

/// Rotated JSON log file in `local_path`, if enabled
fn file_sink(config: &LoggingConfig) -> Result<Option<(NonBlocking, WorkerGuard)>> {
    if !config.local_enabled {
        return Ok(None);
    }

    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        DocmaskError::Configuration(format!(
            "Failed to create log directory {}: {}",
            config.local_path, e
        ))
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(rotation(&config.local_rotation))
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(config.local_max_files)
        .build(&config.local_path)
        .map_err(|e| {
            DocmaskError::Configuration(format!(
                "Failed to open log file in {}: {}",
                config.local_path, e
            ))
        })?;

    Ok(Some(tracing_appender::non_blocking(appender)))
}

fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(DocmaskError::Configuration(format!(
            "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
            level_str
        ))),
    }
}
