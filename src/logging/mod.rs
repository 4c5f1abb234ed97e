//! Logging and observability
//!
//! Structured logging through `tracing`, with optional rotated JSON log
//! files. Work on a document runs inside a [`document_span`] so its events
//! carry the file name. Log events never carry detected values, only
//! counts, categories and file names.
//!
//! # Example
//!
//! ```no_run
//! use docmask::logging::init_logging;
//! use docmask::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{document_span, init_logging, part_span, LoggingGuard};

/// Log the completion of a document, inside its [`document_span`]
///
/// # Example
///
/// ```no_run
/// use docmask::log_document_complete;
/// use std::time::Duration;
///
/// log_document_complete!(12, Duration::from_millis(340));
/// ```
#[macro_export]
macro_rules! log_document_complete {
    ($count:expr, $duration:expr) => {
        tracing::info!(
            detections = $count,
            duration_ms = $duration.as_millis() as u64,
            "Document processed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use docmask::log_error_with_context;
/// use docmask::domain::DocmaskError;
///
/// let error = DocmaskError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use docmask::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
