//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DetectorProvider, DocmaskConfig, StoreBackend};
use super::secret::secret_string;
use crate::domain::errors::DocmaskError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into DocmaskConfig
/// 4. Applies environment variable overrides (DOCMASK_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use docmask::config::loader::load_config;
///
/// let config = load_config("docmask.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DocmaskConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DocmaskError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DocmaskError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Loads the configuration file if it exists, otherwise starts from defaults
///
/// Environment overrides and validation apply in both cases, so the tool
/// runs without any configuration file (`DOCMASK_DETECTOR_API_KEY` alone is
/// enough to enable the external detector).
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<DocmaskConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    let mut config = DocmaskConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate().map_err(|e| {
        DocmaskError::Configuration(format!("Configuration validation failed: {}", e))
    })?;
    Ok(config)
}

/// Parses configuration text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<DocmaskConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: DocmaskConfig = toml::from_str(&contents)
        .map_err(|e| DocmaskError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        DocmaskError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| DocmaskError::Configuration(e.to_string()))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{}}}", var_name), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(DocmaskError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using the DOCMASK_* prefix
///
/// Variables follow the pattern DOCMASK_<SECTION>_<KEY>, for example
/// DOCMASK_DETECTOR_API_KEY or DOCMASK_STORE_BACKEND.
fn apply_env_overrides(config: &mut DocmaskConfig) -> Result<()> {
    // Application
    if let Ok(val) = std::env::var("DOCMASK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Detector
    if let Ok(val) = std::env::var("DOCMASK_DETECTOR_PROVIDER") {
        config.detector.provider = match val.to_lowercase().as_str() {
            "openai" => DetectorProvider::OpenAi,
            "disabled" | "none" => DetectorProvider::Disabled,
            other => {
                return Err(DocmaskError::Configuration(format!(
                    "Invalid DOCMASK_DETECTOR_PROVIDER '{}'",
                    other
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("DOCMASK_DETECTOR_API_KEY") {
        config.detector.api_key = Some(secret_string(val));
    } else if config.detector.api_key.is_none() {
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            config.detector.api_key = Some(secret_string(val));
        }
    }
    if let Ok(val) = std::env::var("DOCMASK_DETECTOR_BASE_URL") {
        config.detector.base_url = val;
    }
    if let Ok(val) = std::env::var("DOCMASK_DETECTOR_MODEL") {
        config.detector.model = val;
    }
    if let Ok(val) = std::env::var("DOCMASK_DETECTOR_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.detector.timeout_seconds = timeout;
        }
    }

    // Patterns
    if let Ok(val) = std::env::var("DOCMASK_PATTERNS_LIBRARY") {
        config.patterns.library = Some(PathBuf::from(val));
    }

    // Masking
    if let Ok(val) = std::env::var("DOCMASK_MASKING_OUTPUT_SUFFIX") {
        config.masking.output_suffix = val;
    }

    // Store
    if let Ok(val) = std::env::var("DOCMASK_STORE_BACKEND") {
        config.store.backend = match val.to_lowercase().as_str() {
            "none" => StoreBackend::None,
            "jsonl" => StoreBackend::Jsonl,
            "postgresql" | "postgres" => StoreBackend::PostgreSQL,
            other => {
                return Err(DocmaskError::Configuration(format!(
                    "Invalid DOCMASK_STORE_BACKEND '{}'",
                    other
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("DOCMASK_STORE_PATH") {
        config.store.path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("DOCMASK_STORE_CONNECTION_STRING") {
        config.store.connection_string = Some(secret_string(val));
    }

    // Audit
    if let Ok(val) = std::env::var("DOCMASK_AUDIT_ENABLED") {
        config.audit.enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("DOCMASK_AUDIT_LOG_PATH") {
        config.audit.log_path = PathBuf::from(val);
    }

    // Logging
    if let Ok(val) = std::env::var("DOCMASK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("DOCMASK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
