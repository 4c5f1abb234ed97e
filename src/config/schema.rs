//! Configuration schema types
//!
//! Every section has defaults, so an empty file is a valid configuration
//! (pattern-only detection, no persistence).

use crate::config::SecretString;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main docmask configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocmaskConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// External (language-model) detector
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Pattern library
    #[serde(default)]
    pub patterns: PatternsConfig,

    /// In-place masking settings
    #[serde(default)]
    pub masking: MaskingConfig,

    /// Detection result persistence
    #[serde(default)]
    pub store: StoreConfig,

    /// Masking audit log
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DocmaskConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.detector.validate()?;
        self.patterns.validate()?;
        self.masking.validate()?;
        self.store.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// External detector provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetectorProvider {
    /// OpenAI-compatible chat completions endpoint
    #[default]
    OpenAi,
    /// No external detector; pattern rules only
    Disabled,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (1 = no retry)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// External detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Which detector to use
    #[serde(default)]
    pub provider: DetectorProvider,

    /// API key; when absent the detector is disabled
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Base URL of the chat completions API
    #[serde(default = "default_detector_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_detector_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration for transport failures
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            provider: DetectorProvider::default(),
            api_key: None,
            base_url: default_detector_base_url(),
            model: default_detector_model(),
            temperature: 0.0,
            timeout_seconds: default_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Whether an external detector will actually be called
    pub fn is_enabled(&self) -> bool {
        self.provider == DetectorProvider::OpenAi
            && self
                .api_key
                .as_ref()
                .map(|k| !k.expose_secret().is_empty())
                .unwrap_or(false)
    }

    fn validate(&self) -> Result<(), String> {
        if self.provider == DetectorProvider::Disabled {
            return Ok(());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("detector.base_url must start with http:// or https://".to_string());
        }

        if self.model.trim().is_empty() {
            return Err("detector.model cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 600 {
            return Err("detector.timeout_seconds must be between 1 and 600".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("detector.temperature must be between 0.0 and 2.0".to_string());
        }

        if self.retry.max_retries == 0 {
            return Err("detector.retry.max_retries must be at least 1".to_string());
        }

        Ok(())
    }
}

/// Pattern library configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// Path to a TOML rule library replacing the built-in one
    #[serde(default)]
    pub library: Option<PathBuf>,
}

impl PatternsConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.library {
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                return Err(format!(
                    "patterns.library must be a TOML file: {}",
                    path.display()
                ));
            }
        }
        Ok(())
    }
}

/// In-place masking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskingConfig {
    /// Marker inserted before the extension of masked files
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Also mask `word/comments.xml` when present
    #[serde(default = "default_true")]
    pub include_comments: bool,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            output_suffix: default_output_suffix(),
            include_comments: true,
        }
    }
}

impl MaskingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_suffix.is_empty() {
            return Err("masking.output_suffix cannot be empty".to_string());
        }
        if self.output_suffix.contains(['/', '\\']) {
            return Err("masking.output_suffix cannot contain path separators".to_string());
        }
        Ok(())
    }
}

/// Result store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Results are not persisted
    #[default]
    None,
    /// Append-only JSON lines file
    Jsonl,
    /// PostgreSQL JSONB table
    PostgreSQL,
}

/// Detection result persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend
    #[serde(default)]
    pub backend: StoreBackend,

    /// File path for the jsonl backend
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Connection string for the postgresql backend
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub connection_string: Option<SecretString>,

    /// Maximum pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub connection_timeout_seconds: u64,

    /// Statement timeout in seconds
    #[serde(default = "default_statement_timeout_seconds")]
    pub statement_timeout_seconds: u64,

    /// Persist the extracted document text next to the detections
    #[serde(default = "default_true")]
    pub store_raw_content: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
            connection_string: None,
            max_connections: default_max_connections(),
            connection_timeout_seconds: default_timeout_seconds(),
            statement_timeout_seconds: default_statement_timeout_seconds(),
            store_raw_content: true,
        }
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<(), String> {
        match self.backend {
            StoreBackend::None => Ok(()),
            StoreBackend::Jsonl => {
                if self.path.as_os_str().is_empty() {
                    return Err("store.path cannot be empty for the jsonl backend".to_string());
                }
                Ok(())
            }
            StoreBackend::PostgreSQL => {
                let conn = self
                    .connection_string
                    .as_ref()
                    .map(|s| s.expose_secret().as_ref().to_string())
                    .unwrap_or_default();
                if conn.trim().is_empty() {
                    return Err(
                        "store.connection_string is required when backend = 'postgresql'"
                            .to_string(),
                    );
                }
                if !conn.starts_with("postgresql://") && !conn.starts_with("postgres://") {
                    return Err(
                        "store.connection_string must start with postgresql:// or postgres://"
                            .to_string(),
                    );
                }
                if self.max_connections == 0 {
                    return Err("store.max_connections must be greater than 0".to_string());
                }
                Ok(())
            }
        }
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Rotated log files kept in `local_path`
    #[serde(default = "default_local_max_files")]
    pub local_max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            local_max_files: default_local_max_files(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_max_files == 0 {
            return Err("logging.local_max_files must be greater than 0".to_string());
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_detector_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_detector_model() -> String {
    "gpt-4o".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> usize {
    2
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    5000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_output_suffix() -> String {
    "(masked)".to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/detections.jsonl")
}

fn default_max_connections() -> usize {
    4
}

fn default_statement_timeout_seconds() -> u64 {
    60
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/masking.log")
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_local_max_files() -> usize {
    14
}
