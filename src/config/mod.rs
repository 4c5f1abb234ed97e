//! Configuration management for docmask.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `DOCMASK_*`
//! environment overrides, defaults for every setting, and validation on
//! load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docmask::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("docmask.toml")?;
//! println!("Detector model: {}", config.detector.model);
//! println!("Masked suffix: {}", config.masking.output_suffix);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [detector]
//! provider = "openai"
//! api_key = "${OPENAI_API_KEY}"
//! model = "gpt-4o"
//! timeout_seconds = 30
//!
//! [masking]
//! output_suffix = "(masked)"
//!
//! [store]
//! backend = "jsonl"
//! path = "./data/detections.jsonl"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, AuditConfig, DetectorConfig, DetectorProvider, DocmaskConfig,
    LoggingConfig, MaskingConfig, PatternsConfig, RetryConfig, StoreBackend, StoreConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
