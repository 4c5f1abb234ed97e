//! Validate config command implementation

use crate::config::{load_config, DetectorProvider, StoreBackend};
use crate::detection::PatternRegistry;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let registry = match config.patterns.library {
            Some(ref path) => PatternRegistry::from_file(path),
            None => PatternRegistry::default_patterns(),
        };
        let rule_count = match registry {
            Ok(r) => r.all_patterns().len(),
            Err(e) => {
                println!("❌ Pattern library could not be loaded");
                println!("   Error: {e:#}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        match config.detector.provider {
            DetectorProvider::OpenAi if config.detector.is_enabled() => {
                println!("  External Detector: {} ({})", config.detector.model, config.detector.base_url);
                println!("  Detector Timeout: {}s", config.detector.timeout_seconds);
            }
            DetectorProvider::OpenAi => println!("  External Detector: disabled (no API key)"),
            DetectorProvider::Disabled => println!("  External Detector: disabled"),
        }
        println!(
            "  Pattern Library: {} ({} patterns)",
            config
                .patterns
                .library
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string()),
            rule_count
        );
        println!("  Output Suffix: {}", config.masking.output_suffix);
        match config.store.backend {
            StoreBackend::None => println!("  Result Store: none"),
            StoreBackend::Jsonl => println!("  Result Store: {}", config.store.path.display()),
            StoreBackend::PostgreSQL => {
                use secrecy::ExposeSecret;
                println!(
                    "  Result Store: PostgreSQL {}",
                    config
                        .store
                        .connection_string
                        .as_ref()
                        .and_then(|c| c.expose_secret().as_ref().split('@').next_back().map(str::to_string))
                        .unwrap_or_else(|| "***".to_string())
                );
            }
        }
        println!(
            "  Audit Log: {}",
            if config.audit.enabled {
                config.audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        println!();
        Ok(0)
    }
}
