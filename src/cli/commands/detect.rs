//! Detect command implementation
//!
//! Extracts text, runs both detectors, stores the record and prints the
//! result as JSON on stdout.

use super::build_engine;
use crate::config::load_config_or_default;
use crate::document::DocumentFormat;
use crate::domain::DocmaskError;
use crate::pipeline::DetectionWorkflow;
use crate::store::create_result_store;
use clap::Args;
use serde_json::json;
use std::path::PathBuf;

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Document to analyze
    pub path: PathBuf,

    /// Document format (word or excel)
    pub format: String,

    /// Additional information the external detector should look for
    pub directive: Option<String>,
}

impl DetectArgs {
    /// Execute the detect command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(path = %self.path.display(), format = %self.format, "Starting detect command");

        let format = match DocumentFormat::parse(&self.format) {
            Ok(f) => f,
            Err(DocmaskError::UnsupportedFormat(hint)) => {
                println!("Unsupported document format: {hint} (expected word or excel)");
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("Configuration validation failed: {e}");
                return Ok(2);
            }
        };

        let engine = match build_engine(&config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Failed to initialize detectors: {e:#}");
                return Ok(2);
            }
        };

        let store = match create_result_store(&config.store).await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open result store");
                eprintln!("Failed to open result store: {e}");
                return Ok(5);
            }
        };

        if let Err(e) = store.test_connection().await {
            tracing::error!(store = store.name(), error = %e, "Result store unreachable");
            eprintln!("Result store unreachable: {e}");
            return Ok(5);
        }

        let workflow = DetectionWorkflow::new(engine, store, config.store.store_raw_content);
        let directive = self.directive.as_deref().unwrap_or_default();

        let bundle = match workflow.detect_document(&self.path, format, directive).await {
            Ok(bundle) => bundle,
            Err(e) => {
                crate::log_error_with_context!(e, "Detection failed");
                eprintln!("Detection failed for {}: {e}", self.path.display());
                return Ok(1);
            }
        };

        let report = json!({
            "pattern_detection_results": bundle.pattern_detection_results,
            "external_detection_results": bundle.external_detection_results,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);

        Ok(0)
    }
}
