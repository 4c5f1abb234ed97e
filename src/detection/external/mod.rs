//! External (language-model) PII detection
//!
//! The external detector finds what fixed patterns cannot: names,
//! addresses and caller-requested categories such as project codenames.
//! Its answer is untrusted text, so parsing is defensive and every failure
//! is an [`ExternalDetectionError`] that callers degrade on.

mod openai;
mod parser;
mod prompt;

pub use openai::OpenAiDetector;
pub use parser::parse_detection_response;
pub use prompt::build_prompt;

use crate::config::DetectorConfig;
use crate::domain::{ExternalDetection, ExternalDetectionError};
use async_trait::async_trait;
use std::sync::Arc;

/// Detector backed by an external service
#[async_trait]
pub trait ExternalPiiDetector: Send + Sync {
    /// Find personal and requested information in `text`
    ///
    /// `directive` is free text naming extra categories to look for; it may
    /// be empty.
    async fn detect(
        &self,
        text: &str,
        directive: &str,
    ) -> Result<ExternalDetection, ExternalDetectionError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Detector used when no external service is configured
///
/// Always answers with an empty detection, so masking runs on pattern
/// rules alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledDetector;

#[async_trait]
impl ExternalPiiDetector for DisabledDetector {
    async fn detect(
        &self,
        _text: &str,
        _directive: &str,
    ) -> Result<ExternalDetection, ExternalDetectionError> {
        Ok(ExternalDetection::default())
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

/// Build the detector selected by configuration
///
/// Falls back to [`DisabledDetector`] when the provider is disabled or no
/// API key is set.
pub fn build_detector(
    config: &DetectorConfig,
) -> Result<Arc<dyn ExternalPiiDetector>, ExternalDetectionError> {
    if !config.is_enabled() {
        tracing::info!("External detector disabled, using pattern rules only");
        return Ok(Arc::new(DisabledDetector));
    }

    let detector = OpenAiDetector::new(config)?;
    tracing::info!(model = %config.model, "External detector enabled");
    Ok(Arc::new(detector))
}
