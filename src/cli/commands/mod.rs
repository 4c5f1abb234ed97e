//! CLI command implementations
//!
//! `detect` and `mask` share the engine wiring below.

pub mod detect;
pub mod init;
pub mod mask;
pub mod validate;

use crate::config::DocmaskConfig;
use crate::detection::{build_detector, PatternRegistry};
use crate::pipeline::MaskingEngine;
use anyhow::Context;
use std::sync::Arc;

/// Build the engine from the pattern library and detector settings
pub(crate) fn build_engine(config: &DocmaskConfig) -> anyhow::Result<Arc<MaskingEngine>> {
    let registry = match config.patterns.library {
        Some(ref path) => PatternRegistry::from_file(path)
            .with_context(|| format!("Failed to load pattern library {}", path.display()))?,
        None => PatternRegistry::default_patterns()?,
    };

    let external = build_detector(&config.detector)?;
    tracing::info!(
        detector = external.name(),
        patterns = registry.all_patterns().len(),
        "Masking engine ready"
    );

    Ok(Arc::new(MaskingEngine::new(Arc::new(registry), external)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorProvider;

    #[test]
    fn test_build_engine_pattern_only() {
        let mut config = DocmaskConfig::default();
        config.detector.provider = DetectorProvider::Disabled;

        let engine = build_engine(&config).unwrap();
        assert_eq!(engine.external_detector().name(), "disabled");
    }

    #[test]
    fn test_build_engine_missing_library() {
        let mut config = DocmaskConfig::default();
        config.detector.provider = DetectorProvider::Disabled;
        config.patterns.library = Some("missing/rules.toml".into());

        assert!(build_engine(&config).is_err());
    }
}
