//! Detection and masking of one piece of text

use crate::detection::{
    DetectionMerger, DisabledDetector, ExternalPiiDetector, MaskTarget, PatternDetector,
    PatternRegistry,
};
use crate::domain::ExternalOutcome;
use crate::masking::Masker;
use std::sync::Arc;

/// Masked text with what was masked
#[derive(Debug, Clone)]
pub struct MaskedText {
    /// Rewritten text
    pub text: String,
    /// Literal targets applied after the category rules
    pub targets: Vec<MaskTarget>,
    /// External detector result or its error
    pub external: ExternalOutcome,
}

/// Layered detectors plus the masker, sharing one pattern registry
#[derive(Clone)]
pub struct MaskingEngine {
    detector: PatternDetector,
    masker: Masker,
    external: Arc<dyn ExternalPiiDetector>,
}

impl MaskingEngine {
    /// Create an engine
    pub fn new(registry: Arc<PatternRegistry>, external: Arc<dyn ExternalPiiDetector>) -> Self {
        Self {
            detector: PatternDetector::with_registry(Arc::clone(&registry)),
            masker: Masker::new(registry),
            external,
        }
    }

    /// Engine without an external detector
    pub fn pattern_only(registry: Arc<PatternRegistry>) -> Self {
        Self::new(registry, Arc::new(DisabledDetector))
    }

    /// Pattern detector
    pub fn pattern_detector(&self) -> &PatternDetector {
        &self.detector
    }

    /// External detector
    pub fn external_detector(&self) -> &Arc<dyn ExternalPiiDetector> {
        &self.external
    }

    /// Run the external detector, degrading failures to an error record
    pub async fn detect_external(&self, text: &str, directive: &str) -> ExternalOutcome {
        let result = self.external.detect(text, directive).await;
        if let Err(ref e) = result {
            tracing::warn!(
                detector = self.external.name(),
                error = %e,
                "External detection failed, continuing with pattern rules only"
            );
        }
        ExternalOutcome::from(result)
    }

    /// Literal targets for `text`: maskable pattern matches merged with
    /// the external detector's findings
    pub async fn resolve_targets(
        &self,
        text: &str,
        directive: &str,
    ) -> (Vec<MaskTarget>, ExternalOutcome) {
        let pattern = self.detector.detect_maskable(text);
        let external = self.detect_external(text, directive).await;
        let targets = DetectionMerger::merge(&pattern, external.detection());
        (targets, external)
    }

    /// Mask text with already resolved targets
    pub fn mask_with_targets(&self, text: &str, targets: &[MaskTarget]) -> String {
        self.masker.apply_masking(text, targets)
    }

    /// Detect and mask `text`
    pub async fn mask_text(&self, text: &str, directive: &str) -> MaskedText {
        let (targets, external) = self.resolve_targets(text, directive).await;
        MaskedText {
            text: self.mask_with_targets(text, &targets),
            targets,
            external,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MaskingEngine {
        MaskingEngine::pattern_only(Arc::new(PatternRegistry::default_patterns().unwrap()))
    }

    #[tokio::test]
    async fn test_end_to_end_sentence() {
        let masked = engine()
            .mask_text(
                "제 전화번호는 010-1234-5678 이고 이메일은 test@example.com 입니다.",
                "",
            )
            .await;
        assert_eq!(
            masked.text,
            "제 전화번호는 010-****-**** 이고 이메일은 ******@example.com 입니다."
        );
        assert!(!masked.external.is_failed());
    }

    #[tokio::test]
    async fn test_mask_text_idempotent() {
        let engine = engine();
        let once = engine
            .mask_text("카드 1234-5678-9012-3456, 생일 1990-01-01, 여권 M12345678", "")
            .await;
        let twice = engine.mask_text(&once.text, "").await;
        assert_eq!(once.text, twice.text);
        assert_eq!(once.text, "카드 ****-****-****-****, 생일 ****-**-**, 여권 ********");
    }
}
