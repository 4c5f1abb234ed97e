//! Regex-based PII detector

use super::patterns::PatternRegistry;
use crate::domain::{CategorizedMatches, Detection};
use anyhow::Result;
use std::sync::Arc;

/// Deterministic detector over the pattern catalog
///
/// Pure function of its input: no I/O, no state.
#[derive(Clone)]
pub struct PatternDetector {
    pattern_registry: Arc<PatternRegistry>,
}

impl PatternDetector {
    /// Create a new detector with the built-in patterns
    pub fn new() -> Result<Self> {
        let registry = PatternRegistry::default_patterns()?;
        Ok(Self::with_registry(Arc::new(registry)))
    }

    /// Create a detector over a shared registry
    pub fn with_registry(registry: Arc<PatternRegistry>) -> Self {
        Self {
            pattern_registry: registry,
        }
    }

    /// The registry this detector uses
    pub fn registry(&self) -> &Arc<PatternRegistry> {
        &self.pattern_registry
    }

    /// Every match of every rule, with offsets
    ///
    /// Within a category matches are ordered by position; a match that
    /// overlaps an earlier match of the same category (from another rule of
    /// that category) is dropped.
    pub fn detect_all(&self, text: &str) -> Vec<Detection> {
        self.collect(text, false)
    }

    fn collect(&self, text: &str, masking_only: bool) -> Vec<Detection> {
        let mut detections: Vec<Detection> = Vec::new();

        for category in self.pattern_registry.categories() {
            let mut found: Vec<Detection> = self
                .pattern_registry
                .patterns_for_category(&category)
                .filter(|pattern| !masking_only || pattern.mask_in_place)
                .flat_map(|pattern| {
                    pattern.regex.find_iter(text).map(|m| {
                        Detection::from_pattern(
                            category.clone(),
                            m.as_str().to_string(),
                            m.start(),
                            m.end(),
                        )
                    })
                })
                .collect();

            found.sort_by_key(|d| d.source_offset);

            let mut last_end = 0;
            for detection in found {
                let Some((start, end)) = detection.source_offset else {
                    continue;
                };
                if start < last_end {
                    continue;
                }
                last_end = end;
                detections.push(detection);
            }
        }

        detections
    }

    /// Matches grouped per category, categories in catalog order
    ///
    /// Categories without matches are absent from the result.
    pub fn detect(&self, text: &str) -> CategorizedMatches {
        let mut matches = CategorizedMatches::new();
        for detection in self.detect_all(text) {
            matches.push(detection.category, vec![detection.raw_value]);
        }
        matches
    }

    /// Like [`detect`](Self::detect), restricted to rules that rewrite text
    /// during in-place masking
    pub fn detect_maskable(&self, text: &str) -> CategorizedMatches {
        let mut matches = CategorizedMatches::new();
        for detection in self.collect(text, true) {
            matches.push(detection.category, vec![detection.raw_value]);
        }
        matches
    }
}
