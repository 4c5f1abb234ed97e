//! Combining pattern and external findings into mask targets

use crate::domain::{CategorizedMatches, ExternalDetection, PiiCategory};
use serde::Serialize;

/// One literal to mask, with the category that decides its replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskTarget {
    /// Trimmed literal as it appears in the text
    pub literal: String,
    /// Category of the first source that reported it
    pub category: PiiCategory,
}

/// Merges detector outputs into a deduplicated target list
pub struct DetectionMerger;

impl DetectionMerger {
    /// Flatten pattern results then external results
    ///
    /// Literals are trimmed; empty and already-redacted literals are
    /// dropped; duplicates keep the first-seen position and category, so a
    /// literal reported by both layers is masked once with the pattern
    /// category.
    pub fn merge(
        pattern: &CategorizedMatches,
        external: Option<&ExternalDetection>,
    ) -> Vec<MaskTarget> {
        let pattern_literals = pattern.iter().flat_map(|(category, values)| {
            values.iter().map(move |v| (category.clone(), v.clone()))
        });

        let external_literals = external
            .map(ExternalDetection::detections)
            .unwrap_or_default()
            .into_iter()
            .map(|d| (d.category, d.raw_value));

        let mut targets: Vec<MaskTarget> = Vec::new();
        for (category, raw) in pattern_literals.chain(external_literals) {
            let literal = raw.trim();
            if is_blank_or_redacted(literal) || targets.iter().any(|t| t.literal == literal) {
                continue;
            }
            targets.push(MaskTarget {
                literal: literal.to_string(),
                category,
            });
        }
        targets
    }

    /// The plain literal list
    pub fn literals(targets: &[MaskTarget]) -> Vec<String> {
        targets.iter().map(|t| t.literal.clone()).collect()
    }
}

/// True for literals with nothing left to mask
pub(crate) fn is_blank_or_redacted(literal: &str) -> bool {
    literal
        .chars()
        .all(|c| c == '*' || c.is_whitespace() || c.is_ascii_punctuation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn external(standard: &[(&str, &[&str])], additional: &[(&str, &[&str])]) -> ExternalDetection {
        let to_map = |entries: &[(&str, &[&str])]| {
            entries
                .iter()
                .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
                .collect::<BTreeMap<_, _>>()
        };
        ExternalDetection {
            standard_personal_info: to_map(standard),
            additional_requested_info: to_map(additional),
        }
    }

    #[test]
    fn test_merge_dedups_across_sources() {
        let mut pattern = CategorizedMatches::new();
        pattern.push(PiiCategory::Phone, vec!["010-1234-5678".to_string()]);
        let ext = external(&[("phone", &["010-1234-5678 "]), ("name", &["홍길동"])], &[]);

        let targets = DetectionMerger::merge(&pattern, Some(&ext));
        assert_eq!(
            DetectionMerger::literals(&targets),
            vec!["010-1234-5678".to_string(), "홍길동".to_string()]
        );
        assert_eq!(targets[0].category, PiiCategory::Phone);
        assert_eq!(targets[1].category, PiiCategory::PersonName);
    }

    #[test]
    fn test_merge_drops_empty_and_redacted() {
        let pattern = CategorizedMatches::new();
        let ext = external(&[("name", &["", "  ", "홍**", "***-****"])], &[("code", &["****"])]);
        let targets = DetectionMerger::merge(&pattern, Some(&ext));
        assert_eq!(DetectionMerger::literals(&targets), vec!["홍**".to_string()]);
    }

    #[test]
    fn test_merge_without_external() {
        let mut pattern = CategorizedMatches::new();
        pattern.push(PiiCategory::Email, vec!["a@b.com".to_string(), "a@b.com".to_string()]);
        let targets = DetectionMerger::merge(&pattern, None);
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_additional_labels_preserved() {
        let ext = external(&[], &[("프로젝트 이름", &["Project Alpha"])]);
        let targets = DetectionMerger::merge(&CategorizedMatches::new(), Some(&ext));
        assert_eq!(
            targets[0].category,
            PiiCategory::Additional("프로젝트 이름".to_string())
        );
    }
}
