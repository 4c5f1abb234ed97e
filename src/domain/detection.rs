//! Detection data model
//!
//! A [`Detection`] is a single value found by a detector. Pattern detections
//! are grouped per category in [`CategorizedMatches`]; external detections
//! arrive as an [`ExternalDetection`]. Both end up in a [`DetectionBundle`],
//! the per-document unit that is either persisted or handed to masking.

use super::category::PiiCategory;
use super::errors::ExternalDetectionError;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Which layer produced a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    /// Deterministic regex rule
    Pattern,
    /// Model-based external detector
    External,
}

/// A detected value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Category of the value
    pub category: PiiCategory,
    /// The literal text as found
    pub raw_value: String,
    /// Byte range in the scanned text, when known
    pub source_offset: Option<(usize, usize)>,
    /// Detector that found it
    pub source: DetectionSource,
}

impl Detection {
    /// Detection found by a pattern rule at a known position
    pub fn from_pattern(category: PiiCategory, raw_value: String, start: usize, end: usize) -> Self {
        Self {
            category,
            raw_value,
            source_offset: Some((start, end)),
            source: DetectionSource::Pattern,
        }
    }

    /// Detection reported by the external detector (no position)
    pub fn from_external(category: PiiCategory, raw_value: String) -> Self {
        Self {
            category,
            raw_value,
            source_offset: None,
            source: DetectionSource::External,
        }
    }
}

/// Pattern matches grouped by category, in catalog order
///
/// A category with zero matches is absent rather than present with an empty
/// list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedMatches {
    entries: Vec<(PiiCategory, Vec<String>)>,
}

impl CategorizedMatches {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Append matches for a category; empty lists are dropped
    pub fn push(&mut self, category: PiiCategory, values: Vec<String>) {
        if values.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some((_, existing)) => existing.extend(values),
            None => self.entries.push((category, values)),
        }
    }

    /// Matches for one category
    pub fn get(&self, category: &PiiCategory) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, v)| v.as_slice())
    }

    /// Check whether a category has matches
    pub fn contains(&self, category: &PiiCategory) -> bool {
        self.get(category).is_some()
    }

    /// Iterate categories and their matches
    pub fn iter(&self) -> impl Iterator<Item = (&PiiCategory, &[String])> {
        self.entries.iter().map(|(c, v)| (c, v.as_slice()))
    }

    /// Categories with at least one match
    pub fn categories(&self) -> impl Iterator<Item = &PiiCategory> {
        self.entries.iter().map(|(c, _)| c)
    }

    /// Total number of matches over all categories
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }

    /// Check if nothing was found
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for CategorizedMatches {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, values) in &self.entries {
            map.serialize_entry(category.key(), values)?;
        }
        map.end()
    }
}

/// Structured answer of the external detector
///
/// Keys are free strings chosen by the prompt and the model; they are mapped
/// onto [`PiiCategory`] only when merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDetection {
    /// Standard personal info, sub-category → literals
    #[serde(default)]
    pub standard_personal_info: BTreeMap<String, Vec<String>>,
    /// Caller-requested info, label → literals
    #[serde(default)]
    pub additional_requested_info: BTreeMap<String, Vec<String>>,
}

impl ExternalDetection {
    /// Flatten into detections, standard categories first
    pub fn detections(&self) -> Vec<Detection> {
        let standard = self.standard_personal_info.iter().flat_map(|(key, values)| {
            let category = PiiCategory::from(key.clone());
            values
                .iter()
                .map(move |v| Detection::from_external(category.clone(), v.clone()))
        });
        let additional = self
            .additional_requested_info
            .iter()
            .flat_map(|(label, values)| {
                values.iter().map(move |v| {
                    Detection::from_external(PiiCategory::Additional(label.clone()), v.clone())
                })
            });
        standard.chain(additional).collect()
    }

    /// Total number of literals
    pub fn total(&self) -> usize {
        self.standard_personal_info
            .values()
            .chain(self.additional_requested_info.values())
            .map(Vec::len)
            .sum()
    }

    /// Check if nothing was reported
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Outcome of the external detection layer, as persisted
///
/// A failure is recorded next to (not instead of) the pattern results so
/// consumers can tell that the external layer degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalOutcome {
    /// Error description
    ///
    /// Must stay ahead of `Detected`: untagged variants are tried in order
    /// and [`ExternalDetection`] accepts any object.
    Failed { error: String },
    /// Parsed response
    Detected(ExternalDetection),
}

impl ExternalOutcome {
    /// The detection if the external layer succeeded
    pub fn detection(&self) -> Option<&ExternalDetection> {
        match self {
            Self::Detected(d) => Some(d),
            Self::Failed { .. } => None,
        }
    }

    /// Check if the external layer failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl From<std::result::Result<ExternalDetection, ExternalDetectionError>> for ExternalOutcome {
    fn from(result: std::result::Result<ExternalDetection, ExternalDetectionError>) -> Self {
        match result {
            Ok(detection) => Self::Detected(detection),
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Per-document aggregate of everything the detectors found
#[derive(Debug, Clone, Serialize)]
pub struct DetectionBundle {
    /// Identity of the processed file (its path as given)
    pub file_identifier: String,
    /// Extracted plain text
    pub raw_content: String,
    /// Pattern detector output
    pub pattern_detection_results: CategorizedMatches,
    /// External detector output or its error
    pub external_detection_results: ExternalOutcome,
    /// When the bundle was produced
    pub created_at: DateTime<Utc>,
}

impl DetectionBundle {
    /// Create a bundle
    pub fn new(
        file_identifier: impl Into<String>,
        raw_content: String,
        pattern_detection_results: CategorizedMatches,
        external_detection_results: ExternalOutcome,
    ) -> Self {
        Self {
            file_identifier: file_identifier.into(),
            raw_content,
            pattern_detection_results,
            external_detection_results,
            created_at: Utc::now(),
        }
    }

    /// Total literals found by both layers
    pub fn total_detections(&self) -> usize {
        self.pattern_detection_results.total()
            + self
                .external_detection_results
                .detection()
                .map_or(0, ExternalDetection::total)
    }
}
