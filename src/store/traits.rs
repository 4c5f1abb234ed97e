//! Result store abstraction

use crate::domain::{CategorizedMatches, DetectionBundle, ExternalOutcome, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One persisted detection run
///
/// Runs are appended, never merged with earlier runs for the same file.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionRecord {
    /// Record id
    pub id: Uuid,
    /// Identity of the processed file
    pub file_identifier: String,
    /// Extracted text, when the store is configured to keep it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    /// Pattern detector output, category → literals
    pub pattern_detection_results: CategorizedMatches,
    /// External detector output or `{"error": ...}`
    pub external_detection_results: ExternalOutcome,
    /// When the detection ran
    pub created_at: DateTime<Utc>,
}

impl DetectionRecord {
    /// Build a record from a bundle
    pub fn from_bundle(bundle: &DetectionBundle, store_raw_content: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_identifier: bundle.file_identifier.clone(),
            raw_content: store_raw_content.then(|| bundle.raw_content.clone()),
            pattern_detection_results: bundle.pattern_detection_results.clone(),
            external_detection_results: bundle.external_detection_results.clone(),
            created_at: bundle.created_at,
        }
    }
}

/// Persists detection records
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Append a record
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::DocmaskError::Store`] if the record cannot be written.
    async fn save(&self, record: &DetectionRecord) -> Result<()>;

    /// Check that the backend is reachable
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    /// Backend name used in logs
    fn name(&self) -> &str;
}

/// Store that discards every record
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResultStore;

#[async_trait]
impl ResultStore for NullResultStore {
    async fn save(&self, record: &DetectionRecord) -> Result<()> {
        tracing::debug!(record_id = %record.id, "Result persistence disabled, record dropped");
        Ok(())
    }

    fn name(&self) -> &str {
        "none"
    }
}
