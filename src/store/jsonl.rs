//! Append-only JSON lines store

use super::traits::{DetectionRecord, ResultStore};
use crate::domain::{DocmaskError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Writes one JSON object per line
pub struct JsonlResultStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlResultStore {
    /// Create a store, creating the parent directory if needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DocmaskError::Store(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// File the records are appended to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultStore for JsonlResultStore {
    async fn save(&self, record: &DetectionRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                DocmaskError::Store(format!("Failed to open {}: {}", self.path.display(), e))
            })?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| DocmaskError::Store(format!("Failed to append record: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| DocmaskError::Store(format!("Failed to flush record: {}", e)))?;

        tracing::debug!(record_id = %record.id, path = %self.path.display(), "Detection record saved");
        Ok(())
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CategorizedMatches, DetectionBundle, ExternalDetection, ExternalDetectionError,
        ExternalOutcome,
    };
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_records_are_appended() {
        let dir = TempDir::new().unwrap();
        let store = JsonlResultStore::new(dir.path().join("nested/results.jsonl")).unwrap();

        let bundle = DetectionBundle::new(
            "a.docx",
            "text".to_string(),
            CategorizedMatches::new(),
            ExternalOutcome::from(Err::<ExternalDetection, _>(
                ExternalDetectionError::Timeout(30),
            )),
        );
        store
            .save(&DetectionRecord::from_bundle(&bundle, false))
            .await
            .unwrap();
        store
            .save(&DetectionRecord::from_bundle(&bundle, false))
            .await
            .unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["file_identifier"], "a.docx");
        assert!(first["external_detection_results"]["error"]
            .as_str()
            .unwrap()
            .contains("timed out"));
    }
}
