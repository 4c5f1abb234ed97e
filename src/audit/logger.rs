//! Audit logger for masking runs

use crate::config::AuditConfig;
use crate::document::MaskingOutcome;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    input: String,
    output: String,
    runs_masked: usize,
    external_degraded: bool,
    processing_time_ms: u64,
    categories: BTreeMap<String, usize>,
    targets: Vec<AuditTarget>,
}

/// Masked literal, hashed
#[derive(Debug, Serialize)]
struct AuditTarget {
    part: String,
    category: String,
    /// SHA-256 of the literal (plaintext is never logged)
    value_hash: String,
}

/// Appends one entry per masked document
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::new(config.log_path.clone(), config.json_format, config.enabled)
    }

    /// Record a masked document
    pub fn log_masking(&self, outcome: &MaskingOutcome) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        let mut targets = Vec::new();
        for part in &outcome.parts {
            for target in &part.targets {
                *categories.entry(target.category.key().to_string()).or_default() += 1;
                targets.push(AuditTarget {
                    part: part.name.clone(),
                    category: target.category.key().to_string(),
                    value_hash: hash_value(&target.literal),
                });
            }
        }

        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            input: outcome.input.display().to_string(),
            output: outcome.output.display().to_string(),
            runs_masked: outcome.runs_masked(),
            external_degraded: outcome.external_degraded(),
            processing_time_ms: outcome.duration.as_millis() as u64,
            categories,
            targets,
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            let categories = entry
                .categories
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(",");
            writeln!(
                file,
                "[{}] Input: {} | Output: {} | Runs masked: {} | Categories: {} | Time: {}ms",
                entry.timestamp,
                entry.input,
                entry.output,
                entry.runs_masked,
                categories,
                entry.processing_time_ms
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

/// Hash a value using SHA-256
fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}
