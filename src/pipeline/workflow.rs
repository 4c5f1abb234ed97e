//! Detection and masking workflows over files

use super::MaskingEngine;
use crate::audit::AuditLogger;
use crate::document::{DocumentFormat, DocumentRewriter, DocumentTextExtractor, MaskingOutcome};
use crate::domain::{DetectionBundle, DocmaskError, Result};
use crate::logging::document_span;
use crate::store::{DetectionRecord, ResultStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;

/// Extract, detect and persist
pub struct DetectionWorkflow {
    engine: Arc<MaskingEngine>,
    store: Arc<dyn ResultStore>,
    store_raw_content: bool,
}

impl DetectionWorkflow {
    /// Create a workflow
    pub fn new(engine: Arc<MaskingEngine>, store: Arc<dyn ResultStore>, store_raw_content: bool) -> Self {
        Self {
            engine,
            store,
            store_raw_content,
        }
    }

    /// Detect PII in one document and store the result
    ///
    /// An external detector failure is recorded in the bundle; extraction
    /// and store failures are returned.
    pub async fn detect_document(
        &self,
        path: &Path,
        format: DocumentFormat,
        directive: &str,
    ) -> Result<DetectionBundle> {
        self.detect(path, format, directive)
            .instrument(document_span(path, "detect"))
            .await
    }

    async fn detect(
        &self,
        path: &Path,
        format: DocumentFormat,
        directive: &str,
    ) -> Result<DetectionBundle> {
        let start = Instant::now();
        tracing::info!(format = %format, "Processing document");

        let content = DocumentTextExtractor::extract(path, format)?;
        let pattern = self.engine.pattern_detector().detect(&content);
        let external = self.engine.detect_external(&content, directive).await;

        let bundle = DetectionBundle::new(path.display().to_string(), content, pattern, external);

        let record = DetectionRecord::from_bundle(&bundle, self.store_raw_content);
        self.store.save(&record).await?;

        crate::log_document_complete!(bundle.total_detections(), start.elapsed());
        Ok(bundle)
    }
}

/// Per-file result of a batch
#[derive(Debug)]
pub struct DocumentResult {
    /// Input path
    pub input: PathBuf,
    /// Outcome or the error that stopped this file
    pub result: Result<MaskingOutcome>,
}

/// Results of a batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per processed input
    pub documents: Vec<DocumentResult>,
    /// Inputs not started because shutdown was requested
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    /// Number of documents masked
    pub fn succeeded(&self) -> usize {
        self.documents.iter().filter(|d| d.result.is_ok()).count()
    }

    /// Number of documents that failed
    pub fn failed(&self) -> usize {
        self.documents.len() - self.succeeded()
    }

    /// Whether the batch stopped early on a shutdown request
    pub fn interrupted(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Masks documents in place and audits each run
pub struct MaskingWorkflow {
    rewriter: DocumentRewriter,
    audit: AuditLogger,
}

impl MaskingWorkflow {
    /// Create a workflow
    pub fn new(rewriter: DocumentRewriter, audit: AuditLogger) -> Self {
        Self { rewriter, audit }
    }

    /// Mask one document
    pub async fn mask_document(&self, input: &Path, directive: &str) -> Result<MaskingOutcome> {
        self.mask(input, directive)
            .instrument(document_span(input, "mask"))
            .await
    }

    async fn mask(&self, input: &Path, directive: &str) -> Result<MaskingOutcome> {
        tracing::info!("Processing document");

        if !input.exists() {
            return Err(DocmaskError::Io(format!("File not found: {}", input.display())));
        }

        let outcome = self.rewriter.mask_document(input, directive).await?;

        if let Err(e) = self.audit.log_masking(&outcome) {
            tracing::warn!(error = %e, "Failed to write audit entry");
        }

        crate::log_document_complete!(outcome.runs_masked(), outcome.duration);
        Ok(outcome)
    }

    /// Mask several documents independently
    ///
    /// A failure only affects its own document. Once `shutdown` turns true
    /// the document in progress is finished and the rest are skipped.
    pub async fn mask_documents(
        &self,
        inputs: &[PathBuf],
        directive: &str,
        shutdown: &watch::Receiver<bool>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, input) in inputs.iter().enumerate() {
            if *shutdown.borrow() {
                report.skipped = inputs[index..].to_vec();
                tracing::info!(skipped = report.skipped.len(), "Masking interrupted by shutdown signal");
                break;
            }

            let result = self.mask_document(input, directive).await;
            if let Err(ref e) = result {
                crate::log_error_with_context!(e, "Failed to mask document");
            }
            report.documents.push(DocumentResult {
                input: input.clone(),
                result,
            });
        }
        report
    }
}
