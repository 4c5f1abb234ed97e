//! In-place masking of Word packages

use super::archive::{DocumentPart, Package};
use super::{xml, DocumentFormat, COMMENTS_PART, DOCUMENT_PART};
use crate::config::MaskingConfig;
use crate::detection::MaskTarget;
use crate::domain::{DocmaskError, ExternalOutcome, Result};
use crate::logging::part_span;
use crate::pipeline::MaskingEngine;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// What happened to one document part
#[derive(Debug, Clone, Serialize)]
pub struct PartReport {
    /// Entry name
    pub name: String,
    /// Non-empty text runs seen
    pub runs: usize,
    /// Runs whose text changed
    pub runs_masked: usize,
    /// Literal targets used for this part
    pub targets: Vec<MaskTarget>,
    /// External detector result for this part
    pub external: ExternalOutcome,
}

/// Result of masking one document
#[derive(Debug, Clone, Serialize)]
pub struct MaskingOutcome {
    /// Input document
    pub input: PathBuf,
    /// Written masked copy
    pub output: PathBuf,
    /// Per-part details, main document first
    pub parts: Vec<PartReport>,
    /// Wall time
    #[serde(skip)]
    pub duration: Duration,
}

impl MaskingOutcome {
    /// Total runs changed across parts
    pub fn runs_masked(&self) -> usize {
        self.parts.iter().map(|p| p.runs_masked).sum()
    }

    /// Whether the external detector failed for any part
    pub fn external_degraded(&self) -> bool {
        self.parts.iter().any(|p| p.external.is_failed())
    }
}

/// Output path: input stem + suffix + original extension, same directory
///
/// ```
/// use docmask::document::masked_output_path;
/// use std::path::Path;
///
/// let out = masked_output_path(Path::new("/tmp/report.docx"), "(masked)");
/// assert_eq!(out, Path::new("/tmp/report(masked).docx"));
/// ```
pub fn masked_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(name)
}

/// Masks the text runs of a Word package and writes a masked copy
pub struct DocumentRewriter {
    engine: Arc<MaskingEngine>,
    output_suffix: String,
    include_comments: bool,
}

impl DocumentRewriter {
    /// Create a rewriter
    pub fn new(engine: Arc<MaskingEngine>, config: &MaskingConfig) -> Self {
        Self {
            engine,
            output_suffix: config.output_suffix.clone(),
            include_comments: config.include_comments,
        }
    }

    /// Where the masked copy of `input` is written
    pub fn output_path(&self, input: &Path) -> PathBuf {
        masked_output_path(input, &self.output_suffix)
    }

    /// Mask `input` and write `<stem>(masked).docx` next to it
    ///
    /// The input is never modified. Any failure leaves no output file.
    ///
    /// # Errors
    ///
    /// - [`DocmaskError::UnsupportedFormat`] for non-Word input
    /// - [`DocmaskError::MissingDocumentPart`] without `word/document.xml`
    /// - [`DocmaskError::Xml`] for a malformed part
    /// - [`DocmaskError::ArchiveWrite`] if the copy cannot be written
    pub async fn mask_document(&self, input: &Path, directive: &str) -> Result<MaskingOutcome> {
        let start = Instant::now();

        if DocumentFormat::from_path(input)? != DocumentFormat::Word {
            return Err(DocmaskError::UnsupportedFormat(format!(
                "in-place masking supports Word documents only: {}",
                input.display()
            )));
        }

        let mut package = Package::open(input)?;

        let document = package
            .read_part(DOCUMENT_PART)?
            .ok_or_else(|| DocmaskError::MissingDocumentPart(DOCUMENT_PART.to_string()))?;

        let mut parts = vec![document];
        if self.include_comments {
            match package.read_part(COMMENTS_PART)? {
                Some(comments) => parts.push(comments),
                None => tracing::debug!("No comments part, skipping"),
            }
        }

        let mut reports = Vec::with_capacity(parts.len());
        let mut replacements: HashMap<String, DocumentPart> = HashMap::new();

        for part in parts {
            let span = part_span(&part.name);
            let (masked, report) = self.mask_part(part, directive).instrument(span).await?;
            reports.push(report);
            replacements.insert(masked.name.clone(), masked);
        }

        let output = self.output_path(input);
        package.write_with_replacements(&output, &replacements)?;

        Ok(MaskingOutcome {
            input: input.to_path_buf(),
            output,
            parts: reports,
            duration: start.elapsed(),
        })
    }

    async fn mask_part(
        &self,
        part: DocumentPart,
        directive: &str,
    ) -> Result<(DocumentPart, PartReport)> {
        let text = xml::collect_text(&part.data, &part.name)?;
        let (targets, external) = self
            .engine
            .resolve_targets(&text.searchable(), directive)
            .await;

        let masked = xml::mask_runs(&text, |run| self.engine.mask_with_targets(run, &targets));
        let (data, runs_masked) = xml::replace_runs(&part.data, &part.name, &masked)?;

        tracing::debug!(
            runs = text.runs.len(),
            runs_masked,
            targets = targets.len(),
            "Part masked"
        );

        let report = PartReport {
            name: part.name.clone(),
            runs: text.runs.iter().filter(|r| !r.is_empty()).count(),
            runs_masked,
            targets,
            external,
        };

        Ok((DocumentPart { data, ..part }, report))
    }
}
