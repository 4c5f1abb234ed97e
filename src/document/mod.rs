//! Office documents: text extraction and in-place rewriting

pub mod archive;
pub mod extractor;
pub mod rewriter;
pub mod xml;

pub use archive::{DocumentPart, Package};
pub use extractor::DocumentTextExtractor;
pub use rewriter::{masked_output_path, DocumentRewriter, MaskingOutcome, PartReport};

use crate::domain::{DocmaskError, Result};
use std::fmt;
use std::path::Path;

/// Main document part of a Word package
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Comments part of a Word package
pub const COMMENTS_PART: &str = "word/comments.xml";

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Word `.docx`
    Word,
    /// Excel `.xlsx`
    Excel,
}

impl DocumentFormat {
    /// Parse a format hint (`word`, `docx`, `excel`, `xlsx`; case-insensitive)
    ///
    /// # Errors
    ///
    /// [`DocmaskError::UnsupportedFormat`] for anything else.
    pub fn parse(hint: &str) -> Result<Self> {
        match hint.trim().to_lowercase().as_str() {
            "word" | "docx" => Ok(Self::Word),
            "excel" | "xlsx" => Ok(Self::Excel),
            _ => Err(DocmaskError::UnsupportedFormat(hint.to_string())),
        }
    }

    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::parse(extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word => write!(f, "word"),
            Self::Excel => write!(f, "excel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hints() {
        assert_eq!(DocumentFormat::parse("word").unwrap(), DocumentFormat::Word);
        assert_eq!(DocumentFormat::parse("WORD").unwrap(), DocumentFormat::Word);
        assert_eq!(DocumentFormat::parse("docx").unwrap(), DocumentFormat::Word);
        assert_eq!(DocumentFormat::parse("Excel").unwrap(), DocumentFormat::Excel);
        assert_eq!(DocumentFormat::parse("xlsx").unwrap(), DocumentFormat::Excel);
    }

    #[test]
    fn test_unsupported_hint() {
        let err = DocumentFormat::parse("pdf").unwrap_err();
        assert!(matches!(err, DocmaskError::UnsupportedFormat(ref f) if f == "pdf"));
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/report.DOCX")).unwrap(),
            DocumentFormat::Word
        );
        assert!(DocumentFormat::from_path(Path::new("notes.txt")).is_err());
    }
}
