//! Domain error types
//!
//! All errors surfaced by the library are domain-specific and don't expose
//! third-party types. Detection-layer failures ([`ExternalDetectionError`]) are
//! recoverable and normally recorded next to pattern results; document-layer
//! failures are fatal for the document being processed.

use thiserror::Error;

/// Main docmask error type
#[derive(Debug, Error)]
pub enum DocmaskError {
    /// The format hint matches no known extractor
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The external detector failed or returned unusable content
    #[error("External detection error: {0}")]
    ExternalDetection(#[from] ExternalDetectionError),

    /// A required part is absent from the document package
    #[error("Missing document part: {0}")]
    MissingDocumentPart(String),

    /// Repackaging the masked document failed
    #[error("Failed to write archive: {0}")]
    ArchiveWrite(String),

    /// The input package could not be read
    #[error("Archive error: {0}")]
    Archive(String),

    /// A document part is not well-formed XML
    #[error("XML error in {part}: {message}")]
    Xml { part: String, message: String },

    /// Spreadsheet errors
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Result store errors
    #[error("Result store error: {0}")]
    Store(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors raised by an external (model-based) detector
///
/// These never abort a pipeline: callers fall back to pattern-only results
/// and keep the error next to them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExternalDetectionError {
    /// Request could not be sent or the connection dropped
    #[error("Transport failure: {0}")]
    Transport(String),

    /// No response within the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Non-success HTTP status
    #[error("Detector returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body is not the expected JSON shape
    #[error("Invalid JSON from detector: {0}")]
    InvalidResponse(String),
}

impl From<std::io::Error> for DocmaskError {
    fn from(err: std::io::Error) -> Self {
        DocmaskError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DocmaskError {
    fn from(err: serde_json::Error) -> Self {
        DocmaskError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for DocmaskError {
    fn from(err: toml::de::Error) -> Self {
        DocmaskError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<zip::result::ZipError> for DocmaskError {
    fn from(err: zip::result::ZipError) -> Self {
        DocmaskError::Archive(err.to_string())
    }
}

impl From<quick_xml::Error> for DocmaskError {
    fn from(err: quick_xml::Error) -> Self {
        DocmaskError::Xml {
            part: "unknown".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<calamine::Error> for DocmaskError {
    fn from(err: calamine::Error) -> Self {
        DocmaskError::Spreadsheet(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DocmaskError::UnsupportedFormat("pdf".to_string());
        assert_eq!(err.to_string(), "Unsupported document format: pdf");

        let err = DocmaskError::MissingDocumentPart("word/document.xml".to_string());
        assert_eq!(err.to_string(), "Missing document part: word/document.xml");
    }

    #[test]
    fn test_external_error_conversion() {
        let err: DocmaskError = ExternalDetectionError::Timeout(30).into();
        assert!(matches!(err, DocmaskError::ExternalDetection(_)));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn test_xml_error_names_part() {
        let err = DocmaskError::Xml {
            part: "word/document.xml".to_string(),
            message: "unexpected end".to_string(),
        };
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: DocmaskError = io_err.into();
        assert!(matches!(err, DocmaskError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: DocmaskError = json_err.into();
        assert!(matches!(err, DocmaskError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: DocmaskError = toml_err.into();
        assert!(matches!(err, DocmaskError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
