//! Domain models and types for docmask.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Categories** ([`PiiCategory`])
//! - **Detections** ([`Detection`], [`CategorizedMatches`], [`ExternalDetection`])
//! - **The per-document aggregate** ([`DetectionBundle`])
//! - **Error types** ([`DocmaskError`], [`ExternalDetectionError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, DocmaskError>`]:
//!
//! ```rust
//! use docmask::domain::{DocmaskError, Result};
//! use docmask::document::DocumentFormat;
//!
//! fn example() -> Result<DocumentFormat> {
//!     // Unknown hints are reported as UnsupportedFormat
//!     DocumentFormat::parse("word")
//! }
//! ```

pub mod category;
pub mod detection;
pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use category::PiiCategory;
pub use detection::{
    CategorizedMatches, Detection, DetectionBundle, DetectionSource, ExternalDetection,
    ExternalOutcome,
};
pub use errors::{DocmaskError, ExternalDetectionError};
pub use result::Result;
