//! PII detection
//!
//! - [`PatternDetector`]: deterministic regex rules from a [`PatternRegistry`]
//! - [`external`]: the language-model detector behind [`ExternalPiiDetector`]
//! - [`DetectionMerger`]: combines both into [`MaskTarget`]s

pub mod external;
pub mod merge;
pub mod patterns;
pub mod regex;

pub use external::{build_detector, DisabledDetector, ExternalPiiDetector, OpenAiDetector};
pub use merge::{DetectionMerger, MaskTarget};
pub use patterns::{CompiledPattern, PatternRegistry};
pub use self::regex::PatternDetector;
