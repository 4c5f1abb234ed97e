//! Masking of detected values
//!
//! [`RedactionPolicy`] decides what a value becomes; [`Masker`] rewrites
//! text with the category rules and the merged literal list.

pub mod masker;
pub mod policy;

pub use masker::Masker;
pub use policy::{RedactionPolicy, DEFAULT_TOKEN};
