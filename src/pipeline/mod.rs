//! Detection and masking pipelines
//!
//! [`MaskingEngine`] works on text; the workflows add files, persistence
//! and auditing.

pub mod engine;
pub mod workflow;

pub use engine::{MaskedText, MaskingEngine};
pub use workflow::{BatchReport, DetectionWorkflow, DocumentResult, MaskingWorkflow};
