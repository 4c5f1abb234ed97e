//! Audit trail of masking runs
//!
//! Entries carry counts, categories and SHA-256 hashes of masked literals.

pub mod logger;

pub use logger::AuditLogger;
