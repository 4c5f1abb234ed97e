// docmask - Personal information detection and masking for office documents
// Copyright (c) 2025 docmask Contributors
// Licensed under the MIT License

//! # docmask
//!
//! docmask finds personal information in Word and Excel documents and writes
//! masked copies of Word documents with their layout untouched.
//!
//! ## Overview
//!
//! Two detection layers run over every document:
//! - **Pattern rules** for structured identifiers (national ID numbers, phone
//!   numbers, e-mail addresses, card numbers, addresses and more)
//! - **An external model-based detector** for names, addresses and any
//!   caller-supplied category ("project names")
//!
//! Their results are either stored ([`pipeline::DetectionWorkflow`]) or
//! applied in place to the text runs of a `.docx` package
//! ([`pipeline::MaskingWorkflow`]). Every archive entry other than the
//! rewritten XML parts is copied byte for byte.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration management
//! - [`detection`] - Pattern catalog, external detector and result merging
//! - [`masking`] - Redaction policies and text masking
//! - [`document`] - Package access, XML text runs and extraction
//! - [`pipeline`] - Engine and per-file workflows
//! - [`store`] - Detection result persistence
//! - [`audit`] - Masking audit trail
//! - [`domain`] - Core domain types and errors
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docmask::detection::PatternRegistry;
//! use docmask::pipeline::MaskingEngine;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = Arc::new(PatternRegistry::default_patterns()?);
//!     let engine = MaskingEngine::pattern_only(registry);
//!
//!     let masked = engine.mask_text("연락처 010-1234-5678", "").await;
//!     assert_eq!(masked.text, "연락처 010-****-****");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`] with [`domain::DocmaskError`].
//! External detector failures never abort a document: they are recorded next
//! to the pattern results and masking continues with the pattern rules.

pub mod audit;
pub mod cli;
pub mod config;
pub mod detection;
pub mod document;
pub mod domain;
pub mod logging;
pub mod masking;
pub mod pipeline;
pub mod store;
