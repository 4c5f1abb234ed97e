//! Mask command implementation
//!
//! Writes a masked copy of each Word document next to the original.

use super::build_engine;
use crate::audit::AuditLogger;
use crate::config::load_config_or_default;
use crate::document::DocumentRewriter;
use crate::pipeline::MaskingWorkflow;
use clap::Args;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the mask command
#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Word documents to mask (prompted for when omitted)
    pub paths: Vec<PathBuf>,

    /// Additional information to mask, e.g. "project names"
    #[arg(short, long)]
    pub info: Option<String>,
}

impl MaskArgs {
    /// Execute the mask command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting mask command");

        let (paths, directive) = if self.paths.is_empty() {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let paths = prompt_paths(&mut input)?;
            let directive = match self.info {
                Some(ref info) => info.clone(),
                None => prompt_line(
                    &mut input,
                    "Additional information to mask (leave blank for none): ",
                )?,
            };
            (paths, directive)
        } else {
            (self.paths.clone(), self.info.clone().unwrap_or_default())
        };

        if paths.is_empty() {
            println!("No documents given.");
            return Ok(0);
        }

        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("Configuration validation failed: {e}");
                return Ok(2);
            }
        };

        let engine = match build_engine(&config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Failed to initialize detectors: {e:#}");
                return Ok(2);
            }
        };

        let audit = match AuditLogger::from_config(&config.audit) {
            Ok(audit) => audit,
            Err(e) => {
                eprintln!("Failed to open audit log: {e:#}");
                return Ok(5);
            }
        };

        let workflow = MaskingWorkflow::new(DocumentRewriter::new(engine, &config.masking), audit);

        let report = workflow
            .mask_documents(&paths, &directive, &shutdown_signal)
            .await;

        for document in &report.documents {
            match document.result {
                Ok(ref outcome) => {
                    println!("✅ {} -> {}", document.input.display(), outcome.output.display());
                    if outcome.external_degraded() {
                        println!("   ⚠️  External detection unavailable; pattern rules only");
                    }
                }
                Err(ref e) => println!("❌ {}: {e}", document.input.display()),
            }
        }

        println!();
        println!("📊 Masking Summary:");
        println!("  Masked: {}", report.succeeded());
        println!("  Failed: {}", report.failed());

        let exit_code = if report.interrupted() {
            println!("  Skipped: {}", report.skipped.len());
            println!();
            println!("⚠️  Masking interrupted; remaining documents were skipped.");
            130
        } else if report.failed() > 0 {
            1
        } else {
            0
        };

        Ok(exit_code)
    }
}

fn prompt_line(input: &mut impl BufRead, message: &str) -> io::Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Reads one or more comma-separated paths
fn prompt_paths(input: &mut impl BufRead) -> io::Result<Vec<PathBuf>> {
    let line = prompt_line(input, "Path of the Word document(s) to mask: ")?;
    Ok(split_paths(&line))
}

fn split_paths(line: &str) -> Vec<PathBuf> {
    line.split(',')
        .map(|p| p.trim().trim_matches('"'))
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}
