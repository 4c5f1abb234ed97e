//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for docmask using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// docmask - detect and mask personal information in office documents
#[derive(Parser, Debug)]
#[command(name = "docmask")]
#[command(version, about, long_about = None)]
#[command(author = "docmask Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "docmask.toml", env = "DOCMASK_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DOCMASK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect personal information and store the result
    Detect(commands::detect::DetectArgs),

    /// Write masked copies of Word documents
    Mask(commands::mask::MaskArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
