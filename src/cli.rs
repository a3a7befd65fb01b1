//! Command-line interface definitions for dupesweep.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, colour, config file) apply to every subcommand; scan options
//! are shared by `scan` and `resolve`.
//!
//! # Example
//!
//! ```bash
//! # List duplicate sets
//! dupesweep scan ~/Downloads
//!
//! # List as JSON for scripting
//! dupesweep scan ~/Downloads --output json
//!
//! # Delete every redundant copy, logging to operation_log.txt instead of the console
//! dupesweep resolve ~/Downloads --policy delete-all --silent --yes
//!
//! # Move redundant copies to ~/Downloads/duplicates
//! dupesweep resolve ~/Downloads --policy move-all
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::actions::Policy;

/// Find files with identical content and resolve the duplication.
///
/// dupesweep groups files by size, confirms duplicates with a BLAKE3 digest of
/// the full content, then deletes, quarantines or asks about each set.
#[derive(Debug, Parser)]
#[command(name = "dupesweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (TOML) to use instead of the platform default
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory and list duplicate sets
    Scan(ScanArgs),
    /// Scan a directory, then delete or quarantine duplicates
    Resolve(ResolveArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

/// Options that control the scan, shared by `scan` and `resolve`.
#[derive(Debug, Clone, Default, Args)]
pub struct ScanOptions {
    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=256))]
    pub io_threads: Option<u32>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Skip zero-byte files
    #[arg(long)]
    pub skip_empty: bool,

    /// Abort on the first unreadable file instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(flatten)]
    pub options: ScanOptions,
}

/// Arguments for the resolve subcommand.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Resolution policy; asked interactively when omitted
    #[arg(short, long, value_enum)]
    pub policy: Option<Policy>,

    /// Quarantine directory for move-all (default: <PATH>/duplicates)
    #[arg(long, value_name = "DIR")]
    pub quarantine: Option<PathBuf>,

    /// Move deleted files to the system trash instead of removing them
    #[arg(long)]
    pub trash: bool,

    /// Append status lines to the log file instead of printing them
    #[arg(long)]
    pub silent: bool,

    /// Log file for silent mode (default: operation_log.txt)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Skip the confirmation prompt for delete-all and move-all
    #[arg(short = 'y', long)]
    pub yes: bool,

    #[command(flatten)]
    pub options: ScanOptions,
}

/// Arguments for the config subcommand.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Print only the default configuration file location
    #[arg(long)]
    pub path: bool,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
