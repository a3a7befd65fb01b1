//! dupesweep - duplicate file finder and resolver
//!
//! Finds files with identical content under a directory tree (size
//! grouping, then a BLAKE3 digest of the full content) and resolves each
//! duplicate set by deleting, quarantining or asking about the redundant
//! copies.

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod prompt;
pub mod scanner;
pub mod signal;

pub use app::{run_app, run_app_with};
