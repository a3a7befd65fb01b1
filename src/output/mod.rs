//! Output formatters for scan results and resolution runs.
//!
//! This module provides:
//! - Plain status lines and set listings ([`text`])
//! - Console and append-only log file destinations ([`sink`])
//! - JSON for automation and scripting ([`json`])
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::DuplicateFinder;
//! use dupesweep::output::text::format_listing;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, _summary) = finder.find_duplicates(Path::new(".")).unwrap();
//! print!("{}", format_listing(&sets));
//! ```

pub mod json;
pub mod sink;
pub mod text;

// Re-export main types
pub use json::{JsonOutput, JsonOutputError};
pub use sink::{ConsoleSink, LineKind, LogFileSink, ReportSink, SinkObserver};
