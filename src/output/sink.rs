//! Destinations for status lines: the console or an append-only log file.
//!
//! Resolution outcomes reach a sink through [`SinkObserver`], which the
//! resolver calls as each file is handled.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use yansi::Paint;

use super::text::outcome_line;
use crate::actions::{OutcomeObserver, ResolutionOutcome};

/// Kind of a status line; consoles colour them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Neutral information
    Info,
    /// A completed mutation
    Success,
    /// A failed mutation or skipped file
    Failure,
}

impl LineKind {
    /// Kind for a resolution outcome.
    #[must_use]
    pub fn of(outcome: &ResolutionOutcome) -> Self {
        if !outcome.success {
            Self::Failure
        } else if outcome.is_mutation() {
            Self::Success
        } else {
            Self::Info
        }
    }
}

/// Receives human-readable status lines.
pub trait ReportSink: Send + Sync {
    /// Emit one line (without trailing newline).
    fn emit(&self, kind: LineKind, line: &str);

    /// Emit a neutral line.
    fn info(&self, line: &str) {
        self.emit(LineKind::Info, line);
    }
}

/// Prints lines to stdout, failures to stderr.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    quiet: bool,
}

impl ConsoleSink {
    /// Create a console sink. A quiet sink prints failures only.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ReportSink for ConsoleSink {
    fn emit(&self, kind: LineKind, line: &str) {
        match kind {
            LineKind::Failure => eprintln!("{}", line.red()),
            _ if self.quiet => {}
            LineKind::Success => println!("{}", line.green()),
            LineKind::Info => println!("{line}"),
        }
    }
}

/// Appends timestamped lines to a UTF-8 log file.
#[derive(Debug)]
pub struct LogFileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogFileSink {
    /// Open `path` for appending, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        log::debug!("Appending status lines to {}", path.display());
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// The log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for LogFileSink {
    fn emit(&self, kind: LineKind, line: &str) {
        let level = match kind {
            LineKind::Failure => "ERROR",
            LineKind::Info | LineKind::Success => "INFO",
        };
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(file, "[{stamp}] {level} {line}") {
            log::warn!("Failed to write to {}: {}", self.path.display(), e);
        }
    }
}

/// Forwards resolution outcomes to a sink as status lines.
pub struct SinkObserver {
    sink: Arc<dyn ReportSink>,
}

impl SinkObserver {
    /// Wrap a sink.
    #[must_use]
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self { sink }
    }
}

impl OutcomeObserver for SinkObserver {
    fn on_outcome(&self, outcome: &ResolutionOutcome) {
        if let Some(line) = outcome_line(outcome) {
            self.sink.emit(LineKind::of(outcome), &line);
        }
    }
}
