//! Structured error handling and exit codes.

use serde::Serialize;

use crate::actions::ResolutionReport;
use crate::duplicates::ScanSummary;

/// Exit codes for the dupesweep binary.
///
/// - 0: Success (duplicates found, and resolved without failures)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found
/// - 3: Partial success (files skipped during the scan, or failed mutations)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: duplicates were found (and resolved, if asked).
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: some files were skipped or some actions failed.
    PartialSuccess = 3,
    /// Interrupted: the run was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
            Self::Interrupted => "DS130",
        }
    }

    /// Exit code for a finished scan.
    #[must_use]
    pub fn from_scan(set_count: usize, summary: &ScanSummary) -> Self {
        if summary.interrupted {
            Self::Interrupted
        } else if set_count == 0 {
            Self::NoDuplicates
        } else if summary.has_errors() {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }

    /// Exit code for a finished resolution run.
    #[must_use]
    pub fn from_resolution(summary: &ScanSummary, report: &ResolutionReport) -> Self {
        if report.interrupted {
            Self::Interrupted
        } else if report.has_failures() || summary.has_errors() {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
