//! Human-readable lines for scans and resolution runs.
//!
//! Every function here returns plain strings; colour is applied by the
//! console sink (see [`crate::output::sink`]) so the same lines can be
//! appended to a log file unchanged.

use std::fmt::Write as _;

use bytesize::ByteSize;

use crate::actions::{FileAction, ResolutionOutcome, ResolutionReport};
use crate::duplicates::{DuplicateSet, ScanSummary};

const RULE_WIDTH: usize = 50;

/// Listing of one set, numbered from 1.
///
/// ```
/// use dupesweep::duplicates::DuplicateSet;
/// use dupesweep::output::text::format_set;
/// use std::path::PathBuf;
///
/// let set = DuplicateSet::new([0; 32], 5, vec![PathBuf::from("a"), PathBuf::from("b")]);
/// let text = format_set(1, &set);
/// assert!(text.starts_with("--- Set 1 ---"));
/// assert!(text.contains("  1. a"));
/// ```
#[must_use]
pub fn format_set(number: usize, set: &DuplicateSet) -> String {
    let mut out = format!(
        "--- Set {} --- ({} files, {} each)\n",
        number,
        set.len(),
        ByteSize::b(set.size)
    );
    for (i, path) in set.files.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, path.display());
    }
    out
}

/// Full listing of all sets, framed by rules.
#[must_use]
pub fn format_listing(sets: &[DuplicateSet]) -> String {
    if sets.is_empty() {
        return "No duplicate files found.\n".to_string();
    }

    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("{rule}\n{:^RULE_WIDTH$}\n{rule}\n", "DUPLICATE FILES FOUND");
    for (i, set) in sets.iter().enumerate() {
        out.push('\n');
        out.push_str(&format_set(i + 1, set));
    }
    let _ = writeln!(out, "\n{rule}");
    out
}

/// Scan statistics, one line each.
#[must_use]
pub fn summary_lines(summary: &ScanSummary) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Scanned {} files ({})",
            summary.total_files,
            summary.total_size_display()
        ),
        format!(
            "Found {} duplicate sets, {} redundant files",
            summary.duplicate_sets, summary.duplicate_files
        ),
        format!(
            "Reclaimable: {} ({:.1}%)",
            summary.reclaimable_display(),
            summary.wasted_percentage()
        ),
    ];
    if summary.has_errors() {
        lines.push(format!("Skipped {} unreadable files", summary.scan_errors.len()));
    }
    lines
}

/// One line per file skipped during the scan.
#[must_use]
pub fn skipped_lines(summary: &ScanSummary) -> Vec<String> {
    summary
        .scan_errors
        .iter()
        .map(|e| format!("Skipped {}: {}", e.path().display(), e))
        .collect()
}

/// Status line for a resolution outcome.
///
/// Kept and untouched files produce no line.
#[must_use]
pub fn outcome_line(outcome: &ResolutionOutcome) -> Option<String> {
    let path = outcome.path.display();
    let reason = outcome.error.as_deref().unwrap_or("unknown error");
    match (&outcome.action, outcome.success) {
        (FileAction::Deleted, true) => Some(format!("Deleted duplicate: {path}")),
        (FileAction::Deleted, false) => Some(format!("Error deleting file {path}: {reason}")),
        (FileAction::Moved { destination }, true) => Some(format!(
            "Moved duplicate: {path} -> {}",
            destination.display()
        )),
        (FileAction::Moved { .. }, false) => Some(format!("Error moving file {path}: {reason}")),
        (FileAction::Kept | FileAction::Untouched, _) => None,
    }
}

/// Closing line of a resolution run.
#[must_use]
pub fn report_line(report: &ResolutionReport) -> String {
    let mut line = format!("Resolution ({}) finished: {}", report.policy, report.summary());
    if report.aborted {
        line.push_str(" - remaining sets skipped");
    }
    if report.interrupted {
        line.push_str(" - interrupted");
    }
    line
}
