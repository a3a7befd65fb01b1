//! Interactive prompts: the policy menu, per-set decisions and confirmations.
//!
//! The resolver never reads input itself. The binary asks through a
//! [`Prompter`]; [`TerminalPrompter`] implements it with dialoguer, and
//! tests substitute scripted answers.
//!
//! Per-set answers use a short syntax:
//!
//! | Input   | Decision                                   |
//! |---------|--------------------------------------------|
//! | `k <n>` | keep file number `n` (1-based), delete rest|
//! | `s`     | skip this set                              |
//! | `a`     | skip this and all remaining sets           |

use dialoguer::{Confirm, Input, Select};
use thiserror::Error;

use crate::actions::{Decision, Policy};
use crate::duplicates::DuplicateSet;
use crate::output::text::format_set;

/// Why a per-set answer was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseDecisionError {
    /// Nothing was typed.
    #[error("please enter a choice (e.g. 'k 1' to keep the first file)")]
    Empty,

    /// The first word is not a known command.
    #[error("unknown choice '{0}' (use 'k <number>', 's' or 'a')")]
    UnknownCommand(String),

    /// `k` without a file number.
    #[error("'k' needs a file number, e.g. 'k 1'")]
    MissingNumber,

    /// The file number is not a positive integer.
    #[error("'{0}' is not a file number")]
    InvalidNumber(String),

    /// The file number is outside the set.
    #[error("file number {number} is out of range (1-{len})")]
    OutOfRange { number: usize, len: usize },

    /// Extra words after a complete command.
    #[error("unexpected '{0}' after the choice")]
    TrailingInput(String),
}

/// Parse a per-set answer for a set of `set_len` files.
///
/// ```
/// use dupesweep::actions::Decision;
/// use dupesweep::prompt::parse_decision;
///
/// assert_eq!(parse_decision("k 2", 3), Ok(Decision::KeepOne(1)));
/// assert_eq!(parse_decision("S", 3), Ok(Decision::Skip));
/// assert_eq!(parse_decision("a", 3), Ok(Decision::SkipAll));
/// assert!(parse_decision("k 4", 3).is_err());
/// ```
///
/// # Errors
///
/// Returns a [`ParseDecisionError`] describing what to fix.
pub fn parse_decision(input: &str, set_len: usize) -> Result<Decision, ParseDecisionError> {
    let lowered = input.trim().to_lowercase();
    let mut words = lowered.split_whitespace();
    let Some(command) = words.next() else {
        return Err(ParseDecisionError::Empty);
    };

    let decision = match command {
        "s" | "skip" => Decision::Skip,
        "a" | "all" => Decision::SkipAll,
        "k" | "keep" => {
            let raw = words.next().ok_or(ParseDecisionError::MissingNumber)?;
            // Digits only: `parse` would also take a leading '+'
            if !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseDecisionError::InvalidNumber(raw.to_string()));
            }
            let number: usize = raw
                .parse()
                .map_err(|_| ParseDecisionError::InvalidNumber(raw.to_string()))?;
            if number == 0 || number > set_len {
                return Err(ParseDecisionError::OutOfRange {
                    number,
                    len: set_len,
                });
            }
            Decision::KeepOne(number - 1)
        }
        other => return Err(ParseDecisionError::UnknownCommand(other.to_string())),
    };

    if let Some(extra) = words.next() {
        return Err(ParseDecisionError::TrailingInput(extra.to_string()));
    }
    Ok(decision)
}

/// Errors from interactive input.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The terminal could not be read (closed stdin, not a TTY, Ctrl+C).
    #[error("failed to read input: {0}")]
    Input(#[from] dialoguer::Error),

    /// An answer passed validation but could not be parsed.
    #[error("invalid choice: {0}")]
    Decision(#[from] ParseDecisionError),
}

/// Source of interactive answers.
pub trait Prompter {
    /// Ask which policy to apply to `set_count` sets.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] if input cannot be read.
    fn choose_policy(&mut self, set_count: usize) -> Result<Policy, PromptError>;

    /// Ask for a decision on one set.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] if input cannot be read.
    fn decide(
        &mut self,
        set_index: usize,
        total_sets: usize,
        set: &DuplicateSet,
    ) -> Result<Decision, PromptError>;

    /// Yes/no confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] if input cannot be read.
    fn confirm(&mut self, question: &str) -> Result<bool, PromptError>;
}

/// Menu entries, in the order they are shown.
const POLICY_MENU: [(Policy, &str); 4] = [
    (
        Policy::DeleteAll,
        "Delete all duplicates (keeps one original of each set)",
    ),
    (Policy::MoveAll, "Move all duplicates to a separate folder"),
    (Policy::DecideEach, "Decide for each set individually"),
    (Policy::Skip, "Do nothing (skip)"),
];

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn choose_policy(&mut self, set_count: usize) -> Result<Policy, PromptError> {
        let items: Vec<&str> = POLICY_MENU.iter().map(|(_, label)| *label).collect();
        let selection = Select::new()
            .with_prompt(format!("How would you like to handle these {set_count} sets?"))
            .items(&items)
            .default(0)
            .interact_opt()?;

        // Esc / q leaves everything in place
        Ok(selection.map_or(Policy::Skip, |i| POLICY_MENU[i].0))
    }

    fn decide(
        &mut self,
        set_index: usize,
        total_sets: usize,
        set: &DuplicateSet,
    ) -> Result<Decision, PromptError> {
        println!();
        print!("{}", format_set(set_index + 1, set));
        println!("  of {total_sets} sets. k <number>: keep that file, delete the rest | s: skip | a: skip all");

        let len = set.len();
        let answer: String = Input::new()
            .with_prompt("Your choice")
            .validate_with(move |input: &String| -> Result<(), String> {
                parse_decision(input, len).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()?;

        Ok(parse_decision(&answer, len)?)
    }

    fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        Ok(Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()?)
    }
}
