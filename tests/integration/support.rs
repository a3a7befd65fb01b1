use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dupesweep::actions::{Decision, Policy};
use dupesweep::duplicates::DuplicateSet;
use dupesweep::prompt::{PromptError, Prompter};

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Prompter answering from fixed scripts. Running out of decisions behaves
/// like a closed stdin.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    pub policy: Option<Policy>,
    pub confirm: bool,
    pub decisions: VecDeque<Decision>,
    pub asked_sets: Vec<usize>,
    pub questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn with_decisions(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn choose_policy(&mut self, _set_count: usize) -> Result<Policy, PromptError> {
        Ok(self.policy.unwrap_or(Policy::Skip))
    }

    fn decide(
        &mut self,
        set_index: usize,
        _total_sets: usize,
        _set: &DuplicateSet,
    ) -> Result<Decision, PromptError> {
        self.asked_sets.push(set_index);
        self.decisions.pop_front().ok_or_else(|| {
            let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed");
            PromptError::from(dialoguer::Error::from(eof))
        })
    }

    fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        self.questions.push(question.to_string());
        Ok(self.confirm)
    }
}
