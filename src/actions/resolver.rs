//! Resolution policies for confirmed duplicate sets.
//!
//! # Overview
//!
//! The [`Resolver`] applies one of the policies to a list of
//! [`DuplicateSet`]s and returns a [`ResolutionReport`]:
//!
//! - **delete-all**: keep the canonical member of every set, delete the rest
//! - **move-all**: keep the canonical member, move the rest into a quarantine
//!   directory (see [`crate::actions::quarantine`])
//! - **decide-each**: a per-set session driven by [`Decision`]s
//! - **skip**: touch nothing
//!
//! Each file is handled independently. A failed deletion or move is recorded
//! in its outcome and the remaining files are still processed. There is no
//! rollback: when a run is interrupted, completed mutations stay in place and
//! every file not yet handled is reported as untouched.
//!
//! # Decide-each session
//!
//! ```text
//!                 decide(KeepOne|Skip)
//!  AwaitingDecision ──────────────► Applying ──► AwaitingDecision (next set)
//!        │                              │
//!        │ decide(SkipAll)              └──────► Done (no sets left)
//!        ▼
//!     Aborted
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::resolver::{Resolver, ResolverConfig};
//! use dupesweep::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let (sets, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//! let report = Resolver::new(ResolverConfig::default()).delete_all(&sets);
//! println!("{} deleted, {} failed", report.deleted_count(), report.failed_count());
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::delete::{delete_file, DeleteMode};
use super::quarantine::Quarantine;
use crate::duplicates::DuplicateSet;
use crate::progress::{ProgressCallback, PHASE_RESOLVING};

/// What happened (or was attempted) to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileAction {
    /// The file was selected to stay in place.
    Kept,
    /// The file was deleted.
    Deleted,
    /// The file was moved. For a failed move, `destination` is the
    /// quarantine directory.
    Moved { destination: PathBuf },
    /// No mutation was attempted.
    Untouched,
}

impl FileAction {
    /// Short lowercase label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kept => "kept",
            Self::Deleted => "deleted",
            Self::Moved { .. } => "moved",
            Self::Untouched => "untouched",
        }
    }
}

/// Outcome for one file of one duplicate set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionOutcome {
    /// Index of the set in the resolved list
    pub set_index: usize,
    /// File the outcome refers to
    pub path: PathBuf,
    /// Action taken or attempted
    pub action: FileAction,
    /// Whether the action completed
    pub success: bool,
    /// Failure reason when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolutionOutcome {
    fn succeeded(set_index: usize, path: &Path, action: FileAction) -> Self {
        Self {
            set_index,
            path: path.to_path_buf(),
            action,
            success: true,
            error: None,
        }
    }

    /// Outcome for a file that stays in place.
    #[must_use]
    pub fn kept(set_index: usize, path: &Path) -> Self {
        Self::succeeded(set_index, path, FileAction::Kept)
    }

    /// Outcome for a file that was not touched.
    #[must_use]
    pub fn untouched(set_index: usize, path: &Path) -> Self {
        Self::succeeded(set_index, path, FileAction::Untouched)
    }

    /// Outcome for a failed action.
    #[must_use]
    pub fn failed(set_index: usize, path: &Path, action: FileAction, error: String) -> Self {
        Self {
            set_index,
            path: path.to_path_buf(),
            action,
            success: false,
            error: Some(error),
        }
    }

    /// Whether the filesystem was changed for this file.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        self.success && matches!(self.action, FileAction::Deleted | FileAction::Moved { .. })
    }
}

/// Policy applied to the found duplicate sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Keep the canonical member of each set, delete the others
    DeleteAll,
    /// Keep the canonical member of each set, move the others to quarantine
    MoveAll,
    /// Ask for a decision on every set
    DecideEach,
    /// Leave every file in place
    Skip,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DeleteAll => "delete-all",
            Self::MoveAll => "move-all",
            Self::DecideEach => "decide-each",
            Self::Skip => "skip",
        };
        f.write_str(name)
    }
}

/// Ordered record of a resolution run.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    /// Policy that produced this report
    pub policy: Policy,
    /// Outcomes in set order, then member order
    pub outcomes: Vec<ResolutionOutcome>,
    /// Bytes freed by successful deletions
    pub bytes_reclaimed: u64,
    /// Bytes relocated by successful moves
    pub bytes_moved: u64,
    /// A skip-all decision ended the session early
    pub aborted: bool,
    /// Shutdown was requested before every file was handled
    pub interrupted: bool,
}

impl ResolutionReport {
    /// Create an empty report.
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            outcomes: Vec::new(),
            bytes_reclaimed: 0,
            bytes_moved: 0,
            aborted: false,
            interrupted: false,
        }
    }

    fn absorb(&mut self, set: SetResolution) {
        self.outcomes.extend(set.outcomes);
        self.bytes_reclaimed += set.bytes_reclaimed;
        self.bytes_moved += set.bytes_moved;
        self.interrupted |= set.interrupted;
    }

    fn count(&self, pred: impl Fn(&ResolutionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }

    /// Files successfully deleted.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.count(|o| o.success && o.action == FileAction::Deleted)
    }

    /// Files successfully moved.
    #[must_use]
    pub fn moved_count(&self) -> usize {
        self.count(|o| o.success && matches!(o.action, FileAction::Moved { .. }))
    }

    /// Files kept in place.
    #[must_use]
    pub fn kept_count(&self) -> usize {
        self.count(|o| o.action == FileAction::Kept)
    }

    /// Files left untouched (skipped, aborted or interrupted).
    #[must_use]
    pub fn untouched_count(&self) -> usize {
        self.count(|o| o.action == FileAction::Untouched)
    }

    /// Failed deletions and moves.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(|o| !o.success)
    }

    /// Whether any action failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.success)
    }

    /// Iterate over failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &ResolutionOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Iterate over the outcomes of one set.
    pub fn outcomes_for_set(&self, set_index: usize) -> impl Iterator<Item = &ResolutionOutcome> {
        self.outcomes.iter().filter(move |o| o.set_index == set_index)
    }

    /// Human-readable one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} kept", self.kept_count())];
        match self.policy {
            Policy::MoveAll => parts.push(format!("{} moved", self.moved_count())),
            Policy::Skip => {}
            Policy::DeleteAll | Policy::DecideEach => {
                parts.push(format!("{} deleted", self.deleted_count()));
            }
        }
        if self.untouched_count() > 0 {
            parts.push(format!("{} untouched", self.untouched_count()));
        }
        if self.has_failures() {
            parts.push(format!("{} failed", self.failed_count()));
        }
        let mut line = parts.join(", ");
        if self.bytes_reclaimed > 0 {
            line.push_str(&format!(
                ", {} reclaimed",
                bytesize::ByteSize::b(self.bytes_reclaimed)
            ));
        }
        line
    }
}

/// Receives every outcome as soon as it is recorded.
pub trait OutcomeObserver: Send + Sync {
    /// Called once per file, in report order.
    fn on_outcome(&self, outcome: &ResolutionOutcome);
}

/// A per-set decision in the decide-each session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep the member at this 0-based index, delete every other member
    KeepOne(usize),
    /// Leave this set untouched
    Skip,
    /// Leave this and every later set untouched
    SkipAll,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepOne(index) => write!(f, "keep file {}", index + 1),
            Self::Skip => f.write_str("skip set"),
            Self::SkipAll => f.write_str("skip all remaining sets"),
        }
    }
}

/// A decision the session cannot apply. Nothing is mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecisionError {
    /// `KeepOne` names a member the set does not have.
    #[error("index {index} is out of range for a set of {len} files")]
    IndexOutOfRange { index: usize, len: usize },

    /// The session already reached `Done` or `Aborted`.
    #[error("no set is awaiting a decision")]
    SessionFinished,
}

/// Hard failures of a whole resolution call.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The quarantine directory could not be created. No file was moved.
    #[error("quarantine directory {path} is unavailable: {source}")]
    QuarantineUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcomes of one set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetResolution {
    /// Outcomes in member order
    pub outcomes: Vec<ResolutionOutcome>,
    /// Bytes freed by deletions in this set
    pub bytes_reclaimed: u64,
    /// Bytes relocated by moves in this set
    pub bytes_moved: u64,
    /// Shutdown stopped the set part-way
    pub interrupted: bool,
}

/// Configuration for the resolver.
#[derive(Clone, Default)]
pub struct ResolverConfig {
    /// How deletions are carried out.
    pub delete_mode: DeleteMode,
    /// Optional shutdown flag; checked before every mutation.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for the bulk policies.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Optional observer receiving outcomes as they happen.
    pub observer: Option<Arc<dyn OutcomeObserver>>,
}

impl fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("delete_mode", &self.delete_mode)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("observer", &self.observer.as_ref().map(|_| "<observer>"))
            .finish()
    }
}

impl ResolverConfig {
    /// Set the deletion mode.
    #[must_use]
    pub fn with_delete_mode(mut self, mode: DeleteMode) -> Self {
        self.delete_mode = mode;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the outcome observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn OutcomeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

enum Mutation<'q> {
    Delete,
    Move(&'q Quarantine),
}

/// Applies resolution policies to duplicate sets.
#[derive(Debug, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    /// Create a resolver with the given configuration.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.config
            .shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn emit(&self, outcome: &ResolutionOutcome) {
        if let Some(ref observer) = self.config.observer {
            observer.on_outcome(outcome);
        }
    }

    /// Keep `files[0]` of every set and delete every other member.
    #[must_use]
    pub fn delete_all(&self, sets: &[DuplicateSet]) -> ResolutionReport {
        log::info!(
            "Resolving {} sets with delete-all ({:?})",
            sets.len(),
            self.config.delete_mode
        );
        self.run_bulk(Policy::DeleteAll, sets, &Mutation::Delete)
    }

    /// Keep `files[0]` of every set and move every other member into
    /// `quarantine_dir`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::QuarantineUnavailable`] before any move if the
    /// directory cannot be created.
    pub fn move_all(
        &self,
        sets: &[DuplicateSet],
        quarantine_dir: &Path,
    ) -> Result<ResolutionReport, ResolveError> {
        let quarantine = Quarantine::create(quarantine_dir).map_err(|source| {
            log::debug!(
                "Cannot create quarantine directory {}: {}",
                quarantine_dir.display(),
                source
            );
            ResolveError::QuarantineUnavailable {
                path: quarantine_dir.to_path_buf(),
                source,
            }
        })?;

        log::info!(
            "Resolving {} sets with move-all into {}",
            sets.len(),
            quarantine.dir().display()
        );
        Ok(self.run_bulk(Policy::MoveAll, sets, &Mutation::Move(&quarantine)))
    }

    /// Report every member of every set as untouched.
    #[must_use]
    pub fn skip_all(&self, sets: &[DuplicateSet]) -> ResolutionReport {
        let mut report = ResolutionReport::new(Policy::Skip);
        for (set_index, set) in sets.iter().enumerate() {
            report.absorb(self.untouched_set(set_index, set));
        }
        report
    }

    /// Start a decide-each session over `sets`.
    #[must_use]
    pub fn decide_each<'a>(&'a self, sets: &'a [DuplicateSet]) -> DecideEach<'a> {
        DecideEach::new(self, sets)
    }

    /// Apply one decision to one set.
    ///
    /// `KeepOne(i)` deletes every member except `i`; `Skip` and `SkipAll`
    /// leave the set untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::IndexOutOfRange`] without touching any file
    /// if `KeepOne` names a member the set does not have.
    pub fn apply_decision(
        &self,
        set_index: usize,
        set: &DuplicateSet,
        decision: Decision,
    ) -> Result<SetResolution, DecisionError> {
        match decision {
            Decision::KeepOne(index) if index >= set.len() => Err(DecisionError::IndexOutOfRange {
                index,
                len: set.len(),
            }),
            Decision::KeepOne(index) => {
                log::debug!("Set {}: keeping {}", set_index, set.files[index].display());
                Ok(self.resolve_set(set_index, set, index, &Mutation::Delete))
            }
            Decision::Skip | Decision::SkipAll => {
                log::debug!("Set {}: {}", set_index, decision);
                Ok(self.untouched_set(set_index, set))
            }
        }
    }

    fn run_bulk(
        &self,
        policy: Policy,
        sets: &[DuplicateSet],
        mutation: &Mutation<'_>,
    ) -> ResolutionReport {
        let mut report = ResolutionReport::new(policy);
        let total: usize = sets.iter().map(DuplicateSet::duplicate_count).sum();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_RESOLVING, total);
        }

        let mut done = 0;
        for (set_index, set) in sets.iter().enumerate() {
            if report.interrupted || self.is_shutdown_requested() {
                report.interrupted = true;
                report.absorb(self.untouched_set(set_index, set));
                continue;
            }

            let resolution = self.resolve_set(set_index, set, 0, mutation);
            done += set.duplicate_count();
            if let Some(ref callback) = self.config.progress_callback {
                let label = set
                    .files
                    .first()
                    .map(|path| path.to_string_lossy())
                    .unwrap_or_default();
                callback.on_progress(done, &label);
            }
            report.absorb(resolution);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_RESOLVING);
        }

        if report.interrupted {
            log::warn!("Resolution interrupted; remaining files left untouched");
        }
        log::info!("Resolution complete: {}", report.summary());
        report
    }

    fn resolve_set(
        &self,
        set_index: usize,
        set: &DuplicateSet,
        keep: usize,
        mutation: &Mutation<'_>,
    ) -> SetResolution {
        let mut resolution = SetResolution::default();

        for (i, path) in set.files.iter().enumerate() {
            let outcome = if i == keep {
                ResolutionOutcome::kept(set_index, path)
            } else if resolution.interrupted || self.is_shutdown_requested() {
                resolution.interrupted = true;
                ResolutionOutcome::untouched(set_index, path)
            } else {
                match mutation {
                    Mutation::Delete => match delete_file(path, self.config.delete_mode) {
                        Ok(result) => {
                            resolution.bytes_reclaimed += result.size;
                            ResolutionOutcome::succeeded(set_index, path, FileAction::Deleted)
                        }
                        Err(e) => {
                            log::debug!("Error deleting file {}: {}", path.display(), e);
                            ResolutionOutcome::failed(
                                set_index,
                                path,
                                FileAction::Deleted,
                                e.to_string(),
                            )
                        }
                    },
                    Mutation::Move(quarantine) => match quarantine.move_into(path) {
                        Ok(result) => {
                            resolution.bytes_moved += result.size;
                            ResolutionOutcome::succeeded(
                                set_index,
                                path,
                                FileAction::Moved {
                                    destination: result.destination,
                                },
                            )
                        }
                        Err(e) => {
                            log::debug!("Error moving file {}: {}", path.display(), e);
                            ResolutionOutcome::failed(
                                set_index,
                                path,
                                FileAction::Moved {
                                    destination: quarantine.dir().to_path_buf(),
                                },
                                e.to_string(),
                            )
                        }
                    },
                }
            };

            self.emit(&outcome);
            resolution.outcomes.push(outcome);
        }

        resolution
    }

    fn untouched_set(&self, set_index: usize, set: &DuplicateSet) -> SetResolution {
        let outcomes = set
            .files
            .iter()
            .map(|path| ResolutionOutcome::untouched(set_index, path))
            .inspect(|outcome| self.emit(outcome))
            .collect();
        SetResolution {
            outcomes,
            ..Default::default()
        }
    }
}

/// State of a decide-each session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the decision on the set at this index.
    AwaitingDecision { set_index: usize },
    /// The decision for this set is being carried out.
    Applying { set_index: usize },
    /// Every set received a decision.
    Done,
    /// A skip-all decision (or shutdown) ended the session.
    Aborted,
}

/// Per-set decision session.
///
/// Obtain one with [`Resolver::decide_each`], feed it a [`Decision`] per
/// set with [`DecideEach::decide`], then call [`DecideEach::finish`].
///
/// # Example
///
/// ```no_run
/// use dupesweep::actions::resolver::{Decision, Resolver};
/// # let sets: Vec<dupesweep::duplicates::DuplicateSet> = Vec::new();
///
/// let resolver = Resolver::default();
/// let mut session = resolver.decide_each(&sets);
/// while session.current_set().is_some() {
///     session.decide(Decision::KeepOne(0)).unwrap();
/// }
/// let report = session.finish();
/// ```
#[derive(Debug)]
pub struct DecideEach<'a> {
    resolver: &'a Resolver,
    sets: &'a [DuplicateSet],
    state: SessionState,
    report: ResolutionReport,
}

impl<'a> DecideEach<'a> {
    fn new(resolver: &'a Resolver, sets: &'a [DuplicateSet]) -> Self {
        let state = if sets.is_empty() {
            SessionState::Done
        } else {
            SessionState::AwaitingDecision { set_index: 0 }
        };
        Self {
            resolver,
            sets,
            state,
            report: ResolutionReport::new(Policy::DecideEach),
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session reached `Done` or `Aborted`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Done | SessionState::Aborted)
    }

    /// Number of sets in the session.
    #[must_use]
    pub fn total_sets(&self) -> usize {
        self.sets.len()
    }

    /// The set awaiting a decision, with its index.
    #[must_use]
    pub fn current_set(&self) -> Option<(usize, &'a DuplicateSet)> {
        match self.state {
            SessionState::AwaitingDecision { set_index } => {
                self.sets.get(set_index).map(|set| (set_index, set))
            }
            _ => None,
        }
    }

    /// Apply a decision to the current set and advance.
    ///
    /// Returns the outcomes recorded for the set.
    ///
    /// # Errors
    ///
    /// - [`DecisionError::IndexOutOfRange`]: nothing changes; the same set
    ///   is still awaiting a decision
    /// - [`DecisionError::SessionFinished`]: the session is over
    pub fn decide(&mut self, decision: Decision) -> Result<&[ResolutionOutcome], DecisionError> {
        let Some((set_index, set)) = self.current_set() else {
            return Err(DecisionError::SessionFinished);
        };

        if self.resolver.is_shutdown_requested() {
            self.report.interrupted = true;
            self.abort_from(set_index);
            return Ok(self.recorded_from(set_index));
        }

        self.state = SessionState::Applying { set_index };
        let resolution = match self.resolver.apply_decision(set_index, set, decision) {
            Ok(resolution) => resolution,
            Err(e) => {
                self.state = SessionState::AwaitingDecision { set_index };
                return Err(e);
            }
        };

        let start = self.report.outcomes.len();
        let interrupted = resolution.interrupted;
        self.report.absorb(resolution);

        if decision == Decision::SkipAll {
            self.report.aborted = true;
            self.abort_from(set_index + 1);
        } else if interrupted {
            self.abort_from(set_index + 1);
        } else if set_index + 1 < self.sets.len() {
            self.state = SessionState::AwaitingDecision {
                set_index: set_index + 1,
            };
        } else {
            self.state = SessionState::Done;
        }

        Ok(&self.report.outcomes[start..])
    }

    /// Mark sets from `first` onward untouched and enter `Aborted`.
    fn abort_from(&mut self, first: usize) {
        for (set_index, set) in self.sets.iter().enumerate().skip(first) {
            let untouched = self.resolver.untouched_set(set_index, set);
            self.report.absorb(untouched);
        }
        self.state = SessionState::Aborted;
    }

    fn recorded_from(&self, set_index: usize) -> &[ResolutionOutcome] {
        let start = self
            .report
            .outcomes
            .iter()
            .position(|o| o.set_index >= set_index)
            .unwrap_or(self.report.outcomes.len());
        &self.report.outcomes[start..]
    }

    /// End the session and return its report.
    ///
    /// Sets that never received a decision are reported untouched.
    #[must_use]
    pub fn finish(mut self) -> ResolutionReport {
        if let Some((set_index, _)) = self.current_set() {
            for (index, set) in self.sets.iter().enumerate().skip(set_index) {
                let untouched = self.resolver.untouched_set(index, set);
                self.report.absorb(untouched);
            }
        }
        log::info!("Decide-each complete: {}", self.report.summary());
        self.report
    }
}
