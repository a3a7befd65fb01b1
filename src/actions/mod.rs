//! File actions module.
//!
//! This module provides functionality for:
//! - Single-file deletion, permanent or to the system trash
//! - Collision-safe moves into a quarantine directory
//! - Resolution policies over duplicate sets
//!
//! # Resolution
//!
//! ```no_run
//! use dupesweep::actions::{Resolver, ResolverConfig};
//! # let sets: Vec<dupesweep::duplicates::DuplicateSet> = Vec::new();
//!
//! let resolver = Resolver::new(ResolverConfig::default());
//! let report = resolver.delete_all(&sets);
//! println!("{}", report.summary());
//! ```

pub mod delete;
pub mod quarantine;
pub mod resolver;

// Re-export commonly used types
pub use delete::{delete_file, delete_to_trash, permanent_delete, DeleteError, DeleteMode, DeleteResult};
pub use quarantine::{candidate_name, MoveError, MoveResult, Quarantine};
pub use resolver::{
    DecideEach, Decision, DecisionError, FileAction, OutcomeObserver, Policy, ResolutionOutcome,
    ResolutionReport, ResolveError, Resolver, ResolverConfig, SessionState, SetResolution,
};
