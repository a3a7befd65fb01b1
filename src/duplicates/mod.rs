//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Content digest comparison (Phase 2)
//! - Duplicate set management

pub mod finder;
pub mod groups;

pub use finder::{
    hash_size_groups, partition_by_digest, DuplicateFinder, FinderConfig, FinderError,
    HashConfig, HashStats, ScanSummary,
};
pub use groups::{group_by_size, DuplicateSet, GroupingStats, SizeGroup};
