//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module holds the two data structures of the detection pipeline:
//!
//! - [`SizeGroup`]: files sharing one byte size (Phase 1 output)
//! - [`DuplicateSet`]: files sharing size *and* content digest (Phase 2 output)
//!
//! ## Size Grouping (Phase 1)
//!
//! Files with different sizes cannot be duplicates, so grouping by exact size
//! removes most files from consideration without reading any content.
//! Groups keep traversal order, and the groups themselves are returned in the
//! order their first member was visited.
//!
//! # Example
//!
//! ```
//! use dupesweep::scanner::FileEntry;
//! use dupesweep::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! // Only groups with 2+ files are potential duplicates
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::{hash_to_hex, FileEntry, Hash};

/// A group of files with the same size.
///
/// Paths are kept in the order the walker visited them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in traversal order
    pub files: Vec<PathBuf>,
}

impl SizeGroup {
    /// Create an empty size group.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Create a size group with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<PathBuf>) -> Self {
        Self { size, files }
    }

    /// Append a file to this group.
    pub fn add(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }

    /// Potential space savings (all copies minus one).
    #[must_use]
    pub fn potential_savings(&self) -> u64 {
        self.size * (self.files.len() as u64).saturating_sub(1)
    }
}

/// Confirmed set of byte-identical files.
///
/// Invariants, upheld by the finder:
/// - at least two members
/// - every member has `size` bytes and content digest `hash`
/// - `files[0]` is the canonical member: the first one visited in this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSet {
    /// BLAKE3 digest of the shared content
    #[serde(serialize_with = "serialize_hash")]
    pub hash: Hash,
    /// File size in bytes
    pub size: u64,
    /// Member paths, canonical first
    pub files: Vec<PathBuf>,
}

fn serialize_hash<S: serde::Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(hash))
}

impl DuplicateSet {
    /// Create a new duplicate set.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if fewer than two files are given.
    #[must_use]
    pub fn new(hash: Hash, size: u64, files: Vec<PathBuf>) -> Self {
        debug_assert!(
            files.len() >= 2,
            "a duplicate set needs at least two members, got {}",
            files.len()
        );
        Self { hash, size, files }
    }

    /// Number of files in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The canonical member, kept by the delete-all and move-all policies.
    ///
    /// # Panics
    ///
    /// Panics if the set has no members.
    #[must_use]
    pub fn canonical(&self) -> &Path {
        &self.files[0]
    }

    /// Every member except the canonical one.
    #[must_use]
    pub fn redundant(&self) -> &[PathBuf] {
        self.files.get(1..).unwrap_or_default()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Check if a path is a member of this set.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files (potential duplicate groups)
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (Phase 1 of duplicate detection).
///
/// # Returns
///
/// A tuple of:
/// - `Vec<SizeGroup>` - groups with 2+ files, in order of first appearance
/// - `GroupingStats` - statistics about the grouping operation
///
/// # Example
///
/// ```
/// use dupesweep::scanner::FileEntry;
/// use dupesweep::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 100),
///     FileEntry::new(PathBuf::from("/c.txt"), 200),
///     FileEntry::new(PathBuf::from("/b.txt"), 100),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].size, 100);
/// assert_eq!(groups[0].files, vec![PathBuf::from("/a.txt"), PathBuf::from("/b.txt")]);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileEntry>) -> (Vec<SizeGroup>, GroupingStats) {
    let mut all_groups: Vec<SizeGroup> = Vec::new();
    let mut index_by_size: HashMap<u64, usize> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;

        let idx = *index_by_size.entry(file.size).or_insert_with(|| {
            all_groups.push(SizeGroup::new(file.size));
            all_groups.len() - 1
        });
        all_groups[idx].add(file.path);
    }

    stats.unique_sizes = all_groups.len();

    let filtered: Vec<SizeGroup> = all_groups
        .into_iter()
        .filter(|group| {
            if group.has_duplicates() {
                stats.potential_duplicates += group.len();
                stats.duplicate_groups += 1;
                log::debug!(
                    "Size group {} bytes: {} potential duplicates",
                    group.size,
                    group.len()
                );
                true
            } else {
                stats.eliminated_unique += group.len();
                if let Some(path) = group.files.first() {
                    log::trace!("Eliminated unique size {}: {}", group.size, path.display());
                }
                false
            }
        })
        .collect();

    (filtered, stats)
}
