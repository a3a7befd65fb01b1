//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: collect regular files under the root
//! 2. **Phase 1 - Size grouping**: group files by size (see [`crate::duplicates::groups`])
//! 3. **Phase 2 - Content digest**: hash every file of each size group and
//!    partition the group by digest
//!
//! Digests are computed on a bounded rayon pool. Results are collected in
//! input order, so the sets and their member order are the same as a
//! sequential run would produce.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (sets, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("Found {} duplicate sets", sets.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::{group_by_size, DuplicateSet, SizeGroup};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{FileEntry, Hash, HashError, Hasher, ScanError, Walker, WalkerConfig};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Configuration for the digest phase.
#[derive(Clone)]
pub struct HashConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashConfig {
    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the digest phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashStats {
    /// Total files that entered the digest phase
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash (I/O errors)
    pub failed_files: usize,
    /// Errors encountered, one per failed file
    pub errors: Vec<HashError>,
    /// Total bytes hashed across all files
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Number of confirmed duplicate files (excluding canonical members)
    pub duplicate_files: usize,
    /// Total space wasted by duplicates
    pub wasted_space: u64,
    /// Whether phase was interrupted by shutdown
    pub interrupted: bool,
}

impl HashStats {
    /// Calculate set counts and wasted space from the confirmed sets.
    pub fn calculate_wasted_space(&mut self, sets: &[DuplicateSet]) {
        self.duplicate_sets = sets.len();
        self.duplicate_files = sets.iter().map(DuplicateSet::duplicate_count).sum();
        self.wasted_space = sets.iter().map(DuplicateSet::wasted_space).sum();
    }
}

/// Partition one size group's hashed files by digest.
///
/// Every partition with two or more members becomes a [`DuplicateSet`].
/// Member order follows input order, and sets are ordered by the position
/// of their first member.
///
/// # Example
///
/// ```
/// use dupesweep::duplicates::partition_by_digest;
/// use std::path::PathBuf;
///
/// let hashed = vec![
///     (PathBuf::from("/a"), [1u8; 32]),
///     (PathBuf::from("/b"), [2u8; 32]),
///     (PathBuf::from("/c"), [1u8; 32]),
/// ];
/// let sets = partition_by_digest(5, hashed);
///
/// assert_eq!(sets.len(), 1);
/// assert_eq!(sets[0].files, vec![PathBuf::from("/a"), PathBuf::from("/c")]);
/// ```
#[must_use]
pub fn partition_by_digest(
    size: u64,
    hashed: impl IntoIterator<Item = (PathBuf, Hash)>,
) -> Vec<DuplicateSet> {
    let mut order: Vec<Hash> = Vec::new();
    let mut buckets: HashMap<Hash, Vec<PathBuf>> = HashMap::new();

    for (path, hash) in hashed {
        buckets
            .entry(hash)
            .or_insert_with(|| {
                order.push(hash);
                Vec::new()
            })
            .push(path);
    }

    order
        .into_iter()
        .filter_map(|hash| {
            let files = buckets.remove(&hash)?;
            (files.len() > 1).then(|| DuplicateSet::new(hash, size, files))
        })
        .collect()
}

/// Compute digests for every size group and return the confirmed sets
/// (Phase 2).
///
/// Files that cannot be read are left out of every set and reported in
/// [`HashStats::errors`]; they never abort the phase.
///
/// # Example
///
/// ```no_run
/// use dupesweep::duplicates::{hash_size_groups, HashConfig, SizeGroup};
/// use dupesweep::scanner::Hasher;
/// use std::path::PathBuf;
/// use std::sync::Arc;
///
/// let groups = vec![SizeGroup::with_files(5, vec![PathBuf::from("a"), PathBuf::from("b")])];
/// let (sets, stats) = hash_size_groups(groups, Arc::new(Hasher::new()), HashConfig::default());
/// println!("{} sets, {} bytes reclaimable", stats.duplicate_sets, stats.wasted_space);
/// ```
#[must_use]
pub fn hash_size_groups(
    groups: Vec<SizeGroup>,
    hasher: Arc<Hasher>,
    config: HashConfig,
) -> (Vec<DuplicateSet>, HashStats) {
    // Flatten, remembering which group each file came from
    let all_files: Vec<(usize, u64, PathBuf)> = groups
        .iter()
        .enumerate()
        .flat_map(|(idx, group)| group.files.iter().map(move |p| (idx, group.size, p.clone())))
        .collect();

    let mut stats = HashStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Phase 2: No files to process");
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_HASHING, all_files.len());
    }

    log::info!("Phase 2: Computing digests for {} files", all_files.len());

    let completed = AtomicUsize::new(0);
    let compute = || -> Vec<Result<Hash, HashError>> {
        all_files
            .par_iter()
            .map(|(_, size, path)| {
                if config.is_shutdown_requested() {
                    return Err(HashError::Interrupted(path.clone()));
                }

                if *size > LARGE_FILE_THRESHOLD {
                    log::debug!(
                        "Hashing large file ({} MB): {}",
                        size / (1024 * 1024),
                        path.display()
                    );
                }

                let result = hasher.full_hash(path);

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(done, path.to_string_lossy().as_ref());
                }

                match &result {
                    Ok(_) => log::trace!("Digest computed: {}", path.display()),
                    Err(HashError::Interrupted(_)) => {}
                    Err(e) => log::warn!("Failed to hash {}: {}", path.display(), e),
                }
                result
            })
            .collect()
    };

    // Build a custom thread pool with limited parallelism for I/O
    let hash_results = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(compute),
        Err(e) => {
            log::warn!(
                "Failed to create custom thread pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            compute()
        }
    };

    // Collect per-group digests, preserving input order
    let mut hashed_by_group: Vec<Vec<(PathBuf, Hash)>> = vec![Vec::new(); groups.len()];
    for ((group_idx, size, path), result) in all_files.into_iter().zip(hash_results) {
        match result {
            Ok(hash) => {
                stats.hashed_files += 1;
                stats.bytes_hashed += size;
                hashed_by_group[group_idx].push((path, hash));
            }
            Err(HashError::Interrupted(_)) => {
                stats.interrupted = true;
            }
            Err(e) => {
                stats.failed_files += 1;
                stats.errors.push(e);
            }
        }
    }

    if stats.interrupted || config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Phase 2: Interrupted by shutdown signal");
    }

    let duplicate_sets: Vec<DuplicateSet> = groups
        .iter()
        .zip(hashed_by_group)
        .flat_map(|(group, hashed)| partition_by_digest(group.size, hashed))
        .inspect(|set| {
            log::debug!(
                "Duplicate set {}: {} files, {} bytes each",
                set.hash_hex(),
                set.len(),
                set.size
            );
        })
        .collect();

    stats.calculate_wasted_space(&duplicate_sets);

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_HASHING);
    }

    log::info!(
        "Phase 2 complete: {} sets, {} duplicates, {} bytes reclaimable",
        stats.duplicate_sets,
        stats.duplicate_files,
        stats.wasted_space
    );

    (duplicate_sets, stats)
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Fail-fast on the first per-file error during the scan.
    pub strict: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("strict", &self.strict)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            strict: false,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set fail-fast on any error.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
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

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files whose digest was computed
    pub hashed_files: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Total number of duplicate files (excluding canonical members)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: std::time::Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Files left out of duplicate consideration, with the reason
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }

    /// Whether any file was skipped because of an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred during scanning.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A per-file error escalated by strict mode.
    #[error(transparent)]
    ScanError(#[from] ScanError),
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupesweep::duplicates::DuplicateFinder;
/// use std::path::Path;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates(Path::new(".")) {
///     Ok((sets, summary)) => {
///         println!("Found {} duplicate sets", sets.len());
///         println!("Can reclaim {} bytes", summary.reclaimable_space);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under the given root.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The scan is interrupted by shutdown signal
    /// - Strict mode is on and any file could not be read
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();
        let mut summary = ScanSummary::default();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Starting duplicate scan of {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, file.path.to_string_lossy().as_ref());
                    }
                    files.push(file);
                }
                Err(e) => {
                    if self.config.strict {
                        return Err(FinderError::ScanError(e));
                    }
                    summary.scan_errors.push(e);
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let sets = self.run_phases(files, &mut summary)?;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate sets, {} duplicate files, {} reclaimable, {} file(s) skipped",
            summary.duplicate_sets,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.scan_errors.len()
        );

        Ok((sets, summary))
    }

    /// Find duplicates from a pre-collected list of files.
    ///
    /// Use this method when the files come from another source than the
    /// walker. Input order takes the place of traversal order.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Interrupted` on shutdown, or the first hash
    /// error in strict mode.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();
        let mut summary = ScanSummary::default();

        let sets = self.run_phases(files, &mut summary)?;
        summary.scan_duration = start_time.elapsed();

        Ok((sets, summary))
    }

    /// Size grouping followed by the digest phase.
    fn run_phases(
        &self,
        files: Vec<FileEntry>,
        summary: &mut ScanSummary,
    ) -> Result<Vec<DuplicateSet>, FinderError> {
        log::info!("Phase 1: Grouping by size...");
        let (size_groups, size_stats) = group_by_size(files);

        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = size_stats.eliminated_unique;

        log::info!(
            "Phase 1 complete: {} → {} files ({:.1}% eliminated)",
            size_stats.total_files,
            size_stats.potential_duplicates,
            size_stats.elimination_rate()
        );

        if size_groups.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            return Ok(Vec::new());
        }

        let hash_config = HashConfig {
            io_threads: self.config.io_threads,
            shutdown_flag: self.config.shutdown_flag.clone(),
            progress_callback: self.config.progress_callback.clone(),
        };

        let (sets, hash_stats) = hash_size_groups(size_groups, self.hasher.clone(), hash_config);

        if hash_stats.interrupted || self.config.is_shutdown_requested() {
            summary.interrupted = true;
            return Err(FinderError::Interrupted);
        }

        if let Some(first) = hash_stats.errors.first() {
            if self.config.strict {
                return Err(FinderError::ScanError(ScanError::HashError(first.clone())));
            }
        }
        summary
            .scan_errors
            .extend(hash_stats.errors.into_iter().map(ScanError::from));

        summary.hashed_files = hash_stats.hashed_files;
        summary.duplicate_sets = hash_stats.duplicate_sets;
        summary.duplicate_files = hash_stats.duplicate_files;
        summary.reclaimable_space = hash_stats.wasted_space;

        Ok(sets)
    }
}
