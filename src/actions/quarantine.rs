//! Collision-safe moves into a quarantine directory.
//!
//! # Naming
//!
//! A moved file keeps its base name. When that name is taken, a numeric
//! suffix is inserted before the extension:
//!
//! | Source name  | 1st        | 2nd           | 3rd           |
//! |--------------|------------|---------------|---------------|
//! | `photo.jpg`  | `photo.jpg`| `photo_1.jpg` | `photo_2.jpg` |
//! | `.bashrc`    | `.bashrc`  | `.bashrc_1`   | `.bashrc_2`   |
//!
//! A name is claimed by creating an empty placeholder with `create_new`
//! before the rename replaces it, so two movers can never pick the same
//! destination. Moves into one [`Quarantine`] are also serialized by a mutex.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::quarantine::Quarantine;
//! use std::path::Path;
//!
//! let quarantine = Quarantine::create("/data/duplicates").unwrap();
//! let moved = quarantine.move_into(Path::new("/data/photos/copy.jpg")).unwrap();
//! println!("{} -> {}", moved.source.display(), moved.destination.display());
//! ```

use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Upper bound on suffix attempts for one base name.
const MAX_SUFFIX: usize = 100_000;

/// Error type for quarantine moves.
#[derive(Debug, Error)]
pub enum MoveError {
    /// Source file was not found.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied on the source or the destination.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Source path has no file name component.
    #[error("path has no file name: {0}")]
    InvalidSource(PathBuf),

    /// Every suffixed candidate name is already taken.
    #[error("no free name for {name} in {dir}")]
    NoFreeName { dir: PathBuf, name: String },

    /// Any other I/O failure.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MoveError {
    fn from_io(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// Result of a successful move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    /// Original location.
    pub source: PathBuf,
    /// Final location inside the quarantine directory.
    pub destination: PathBuf,
    /// File size in bytes.
    pub size: u64,
}

/// Destination directory for moved duplicates.
#[derive(Debug)]
pub struct Quarantine {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl Quarantine {
    /// Open the quarantine directory, creating it (and parents) if absent.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory cannot be created, or if the
    /// path exists but is not a directory.
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} exists and is not a directory", dir.display()),
            ));
        }
        log::debug!("Quarantine directory ready: {}", dir.display());
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// The quarantine directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Move `src` into the quarantine directory under a free name.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `PermissionDenied` for the source
    /// - `InvalidSource` if `src` has no file name
    /// - `NoFreeName` if every candidate name is taken
    /// - `Io` if the rename (or the cross-device copy) fails
    pub fn move_into(&self, src: &Path) -> Result<MoveResult, MoveError> {
        let metadata = fs::symlink_metadata(src).map_err(|e| MoveError::from_io(src, e))?;
        let file_name = src
            .file_name()
            .ok_or_else(|| MoveError::InvalidSource(src.to_path_buf()))?;

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let destination = self.claim_name(file_name)?;
        if let Err(e) = relocate(src, &destination) {
            if let Err(cleanup) = fs::remove_file(&destination) {
                log::warn!(
                    "Could not remove placeholder {}: {}",
                    destination.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        log::info!(
            "Moved {} -> {} ({} bytes)",
            src.display(),
            destination.display(),
            metadata.len()
        );

        Ok(MoveResult {
            source: src.to_path_buf(),
            destination,
            size: metadata.len(),
        })
    }

    /// Create an empty placeholder under the first free candidate name.
    fn claim_name(&self, file_name: &OsStr) -> Result<PathBuf, MoveError> {
        for n in 0..MAX_SUFFIX {
            let candidate = self.dir.join(candidate_name(file_name, n));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(_) => return Ok(candidate),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    log::trace!("Name taken: {}", candidate.display());
                }
                Err(e) => return Err(MoveError::from_io(&candidate, e)),
            }
        }
        Err(MoveError::NoFreeName {
            dir: self.dir.clone(),
            name: file_name.to_string_lossy().into_owned(),
        })
    }
}

/// Rename, falling back to copy + remove across filesystems.
fn relocate(src: &Path, dest: &Path) -> Result<(), MoveError> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!(
                "Cross-device move, copying {} -> {}",
                src.display(),
                dest.display()
            );
            fs::copy(src, dest).map_err(|e| MoveError::from_io(src, e))?;
            fs::remove_file(src).map_err(|e| MoveError::from_io(src, e))
        }
        Err(e) => Err(MoveError::from_io(src, e)),
    }
}

/// Candidate name for attempt `n`: the name itself for 0, otherwise
/// `<stem>_<n>.<ext>`.
///
/// ```
/// use dupesweep::actions::quarantine::candidate_name;
/// use std::ffi::OsStr;
///
/// assert_eq!(candidate_name(OsStr::new("photo.jpg"), 0), "photo.jpg");
/// assert_eq!(candidate_name(OsStr::new("photo.jpg"), 2), "photo_2.jpg");
/// assert_eq!(candidate_name(OsStr::new("README"), 1), "README_1");
/// ```
#[must_use]
pub fn candidate_name(file_name: &OsStr, n: usize) -> OsString {
    if n == 0 {
        return file_name.to_os_string();
    }

    let path = Path::new(file_name);
    let stem = path.file_stem().unwrap_or(file_name);
    let mut name = stem.to_os_string();
    name.push(format!("_{n}"));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}
