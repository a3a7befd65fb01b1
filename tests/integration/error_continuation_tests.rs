use dupesweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupesweep::scanner::{FileEntry, HashError, ScanError};
use std::path::PathBuf;

#[cfg(unix)]
use super::support::write_file;

#[test]
fn test_find_duplicates_from_files_continues_on_error() {
    let finder = DuplicateFinder::with_defaults();
    // Same size so both reach the digest phase, where opening fails
    let file1 = FileEntry::new(PathBuf::from("nonexistent_1.txt"), 100);
    let file2 = FileEntry::new(PathBuf::from("nonexistent_2.txt"), 100);

    let (sets, summary) = finder
        .find_duplicates_from_files(vec![file1, file2])
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.scan_errors.len(), 2);

    for err in &summary.scan_errors {
        match err {
            ScanError::HashError(HashError::NotFound(_)) => {}
            _ => panic!("Expected NotFound HashError, got: {:?}", err),
        }
    }
}

#[test]
fn test_find_duplicates_from_files_strict_fails() {
    let config = FinderConfig::default().with_strict(true);
    let finder = DuplicateFinder::new(config);
    let file1 = FileEntry::new(PathBuf::from("nonexistent_1.txt"), 100);
    let file2 = FileEntry::new(PathBuf::from("nonexistent_2.txt"), 100);

    let result = finder.find_duplicates_from_files(vec![file1, file2]);

    match result.unwrap_err() {
        FinderError::ScanError(ScanError::HashError(HashError::NotFound(_))) => {}
        other => panic!("Expected NotFound ScanError, got: {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped_and_reported() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", b"shared");
    let b = write_file(dir.path(), "b.txt", b"shared");
    let locked = write_file(dir.path(), "c.txt", b"shared");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits
    if fs::File::open(&locked).is_ok() {
        return;
    }

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].files, vec![a, b]);
    assert_eq!(summary.scan_errors.len(), 1);
    assert_eq!(summary.scan_errors[0].path(), locked.as_path());
    assert!(matches!(
        summary.scan_errors[0],
        ScanError::HashError(HashError::PermissionDenied(_))
    ));
    assert!(summary.has_errors());
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_fails_strict_scan() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"shared");
    let locked = write_file(dir.path(), "b.txt", b"shared");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::File::open(&locked).is_ok() {
        return;
    }

    let result = DuplicateFinder::new(FinderConfig::default().with_strict(true))
        .find_duplicates(dir.path());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert!(matches!(
        result,
        Err(FinderError::ScanError(ScanError::HashError(
            HashError::PermissionDenied(_)
        )))
    ));
}

#[test]
fn test_only_one_readable_member_means_no_set() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real.txt");
    std::fs::write(&real, b"0123456789").unwrap();

    let entries = vec![
        FileEntry::new(real, 10),
        FileEntry::new(dir.path().join("gone.txt"), 10),
    ];
    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(entries)
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.hashed_files, 1);
    assert_eq!(summary.scan_errors.len(), 1);
}
