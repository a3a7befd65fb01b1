use dupesweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupesweep::scanner::WalkerConfig;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use super::support::write_file;

fn finder_with(walker_config: WalkerConfig) -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config))
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_sets, 0);
}

#[test]
fn test_scan_two_copies_and_a_stranger() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", b"hello");
    let b = write_file(dir.path(), "b.txt", b"hello");
    write_file(dir.path(), "c.txt", b"world");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].files, vec![a.clone(), b]);
    assert_eq!(sets[0].size, 5);
    assert_eq!(sets[0].canonical(), a.as_path());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_sets, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 5);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"aaaa");
    write_file(dir.path(), "b.txt", b"bbbb");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.hashed_files, 2);
    assert_eq!(summary.eliminated_by_size, 0);
}

#[test]
fn test_scan_members_follow_traversal_order() {
    let dir = tempdir().unwrap();
    let late = write_file(dir.path(), "zeta/copy.bin", b"payload");
    let early = write_file(dir.path(), "alpha/copy.bin", b"payload");
    let middle = write_file(dir.path(), "mid.bin", b"payload");

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].files, vec![early, middle, late]);
}

#[test]
fn test_scan_is_repeatable() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write_file(dir.path(), &format!("d{}/x.txt", i % 3), format!("n{}", i % 2).as_bytes());
        write_file(dir.path(), &format!("f{i}.txt"), format!("n{}", i % 2).as_bytes());
    }

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_scan_several_sets_of_one_size() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a1", b"AAA");
    write_file(dir.path(), "b1", b"BBB");
    write_file(dir.path(), "a2", b"AAA");
    write_file(dir.path(), "b2", b"BBB");
    write_file(dir.path(), "a3", b"AAA");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].len(), 3);
    assert_eq!(sets[1].len(), 2);
    assert!(sets[0].files[0].ends_with("a1"));
    assert!(sets[1].files[0].ends_with("b1"));
    assert_eq!(summary.duplicate_files, 3);
    assert_ne!(sets[0].hash, sets[1].hash);
}

#[test]
fn test_scan_empty_files_form_a_set() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "empty1", b"");
    write_file(dir.path(), "empty2", b"");

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, 0);
    assert_eq!(sets[0].wasted_space(), 0);

    let (sets, _) = finder_with(WalkerConfig::new(false, true))
        .find_duplicates(dir.path())
        .unwrap();
    assert!(sets.is_empty());
}

#[test]
fn test_scan_skip_hidden() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "visible.txt", b"same");
    write_file(dir.path(), ".hidden.txt", b"same");
    write_file(dir.path(), ".cache/inner.txt", b"same");

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 3);

    let (sets, summary) = finder_with(WalkerConfig::new(true, false))
        .find_duplicates(dir.path())
        .unwrap();
    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_excludes_quarantine_directory() {
    let dir = tempdir().unwrap();
    let quarantine = dir.path().join("duplicates");
    write_file(dir.path(), "photo.jpg", b"pixels");
    write_file(dir.path(), "duplicates/photo.jpg", b"pixels");

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(sets.len(), 1);

    let (sets, summary) = finder_with(WalkerConfig::default().with_excluded_dir(&quarantine))
        .find_duplicates(dir.path())
        .unwrap();
    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_scan_does_not_follow_symlinks() {
    let dir = tempdir().unwrap();
    let target = write_file(dir.path(), "real.txt", b"linked");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_missing_root() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let result = DuplicateFinder::with_defaults().find_duplicates(&missing);
    assert!(matches!(result, Err(FinderError::PathNotFound(p)) if p == missing));
}

#[test]
fn test_scan_root_is_a_file() {
    let dir = tempdir().unwrap();
    let file = write_file(dir.path(), "file.txt", b"x");

    let result = DuplicateFinder::with_defaults().find_duplicates(&file);
    assert!(matches!(result, Err(FinderError::NotADirectory(_))));
}

#[test]
fn test_scan_large_identical_files() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    write_file(dir.path(), "big1.bin", &content);
    write_file(dir.path(), "big2.bin", &content);

    let mut tweaked = content.clone();
    let last = tweaked.len() - 1;
    tweaked[last] ^= 0xff;
    write_file(dir.path(), "big3.bin", &tweaked);

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    let names: Vec<PathBuf> = sets[0]
        .files
        .iter()
        .map(|p| PathBuf::from(p.file_name().unwrap()))
        .collect();
    assert_eq!(names, vec![PathBuf::from("big1.bin"), PathBuf::from("big2.bin")]);
    assert!(fs::metadata(&sets[0].files[0]).is_ok());
}
