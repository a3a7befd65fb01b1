use clap::Parser;
use dupesweep::actions::{FileAction, Policy, ResolveError, Resolver, ResolverConfig};
use dupesweep::cli::Cli;
use dupesweep::duplicates::{DuplicateFinder, DuplicateSet};
use dupesweep::error::ExitCode;
use dupesweep::run_app_with;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use super::support::{write_file, ScriptedPrompter};

fn scan(root: &Path) -> Vec<DuplicateSet> {
    DuplicateFinder::with_defaults()
        .find_duplicates(root)
        .unwrap()
        .0
}

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dupesweep"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_delete_all_keeps_first_member() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", b"hello");
    let b = write_file(dir.path(), "b.txt", b"hello");
    let c = write_file(dir.path(), "c.txt", b"world");

    let sets = scan(dir.path());
    let report = Resolver::default().delete_all(&sets);

    assert!(a.exists());
    assert!(!b.exists());
    assert!(c.exists());
    assert_eq!(report.policy, Policy::DeleteAll);
    assert_eq!(report.kept_count(), 1);
    assert_eq!(report.deleted_count(), 1);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.bytes_reclaimed, 5);
}

#[test]
fn test_delete_all_continues_past_failures() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"same");
    let b = write_file(dir.path(), "b", b"same");
    let c = write_file(dir.path(), "c", b"same");

    let sets = scan(dir.path());
    fs::remove_file(&b).unwrap();

    let report = Resolver::default().delete_all(&sets);

    assert!(!c.exists());
    assert_eq!(report.deleted_count(), 1);
    assert_eq!(report.failed_count(), 1);
    let failure = report.failures().next().unwrap();
    assert_eq!(failure.path, b);
    assert_eq!(failure.action, FileAction::Deleted);
    assert!(failure.error.is_some());
    assert_eq!(report.bytes_reclaimed, 4);
}

#[test]
fn test_move_all_renames_on_collision() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    let kept = write_file(&root, "x/photo.jpg", b"pixels");
    let y = write_file(&root, "y/photo.jpg", b"pixels");
    let z = write_file(&root, "z/photo.jpg", b"pixels");
    let quarantine = dir.path().join("quarantine");

    let sets = scan(&root);
    let report = Resolver::default().move_all(&sets, &quarantine).unwrap();

    assert!(kept.exists());
    assert!(!y.exists());
    assert!(!z.exists());
    assert_eq!(fs::read(quarantine.join("photo.jpg")).unwrap(), b"pixels");
    assert_eq!(fs::read(quarantine.join("photo_1.jpg")).unwrap(), b"pixels");
    assert_eq!(report.moved_count(), 2);
    assert_eq!(report.bytes_moved, 12);
    assert_eq!(report.bytes_reclaimed, 0);

    let destinations: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|o| match &o.action {
            FileAction::Moved { destination } => Some(destination.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        destinations,
        vec![quarantine.join("photo.jpg"), quarantine.join("photo_1.jpg")]
    );
}

#[test]
fn test_move_all_does_not_overwrite_existing_quarantine_files() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    write_file(&root, "a/notes.txt", b"twin");
    write_file(&root, "b/notes.txt", b"twin");
    let quarantine = dir.path().join("q");
    write_file(&quarantine, "notes.txt", b"older run");

    let sets = scan(&root);
    let report = Resolver::default().move_all(&sets, &quarantine).unwrap();

    assert_eq!(report.moved_count(), 1);
    assert_eq!(fs::read(quarantine.join("notes.txt")).unwrap(), b"older run");
    assert_eq!(fs::read(quarantine.join("notes_1.txt")).unwrap(), b"twin");
}

#[test]
fn test_move_all_quarantine_unavailable() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    let a = write_file(&root, "a", b"dup");
    let b = write_file(&root, "b", b"dup");
    let blocker = write_file(dir.path(), "blocker", b"not a dir");

    let sets = scan(&root);
    let result = Resolver::default().move_all(&sets, &blocker.join("q"));

    assert!(matches!(
        result,
        Err(ResolveError::QuarantineUnavailable { .. })
    ));
    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_skip_all_touches_nothing() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"dup");
    let b = write_file(dir.path(), "b", b"dup");

    let sets = scan(dir.path());
    let report = Resolver::new(ResolverConfig::default()).skip_all(&sets);

    assert!(a.exists() && b.exists());
    assert_eq!(report.untouched_count(), 2);
    assert_eq!(report.deleted_count() + report.moved_count(), 0);
}

#[test]
fn test_interrupted_before_resolution_leaves_files() {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"dup");
    let b = write_file(dir.path(), "b", b"dup");
    let sets = scan(dir.path());

    let flag = Arc::new(AtomicBool::new(true));
    let resolver = Resolver::new(ResolverConfig::default().with_shutdown_flag(flag));
    let report = resolver.delete_all(&sets);

    assert!(report.interrupted);
    assert!(a.exists() && b.exists());
    assert_eq!(report.untouched_count(), 2);
}

#[test]
fn test_app_resolve_delete_all() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    let a = write_file(&root, "a.txt", b"same bytes");
    let b = write_file(&root, "sub/b.txt", b"same bytes");
    let c = write_file(&root, "c.txt", b"different");

    let mut prompter = ScriptedPrompter::default();
    let code = run_app_with(
        cli(&["-q", "resolve", root.to_str().unwrap(), "--policy", "delete-all", "--yes"]),
        &mut prompter,
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(a.exists());
    assert!(!b.exists());
    assert!(c.exists());
    assert!(prompter.questions.is_empty());
}

#[test]
fn test_app_resolve_move_all_default_quarantine() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    write_file(&root, "one/report.pdf", b"pdf");
    let second = write_file(&root, "two/report.pdf", b"pdf");

    let mut prompter = ScriptedPrompter::default();
    let code = run_app_with(
        cli(&["-q", "resolve", root.to_str().unwrap(), "--policy", "move-all", "--yes"]),
        &mut prompter,
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!second.exists());
    assert!(root.join("duplicates").join("report.pdf").exists());

    // The quarantine is not rescanned on the next run
    let code = run_app_with(
        cli(&["-q", "resolve", root.to_str().unwrap(), "--policy", "move-all", "--yes"]),
        &mut prompter,
    )
    .unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_app_resolve_declined_confirmation() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"dup");
    let b = write_file(dir.path(), "b", b"dup");

    let mut prompter = ScriptedPrompter {
        confirm: false,
        ..ScriptedPrompter::default()
    };
    let code = run_app_with(
        cli(&["-q", "resolve", dir.path().to_str().unwrap(), "--policy", "delete-all"]),
        &mut prompter,
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(prompter.questions.len(), 1);
    assert!(prompter.questions[0].starts_with("Delete 1 redundant files"));
    assert!(a.exists() && b.exists());
}

#[test]
fn test_app_resolve_policy_from_menu() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"dup");
    let b = write_file(dir.path(), "b", b"dup");

    let mut prompter = ScriptedPrompter {
        policy: Some(Policy::DeleteAll),
        confirm: true,
        ..ScriptedPrompter::default()
    };
    let code = run_app_with(
        cli(&["-q", "resolve", dir.path().to_str().unwrap()]),
        &mut prompter,
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!b.exists());
}

#[test]
fn test_app_resolve_silent_writes_log_file() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    write_file(&root, "a", b"dup");
    let b = write_file(&root, "b", b"dup");
    let log = dir.path().join("ops.log");

    let mut prompter = ScriptedPrompter::default();
    run_app_with(
        cli(&[
            "resolve",
            root.to_str().unwrap(),
            "--policy",
            "delete-all",
            "--yes",
            "--silent",
            "--log-file",
            log.to_str().unwrap(),
        ]),
        &mut prompter,
    )
    .unwrap();

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains(&format!("INFO Deleted duplicate: {}", b.display())));
    assert!(contents.contains("Resolution (delete-all) finished"));
}

#[test]
fn test_app_resolve_quarantine_unavailable_is_error() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    write_file(&root, "a", b"dup");
    write_file(&root, "b", b"dup");
    let blocker = write_file(dir.path(), "blocker", b"file");

    let mut prompter = ScriptedPrompter::default();
    let result = run_app_with(
        cli(&[
            "-q",
            "resolve",
            root.to_str().unwrap(),
            "--policy",
            "move-all",
            "--yes",
            "--quarantine",
            blocker.join("q").to_str().unwrap(),
        ]),
        &mut prompter,
    );

    let err = result.unwrap_err();
    assert!(err.downcast_ref::<ResolveError>().is_some());
}

#[test]
fn test_app_resolve_json_requires_policy() {
    let dir = tempdir().unwrap();
    let mut prompter = ScriptedPrompter::default();

    let result = run_app_with(
        cli(&["resolve", dir.path().to_str().unwrap(), "--output", "json"]),
        &mut prompter,
    );
    assert!(result.is_err());

    let result = run_app_with(
        cli(&[
            "resolve",
            dir.path().to_str().unwrap(),
            "--output",
            "json",
            "--policy",
            "decide-each",
        ]),
        &mut prompter,
    );
    assert!(result.is_err());
}

#[test]
fn test_app_scan_exit_codes() {
    let dir = tempdir().unwrap();
    let mut prompter = ScriptedPrompter::default();

    let code = run_app_with(cli(&["-q", "scan", dir.path().to_str().unwrap()]), &mut prompter)
        .unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);

    let a = write_file(dir.path(), "a", b"dup");
    let b = write_file(dir.path(), "b", b"dup");
    let code = run_app_with(cli(&["-q", "scan", dir.path().to_str().unwrap()]), &mut prompter)
        .unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(a.exists() && b.exists());
}

#[test]
fn test_app_scan_missing_directory_is_error() {
    let dir = tempdir().unwrap();
    let mut prompter = ScriptedPrompter::default();

    let result = run_app_with(
        cli(&["-q", "scan", dir.path().join("missing").to_str().unwrap()]),
        &mut prompter,
    );
    assert!(result.is_err());
}
