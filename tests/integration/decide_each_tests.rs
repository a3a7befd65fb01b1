use clap::Parser;
use dupesweep::actions::{
    Decision, DecisionError, FileAction, Policy, Resolver, SessionState,
};
use dupesweep::cli::Cli;
use dupesweep::duplicates::{DuplicateFinder, DuplicateSet};
use dupesweep::error::ExitCode;
use dupesweep::run_app_with;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use super::support::{write_file, ScriptedPrompter};

/// Three sets: s0 = {a0, a1}, s1 = {b0, b1, b2}, s2 = {c0, c1}.
fn three_sets(root: &Path) -> (Vec<DuplicateSet>, Vec<Vec<PathBuf>>) {
    let groups = vec![
        vec![write_file(root, "a0", b"1"), write_file(root, "a1", b"1")],
        vec![
            write_file(root, "b0", b"22"),
            write_file(root, "b1", b"22"),
            write_file(root, "b2", b"22"),
        ],
        vec![write_file(root, "c0", b"333"), write_file(root, "c1", b"333")],
    ];
    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(root)
        .unwrap();
    assert_eq!(sets.len(), 3);
    (sets, groups)
}

#[test]
fn test_keep_chosen_member() {
    let dir = tempdir().unwrap();
    let (sets, files) = three_sets(dir.path());
    let resolver = Resolver::default();
    let mut session = resolver.decide_each(&sets);

    let outcomes = session.decide(Decision::KeepOne(1)).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].action, FileAction::Deleted);
    assert_eq!(outcomes[1].action, FileAction::Kept);

    session.decide(Decision::Skip).unwrap();
    session.decide(Decision::KeepOne(0)).unwrap();
    assert_eq!(session.state(), SessionState::Done);

    let report = session.finish();
    assert!(!files[0][0].exists());
    assert!(files[0][1].exists());
    assert!(files[1].iter().all(|p| p.exists()));
    assert!(files[2][0].exists());
    assert!(!files[2][1].exists());
    assert_eq!(report.deleted_count(), 2);
    assert_eq!(report.untouched_count(), 3);
    assert!(!report.aborted);
}

#[test]
fn test_skip_all_leaves_later_sets() {
    let dir = tempdir().unwrap();
    let (sets, files) = three_sets(dir.path());
    let resolver = Resolver::default();
    let mut session = resolver.decide_each(&sets);

    session.decide(Decision::KeepOne(0)).unwrap();
    session.decide(Decision::SkipAll).unwrap();
    assert_eq!(session.state(), SessionState::Aborted);
    assert_eq!(session.decide(Decision::Skip), Err(DecisionError::SessionFinished));

    let report = session.finish();
    assert!(report.aborted);
    assert!(!files[0][1].exists());
    assert!(files[1].iter().chain(&files[2]).all(|p| p.exists()));
    assert_eq!(report.outcomes_for_set(1).count(), 3);
    assert_eq!(report.outcomes_for_set(2).count(), 2);
    assert!(report
        .outcomes_for_set(2)
        .all(|o| o.action == FileAction::Untouched));
}

#[test]
fn test_out_of_range_choice_changes_nothing() {
    let dir = tempdir().unwrap();
    let (sets, files) = three_sets(dir.path());
    let resolver = Resolver::default();
    let mut session = resolver.decide_each(&sets);

    let err = session.decide(Decision::KeepOne(2)).unwrap_err();
    assert_eq!(err, DecisionError::IndexOutOfRange { index: 2, len: 2 });
    assert_eq!(session.state(), SessionState::AwaitingDecision { set_index: 0 });
    assert!(files[0].iter().all(|p| p.exists()));

    session.decide(Decision::KeepOne(1)).unwrap();
    assert_eq!(session.current_set().map(|(i, _)| i), Some(1));
}

#[test]
fn test_finish_early_marks_rest_untouched() {
    let dir = tempdir().unwrap();
    let (sets, _) = three_sets(dir.path());
    let resolver = Resolver::default();
    let mut session = resolver.decide_each(&sets);

    session.decide(Decision::Skip).unwrap();
    let report = session.finish();

    assert_eq!(report.policy, Policy::DecideEach);
    assert_eq!(report.untouched_count(), 7);
}

#[test]
fn test_app_decide_each_with_scripted_answers() {
    let dir = tempdir().unwrap();
    let (_, files) = three_sets(dir.path());

    let mut prompter = ScriptedPrompter::with_decisions([
        Decision::KeepOne(1),
        Decision::KeepOne(2),
        Decision::SkipAll,
    ]);
    let cli = Cli::try_parse_from([
        "dupesweep",
        "-q",
        "resolve",
        dir.path().to_str().unwrap(),
        "--policy",
        "decide-each",
    ])
    .unwrap();

    let code = run_app_with(cli, &mut prompter).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(prompter.asked_sets, vec![0, 1, 2]);
    assert!(prompter.questions.is_empty());
    assert!(!files[0][0].exists() && files[0][1].exists());
    assert!(!files[1][0].exists() && !files[1][1].exists() && files[1][2].exists());
    assert!(files[2].iter().all(|p| p.exists()));
}

#[test]
fn test_app_decide_each_input_closed() {
    let dir = tempdir().unwrap();
    let (_, files) = three_sets(dir.path());

    let mut prompter = ScriptedPrompter::with_decisions([Decision::KeepOne(0)]);
    prompter.policy = Some(Policy::DecideEach);
    let cli = Cli::try_parse_from(["dupesweep", "-q", "resolve", dir.path().to_str().unwrap()])
        .unwrap();

    let code = run_app_with(cli, &mut prompter).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(prompter.asked_sets, vec![0, 1]);
    assert!(files[0][0].exists() && !files[0][1].exists());
    assert!(files[1].iter().chain(&files[2]).all(|p| p.exists()));
}
