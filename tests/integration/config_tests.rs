use clap::Parser;
use dupesweep::cli::{Cli, ScanOptions};
use dupesweep::config::{Config, ConfigError};
use dupesweep::error::ExitCode;
use dupesweep::run_app_with;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use super::support::{write_file, ScriptedPrompter};

#[test]
fn test_config_load_defaults() {
    // Figment without the environment layer, so other tests cannot interfere
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config = Config::extract(figment).unwrap();
    assert_eq!(config.io_threads, 4);
    assert_eq!(config.quarantine_dir_name, "duplicates");
    assert!(!config.use_trash);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("DUPESWEEP_LOG_FILE", "from_env.log");

    let config = Config::extract(Config::figment(None)).unwrap();
    assert_eq!(config.log_file, PathBuf::from("from_env.log"));

    std::env::remove_var("DUPESWEEP_LOG_FILE");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
io_threads = 8
quarantine_dir_name = "dupes"
skip_hidden = true
use_trash = true
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config = Config::extract(figment).unwrap();

    assert_eq!(config.io_threads, 8);
    assert_eq!(config.quarantine_dir_name, "dupes");
    assert!(config.skip_hidden);
    assert!(config.use_trash);
    assert!(!config.skip_empty);
}

#[test]
fn test_config_rejects_nested_quarantine_name() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "quarantine_dir_name = \"../elsewhere\"\n").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    assert!(matches!(
        Config::extract(figment),
        Err(ConfigError::Invalid {
            key: "quarantine_dir_name",
            ..
        })
    ));
}

#[test]
fn test_cli_overrides_config() {
    let mut config = Config {
        io_threads: 2,
        skip_empty: true,
        ..Config::default()
    };
    config.apply_scan_options(&ScanOptions {
        io_threads: Some(16),
        ..ScanOptions::default()
    });

    assert_eq!(config.io_threads, 16);
    // Switches never turn a setting off
    assert!(config.skip_empty);
}

#[test]
fn test_app_uses_config_file_quarantine_name() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    write_file(&root, "a/song.mp3", b"audio");
    let b = write_file(&root, "b/song.mp3", b"audio");
    let config_path = write_file(dir.path(), "dupesweep.toml", b"quarantine_dir_name = \"dupes\"\n");

    let cli = Cli::try_parse_from([
        "dupesweep",
        "-q",
        "--config",
        config_path.to_str().unwrap(),
        "resolve",
        root.to_str().unwrap(),
        "--policy",
        "move-all",
        "--yes",
    ])
    .unwrap();
    let code = run_app_with(cli, &mut ScriptedPrompter::default()).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!b.exists());
    assert!(root.join("dupes").join("song.mp3").exists());
}

#[test]
fn test_app_missing_config_file_is_error() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "dupesweep",
        "--config",
        dir.path().join("absent.toml").to_str().unwrap(),
        "scan",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();

    let err = run_app_with(cli, &mut ScriptedPrompter::default()).unwrap_err();
    assert!(err.downcast_ref::<ConfigError>().is_some());
}

#[test]
fn test_app_config_subcommand() {
    let cli = Cli::try_parse_from(["dupesweep", "config"]).unwrap();
    let code = run_app_with(cli, &mut ScriptedPrompter::default()).unwrap();
    assert_eq!(code, ExitCode::Success);
}
