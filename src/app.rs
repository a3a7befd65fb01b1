//! Command dispatch for the `dupesweep` binary.
//!
//! [`run_app`] wires the CLI, configuration, scanner, resolver and output
//! sinks together and returns the process exit code. Interactive input goes
//! through a [`Prompter`], so [`run_app_with`] can be driven by scripted
//! answers.

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::actions::{
    DecisionError, DeleteMode, Policy, ResolutionReport, Resolver, ResolverConfig,
};
use crate::cli::{Cli, Commands, ConfigArgs, OutputFormat, ResolveArgs, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, DuplicateSet, FinderConfig, ScanSummary};
use crate::error::ExitCode;
use crate::logging::init_logging;
use crate::output::text::{format_listing, report_line, skipped_lines, summary_lines};
use crate::output::{ConsoleSink, JsonOutput, LineKind, LogFileSink, ReportSink, SinkObserver};
use crate::progress::Progress;
use crate::prompt::{Prompter, TerminalPrompter};
use crate::scanner::WalkerConfig;
use crate::signal::{install_handler, ShutdownHandler};

/// Run the parsed command line with terminal prompts.
///
/// # Errors
///
/// Returns an error for unusable input (missing directory, bad config,
/// unavailable quarantine) or an interrupted scan.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    run_app_with(cli, &mut TerminalPrompter)
}

/// Run the parsed command line, asking `prompter` for interactive input.
///
/// # Errors
///
/// Same as [`run_app`].
pub fn run_app_with(cli: Cli, prompter: &mut dyn Prompter) -> Result<ExitCode> {
    if cli.no_color {
        yansi::disable();
    }
    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        log::trace!("Keeping existing logger: {e}");
    }

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    log::debug!("Effective configuration: {config:?}");

    match cli.command {
        Commands::Scan(args) => run_scan(&args, config, cli.quiet),
        Commands::Resolve(args) => run_resolve(&args, config, cli.quiet, prompter),
        Commands::Config(args) => run_config(&args, &config),
    }
}

fn shutdown_handler() -> ShutdownHandler {
    install_handler().unwrap_or_else(|e| {
        log::warn!("{e}; Ctrl+C will terminate immediately");
        ShutdownHandler::new()
    })
}

/// Walk, group and hash `root`, leaving `quarantine_dir` out of the walk.
fn scan(
    root: &Path,
    config: &Config,
    quarantine_dir: &Path,
    quiet: bool,
    shutdown: &ShutdownHandler,
) -> Result<(Vec<DuplicateSet>, ScanSummary)> {
    let walker_config =
        WalkerConfig::new(config.skip_hidden, config.skip_empty).with_excluded_dir(quarantine_dir);
    let finder_config = FinderConfig::default()
        .with_io_threads(config.io_threads)
        .with_strict(config.strict)
        .with_walker_config(walker_config)
        .with_shutdown_flag(shutdown.get_flag())
        .with_progress_callback(Arc::new(Progress::new(quiet)));

    DuplicateFinder::new(finder_config)
        .find_duplicates(root)
        .with_context(|| format!("failed to scan {}", root.display()))
}

fn write_json(output: &JsonOutput) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output
        .write_to(&mut handle, true)
        .context("failed to write JSON output")
}

fn print_listing(sets: &[DuplicateSet], summary: &ScanSummary) {
    print!("{}", format_listing(sets));
    for line in summary_lines(summary) {
        println!("{line}");
    }
}

fn run_scan(args: &ScanArgs, mut config: Config, quiet: bool) -> Result<ExitCode> {
    config.apply_scan_options(&args.options);
    let json = args.output == OutputFormat::Json;
    let shutdown = shutdown_handler();

    let quarantine_dir = config.quarantine_dir(&args.path);
    let (sets, summary) = scan(&args.path, &config, &quarantine_dir, quiet || json, &shutdown)?;
    let exit_code = ExitCode::from_scan(sets.len(), &summary);

    match args.output {
        OutputFormat::Json => write_json(&JsonOutput::new(&sets, &summary, exit_code))?,
        // Skipped files were already logged at warn level by the scanner
        OutputFormat::Text if !quiet => print_listing(&sets, &summary),
        OutputFormat::Text => {}
    }

    Ok(exit_code)
}

fn run_resolve(
    args: &ResolveArgs,
    mut config: Config,
    quiet: bool,
    prompter: &mut dyn Prompter,
) -> Result<ExitCode> {
    config.apply_scan_options(&args.options);
    config.use_trash |= args.trash;

    let json = args.output == OutputFormat::Json;
    if json && matches!(args.policy, None | Some(Policy::DecideEach)) {
        bail!("--output json needs --policy delete-all, move-all or skip");
    }

    let quarantine_dir = args
        .quarantine
        .clone()
        .unwrap_or_else(|| config.quarantine_dir(&args.path));
    let shutdown = shutdown_handler();
    let console_quiet = quiet || json || args.silent;

    let (sets, summary) = scan(&args.path, &config, &quarantine_dir, console_quiet, &shutdown)?;

    let sink: Arc<dyn ReportSink> = if args.silent {
        let path = args.log_file.as_ref().unwrap_or(&config.log_file);
        let file_sink = LogFileSink::open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        Arc::new(file_sink)
    } else {
        Arc::new(ConsoleSink::new(quiet || json))
    };

    if args.silent {
        for line in skipped_lines(&summary) {
            sink.emit(LineKind::Failure, &line);
        }
        for line in summary_lines(&summary) {
            sink.info(&line);
        }
    } else if !console_quiet {
        print_listing(&sets, &summary);
    }

    if sets.is_empty() {
        let exit_code = ExitCode::from_scan(0, &summary);
        if json {
            write_json(&JsonOutput::new(&sets, &summary, exit_code))?;
        }
        return Ok(exit_code);
    }

    let mut policy = match args.policy {
        Some(policy) => policy,
        None => prompter.choose_policy(sets.len())?,
    };

    let question = match policy {
        Policy::DeleteAll => Some(format!(
            "Delete {} redundant files ({})?",
            summary.duplicate_files,
            summary.reclaimable_display()
        )),
        Policy::MoveAll => Some(format!(
            "Move {} redundant files into {}?",
            summary.duplicate_files,
            quarantine_dir.display()
        )),
        Policy::DecideEach | Policy::Skip => None,
    };
    if let Some(question) = question {
        if !args.yes && !prompter.confirm(&question)? {
            sink.info("Nothing changed.");
            policy = Policy::Skip;
        }
    }

    // Progress bars would garble the per-set prompts
    let progress_quiet = console_quiet || policy == Policy::DecideEach;
    let resolver = Resolver::new(
        ResolverConfig::default()
            .with_delete_mode(DeleteMode::from_use_trash(config.use_trash))
            .with_shutdown_flag(shutdown.get_flag())
            .with_progress_callback(Arc::new(Progress::new(progress_quiet)))
            .with_observer(Arc::new(SinkObserver::new(Arc::clone(&sink)))),
    );

    let report = match policy {
        Policy::DeleteAll => resolver.delete_all(&sets),
        Policy::MoveAll => resolver.move_all(&sets, &quarantine_dir)?,
        Policy::DecideEach => decide_each(&resolver, &sets, prompter, &shutdown),
        Policy::Skip => resolver.skip_all(&sets),
    };

    let kind = if report.has_failures() {
        LineKind::Failure
    } else {
        LineKind::Info
    };
    sink.emit(kind, &report_line(&report));

    let exit_code = ExitCode::from_resolution(&summary, &report);
    if json {
        write_json(&JsonOutput::new(&sets, &summary, exit_code).with_resolution(report))?;
    }
    Ok(exit_code)
}

/// Drive a decide-each session with answers from `prompter`.
///
/// If input cannot be read, the sets without a decision are left untouched
/// and the report is marked aborted (or interrupted, after Ctrl+C).
fn decide_each(
    resolver: &Resolver,
    sets: &[DuplicateSet],
    prompter: &mut dyn Prompter,
    shutdown: &ShutdownHandler,
) -> ResolutionReport {
    let mut session = resolver.decide_each(sets);
    let mut input_failed = false;

    while let Some((set_index, set)) = session.current_set() {
        let decision = match prompter.decide(set_index, session.total_sets(), set) {
            Ok(decision) => decision,
            Err(e) => {
                if !shutdown.is_shutdown_requested() {
                    log::error!("{e}; leaving the remaining sets untouched");
                    input_failed = true;
                }
                break;
            }
        };

        match session.decide(decision) {
            Ok(_) => {}
            Err(DecisionError::IndexOutOfRange { index, len }) => {
                log::warn!("File {} is not in set {} ({len} files)", index + 1, set_index + 1);
            }
            Err(DecisionError::SessionFinished) => break,
        }
    }

    let mut report = session.finish();
    if shutdown.is_shutdown_requested() {
        report.interrupted = true;
    } else if input_failed {
        report.aborted = true;
    }
    report
}

fn run_config(args: &ConfigArgs, config: &Config) -> Result<ExitCode> {
    if args.path {
        let Some(path) = Config::default_path() else {
            bail!("no configuration directory is available on this platform");
        };
        println!("{}", path.display());
    } else {
        print!("{}", config.to_toml()?);
    }
    Ok(ExitCode::Success)
}
