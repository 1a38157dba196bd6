//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - runs the check pipeline (or seeding/inspection)
//! - prints the report and writes the artifacts
//! - maps the aggregate verdict to the process exit status

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{CheckArgs, Command, InspectArgs, SeedArgs};
use crate::domain::{CheckConfig, SeedConfig, Verdict};
use crate::error::{AppError, EXIT_INSUFFICIENT_DATA};

pub mod pipeline;

/// Entry point for the `cru-check` binary. Returns the exit status on success.
pub fn run() -> Result<u8, AppError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();
    init_tracing();
    run_from(std::env::args().collect())
}

/// Parse `argv` and dispatch. Split from `run` so tests can drive the CLI.
pub fn run_from(argv: Vec<String>) -> Result<u8, AppError> {
    // `cru-check` and `cru-check --data d` behave like `cru-check check ...`.
    let argv = rewrite_args(argv);
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Check(args) => handle_check(&args),
        Command::Seed(args) => handle_seed(&args),
        Command::Inspect(args) => handle_inspect(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the report; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_check(args: &CheckArgs) -> Result<u8, AppError> {
    let config = check_config_from_args(args);
    let report = pipeline::run_checks(&config)?;

    println!("{}", crate::report::format_check_report(&report));
    let artifacts = pipeline::write_outputs(&config, &report)?;
    tracing::info!(
        report = %artifacts.report.display(),
        badge = %artifacts.badge.display(),
        "artifacts written"
    );

    eprintln!("{}", aggregate_message(report.aggregate));
    Ok(report.aggregate.exit_code())
}

fn handle_seed(args: &SeedArgs) -> Result<u8, AppError> {
    let config = SeedConfig {
        data_dir: args.data.clone(),
        seed: args.seed,
        force: args.force,
    };
    let outcome = crate::data::seed_datasets(&config)?;
    for path in &outcome.written {
        println!("wrote   {}", path.display());
    }
    for path in &outcome.skipped {
        println!("kept    {} (use --force to overwrite)", path.display());
    }
    Ok(0)
}

fn handle_inspect(args: &InspectArgs) -> Result<u8, AppError> {
    let entries = pipeline::inspect_datasets(&args.data);
    println!("{}", crate::report::format_inspection(&entries));

    if entries.iter().any(|(_, result)| result.is_err()) {
        eprintln!("one or more datasets cannot be loaded");
        Ok(EXIT_INSUFFICIENT_DATA)
    } else {
        Ok(0)
    }
}

pub fn check_config_from_args(args: &CheckArgs) -> CheckConfig {
    CheckConfig {
        data_dir: args.data.clone(),
        out_dir: args.out.clone(),
        tolerances: args.tolerances.clone(),
        badge_label: args.badge_label.clone(),
        write_log: args.write_log,
    }
}

/// One-line stderr summary naming the aggregate state.
pub fn aggregate_message(aggregate: Verdict) -> &'static str {
    match aggregate {
        Verdict::Pass => "PASS: all predictions within tolerance",
        Verdict::Fail => "FAIL: theory contradicted by data",
        Verdict::InsufficientData => "INSUFFICIENT_DATA: pipeline incomplete",
    }
}

/// Rewrite argv so `cru-check` defaults to `cru-check check`.
///
/// Rules:
/// - `cru-check`                        -> `cru-check check`
/// - `cru-check --data d ...`           -> `cru-check check --data d ...`
/// - `cru-check --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("check".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "check" | "seed" | "inspect");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "check flags".
    if arg1.starts_with('-') {
        argv.insert(1, "check".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
