//! Command-line parsing for the CRU prediction checker.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the checking code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "cru-check",
    version,
    about = "Check CRU model predictions against observational datasets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate every domain, write checks.json and the status badge.
    ///
    /// Exit status: 0 PASS, 1 FAIL, 3 INSUFFICIENT_DATA, 4 configuration error,
    /// 5 output write error.
    Check(CheckArgs),
    /// Write representative offline datasets into the data directory.
    Seed(SeedArgs),
    /// Summarize each dataset (rows, range, grid order, falloff, negative values) without
    /// evaluating predictions.
    Inspect(InspectArgs),
}

/// Options for a full check run.
#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// Directory holding the per-domain CSV files.
    #[arg(long, env = "CRU_DATA_DIR", default_value = "data")]
    pub data: PathBuf,

    /// Directory for checks.json and the badge.
    #[arg(long, env = "CRU_OUT_DIR", default_value = "badges")]
    pub out: PathBuf,

    /// YAML tolerance table replacing the built-in one.
    #[arg(long, env = "CRU_TOLERANCES", value_name = "YAML")]
    pub tolerances: Option<PathBuf>,

    /// Left-hand text of the badge.
    #[arg(long, default_value = "CRU")]
    pub badge_label: String,

    /// Also write the text report to checks.log.
    #[arg(long)]
    pub write_log: bool,
}

/// Options for dataset generation.
#[derive(Debug, Args, Clone)]
pub struct SeedArgs {
    #[arg(long, env = "CRU_DATA_DIR", default_value = "data")]
    pub data: PathBuf,

    /// Random seed for the observational scatter.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Overwrite files that already exist.
    #[arg(long)]
    pub force: bool,
}

/// Options for dataset inspection.
#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    #[arg(long, env = "CRU_DATA_DIR", default_value = "data")]
    pub data: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_flags_parse() {
        let cli = Cli::try_parse_from([
            "cru-check",
            "check",
            "--data",
            "d",
            "--out",
            "o",
            "--badge-label",
            "Theory",
            "--write-log",
        ])
        .unwrap();
        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.data, PathBuf::from("d"));
                assert_eq!(args.out, PathBuf::from("o"));
                assert_eq!(args.badge_label, "Theory");
                assert!(args.write_log);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn seed_defaults() {
        let cli = Cli::try_parse_from(["cru-check", "seed", "--data", "d"]).unwrap();
        match cli.command {
            Command::Seed(args) => {
                assert_eq!(args.seed, 42);
                assert!(!args.force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
