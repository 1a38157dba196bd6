//! Shared "check pipeline" logic used by the `check` and `inspect` commands and by tests.
//!
//! The workflow is:
//! validate parameters -> load + validate tolerances -> evaluate every domain -> aggregate
//!
//! Configuration problems abort before any verdict exists. Dataset problems never abort;
//! they become `INSUFFICIENT_DATA` for their domain.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::check::{DomainChecker, aggregate, evaluate, registry, summary_bounds_for};
use crate::domain::{CheckConfig, CheckReport, DomainId, DomainReport};
use crate::error::{AppError, ConfigError, DatasetError};
use crate::io::ingest::DatasetStats;
use crate::models::{CRU_PARAMETERS, ModelParameters};
use crate::tolerances::{DomainTolerance, ToleranceTable};

pub const REPORT_FILE: &str = "checks.json";
pub const LOG_FILE: &str = "checks.log";
pub const BADGE_FILE: &str = "cru_checks.svg";

/// Paths written by a `check` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub report: PathBuf,
    pub badge: PathBuf,
    pub log: Option<PathBuf>,
}

/// Evaluate every domain against the built-in model parameters.
pub fn run_checks(config: &CheckConfig) -> Result<CheckReport, AppError> {
    run_checks_with(config, &CRU_PARAMETERS)
}

/// Evaluate every domain against `params`.
pub fn run_checks_with(
    config: &CheckConfig,
    params: &ModelParameters,
) -> Result<CheckReport, AppError> {
    params.validate()?;
    let table = ToleranceTable::load(config.tolerances.as_deref())?;
    table.validate(summary_bounds_for)?;

    let jobs: Vec<(&dyn DomainChecker, &DomainTolerance)> = registry()
        .iter()
        .map(|&checker| {
            let domain = checker.domain();
            table
                .get(domain)
                .map(|tolerance| (checker, tolerance))
                .ok_or(ConfigError::MissingTolerance(domain))
        })
        .collect::<Result<_, _>>()?;

    // Indexed parallel collect keeps registry order.
    let domains: Vec<DomainReport> = jobs
        .par_iter()
        .map(|&(checker, tolerance)| evaluate(checker, &config.data_dir, params, tolerance))
        .collect();

    let aggregate = aggregate(domains.iter().map(|d| d.verdict));
    tracing::info!(%aggregate, domains = domains.len(), "checks complete");
    Ok(CheckReport { aggregate, domains })
}

/// Write the JSON report and badge (and optionally the text log) into `config.out_dir`.
pub fn write_outputs(config: &CheckConfig, report: &CheckReport) -> Result<Artifacts, AppError> {
    let out = &config.out_dir;
    std::fs::create_dir_all(out).map_err(|e| {
        AppError::io(format!(
            "Failed to create output directory '{}': {e}",
            out.display()
        ))
    })?;

    let report_path = out.join(REPORT_FILE);
    crate::io::export::write_report_json(&report_path, report)?;

    let badge_path = out.join(BADGE_FILE);
    crate::io::badge::write_badge(&badge_path, &config.badge_label, report.aggregate)?;

    let log = if config.write_log {
        let path = out.join(LOG_FILE);
        crate::io::export::write_text(&path, &crate::report::format_check_report(report))?;
        Some(path)
    } else {
        None
    };

    Ok(Artifacts {
        report: report_path,
        badge: badge_path,
        log,
    })
}

/// Load every dataset under `data_dir` without evaluating predictions.
pub fn inspect_datasets(data_dir: &Path) -> Vec<(DomainId, Result<DatasetStats, DatasetError>)> {
    registry()
        .par_iter()
        .map(|checker| {
            let domain = checker.domain();
            (domain, checker.inspect(&data_dir.join(domain.file_name())))
        })
        .collect()
}
