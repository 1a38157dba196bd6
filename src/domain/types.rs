//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the loaders and checkers
//! - exported to JSON (`checks.json`) and the text log
//! - reloaded by downstream table builders

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::tolerances::SummaryBound;

/// One physical measurement category with its own dataset file and tolerance policy.
///
/// The CMB temperature and polarization spectra are separate entries so each dataset file
/// maps to exactly one reported verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainId {
    CmbTt,
    CmbEe,
    CosmicRay,
    GravitationalWave,
    DarkMatter,
}

impl DomainId {
    /// Registry order. Reports always list domains in this order.
    pub const ALL: [DomainId; 5] = [
        DomainId::CmbTt,
        DomainId::CmbEe,
        DomainId::CosmicRay,
        DomainId::GravitationalWave,
        DomainId::DarkMatter,
    ];

    /// Stable key used in reports and tolerance files.
    pub fn key(self) -> &'static str {
        match self {
            DomainId::CmbTt => "cmb_tt",
            DomainId::CmbEe => "cmb_ee",
            DomainId::CosmicRay => "cosmic_ray",
            DomainId::GravitationalWave => "gravitational_wave",
            DomainId::DarkMatter => "dark_matter",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            DomainId::CmbTt => "CMB TT",
            DomainId::CmbEe => "CMB EE",
            DomainId::CosmicRay => "UHECR flux",
            DomainId::GravitationalWave => "GW strain",
            DomainId::DarkMatter => "DM limits",
        }
    }

    /// Dataset file name inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            DomainId::CmbTt => "cmb_cl_TT.csv",
            DomainId::CmbEe => "cmb_cl_EE.csv",
            DomainId::CosmicRay => "uhecr_flux.csv",
            DomainId::GravitationalWave => "gw_strain.csv",
            DomainId::DarkMatter => "dm_limits.csv",
        }
    }

    pub fn from_key(key: &str) -> Option<DomainId> {
        DomainId::ALL.into_iter().find(|d| d.key() == key)
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Outcome of comparing predictions to observations, per domain or in aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Pass,
    Fail,
    /// The dataset could not be evaluated. Never a pass, never a falsification.
    InsufficientData,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::InsufficientData => "INSUFFICIENT_DATA",
        }
    }

    /// Process exit code for an aggregate verdict.
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Pass => 0,
            Verdict::Fail => crate::error::EXIT_FAIL,
            Verdict::InsufficientData => crate::error::EXIT_INSUFFICIENT_DATA,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed dataset row together with its 1-based line number in the CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct Observed<R> {
    pub line: usize,
    pub row: R,
}

/// CMB angular power spectrum row (TT or EE).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumRow {
    pub ell: u32,
    pub cl: f64,
    pub sigma: f64,
}

/// Ultra-high-energy cosmic-ray flux row. Flux and both uncertainties share units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxRow {
    pub log10_e_ev: f64,
    pub flux: f64,
    pub stat_err: f64,
    pub sys_err: f64,
}

impl FluxRow {
    /// Statistical and systematic uncertainties combined in quadrature.
    pub fn combined_sigma(&self) -> f64 {
        self.stat_err.hypot(self.sys_err)
    }
}

/// Stochastic gravitational-wave background strain row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainRow {
    pub f_hz: f64,
    pub h_strain: f64,
    pub sigma_h: f64,
}

/// Dark-matter spin-independent exclusion limit row.
#[derive(Debug, Clone, PartialEq)]
pub struct ExclusionRow {
    pub mass_gev: f64,
    pub sigma_si_cm2: f64,
    /// Provenance label only; never used in computation.
    pub experiment: String,
}

/// One prediction-vs-observation comparison that failed its bound or could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedRow {
    pub line: usize,
    /// Independent variable (ℓ, log10 E, f, or mass).
    pub x: f64,
    pub observed: f64,
    pub predicted: Option<f64>,
    pub deviation: Option<f64>,
    pub reason: String,
}

/// A derived-parameter check (e.g. fitted spectral index) and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryCheck {
    pub name: String,
    /// Derived value; `None` when the dataset does not cover the required range.
    pub value: Option<f64>,
    /// The model's value for the same quantity, when it has one.
    pub expected: Option<f64>,
    pub bound: Option<SummaryBound>,
    /// `None` when the summary could not be evaluated.
    pub passed: Option<bool>,
    pub note: Option<String>,
}

/// One record per domain in the structured report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainReport {
    pub domain: DomainId,
    pub verdict: Verdict,
    /// Worst row deviation in the units of the domain's rule; `None` if nothing was evaluated.
    pub max_deviation: Option<f64>,
    pub rows_evaluated: usize,
    pub rule: String,
    pub bound: f64,
    pub flagged_rows: Vec<FlaggedRow>,
    pub summaries: Vec<SummaryCheck>,
    /// Loader diagnostic for `INSUFFICIENT_DATA`.
    pub detail: Option<String>,
}

/// Full structured report: aggregate verdict plus one record per domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub aggregate: Verdict,
    pub domains: Vec<DomainReport>,
}

/// A full `check` run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Optional YAML file replacing the built-in tolerance table.
    pub tolerances: Option<PathBuf>,
    pub badge_label: String,
    /// Also write the text report to `checks.log`.
    pub write_log: bool,
}

/// Configuration for writing representative offline datasets.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub data_dir: PathBuf,
    pub seed: u64,
    pub force: bool,
}
