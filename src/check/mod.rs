//! Per-domain acceptance checks.
//!
//! A `DomainChecker` knows how to load its dataset and pair every row with a model
//! prediction. Judging those pairs against a tolerance policy is shared (`judge`), as is the
//! aggregate law (`aggregate`). Adding a domain means adding one checker to `REGISTRY`.

pub mod aggregate;
pub mod cmb;
pub mod cosmic_ray;
pub mod dark_matter;
pub mod gravitational_wave;
pub mod judge;

use std::path::Path;

use crate::domain::{DomainId, DomainReport, Observed, Verdict};
use crate::error::{DatasetError, EvalError};
use crate::io::ingest::{CsvRow, DatasetStats, load_rows, summarize};
use crate::models::ModelParameters;
use crate::tolerances::DomainTolerance;

pub use aggregate::aggregate;
pub use cmb::CmbChecker;
pub use cosmic_ray::CosmicRayChecker;
pub use dark_matter::DarkMatterChecker;
pub use gravitational_wave::GravitationalWaveChecker;
pub use judge::judge;

/// One observed row paired with its prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub line: usize,
    pub x: f64,
    pub observed: f64,
    /// 1σ uncertainty on `observed` (zero for upper limits).
    pub sigma: f64,
    pub predicted: Result<f64, EvalError>,
}

/// A derived parameter computed from the whole dataset, e.g. a fitted slope.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedValue {
    pub name: &'static str,
    /// `None` when the dataset does not support the derivation.
    pub value: Option<f64>,
    /// The same quantity computed from the model.
    pub expected: Option<f64>,
    pub note: Option<String>,
}

impl DerivedValue {
    /// A value still to be derived; `note` says why when it stays `None`.
    pub(crate) fn pending(name: &'static str, expected: Option<f64>) -> Self {
        DerivedValue {
            name,
            value: None,
            expected,
            note: None,
        }
    }
}

/// Everything a checker extracts from its dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evidence {
    pub rows: Vec<Comparison>,
    pub derived: Vec<DerivedValue>,
}

pub trait DomainChecker: Sync {
    fn domain(&self) -> DomainId;

    /// Names of the summary bounds this checker needs in its tolerance entry.
    fn summary_bounds(&self) -> &'static [&'static str] {
        &[]
    }

    /// Load the dataset at `path` and pair each row with the model's prediction.
    fn compare(&self, path: &Path, params: &ModelParameters) -> Result<Evidence, DatasetError>;

    /// Sanity summary of the dataset without evaluating predictions.
    fn inspect(&self, path: &Path) -> Result<DatasetStats, DatasetError>;
}

static REGISTRY: [&dyn DomainChecker; 5] = [
    &CmbChecker::TT,
    &CmbChecker::EE,
    &CosmicRayChecker,
    &GravitationalWaveChecker,
    &DarkMatterChecker,
];

/// All checkers, in report order.
pub fn registry() -> &'static [&'static dyn DomainChecker] {
    &REGISTRY
}

pub fn checker_for(domain: DomainId) -> Option<&'static dyn DomainChecker> {
    REGISTRY.iter().copied().find(|c| c.domain() == domain)
}

/// Summary bound names required by `domain`'s checker.
pub fn summary_bounds_for(domain: DomainId) -> &'static [&'static str] {
    match checker_for(domain) {
        Some(checker) => checker.summary_bounds(),
        None => &[],
    }
}

/// Evaluate one domain end to end. Dataset problems become `INSUFFICIENT_DATA`; they are
/// never propagated as errors.
pub fn evaluate(
    checker: &dyn DomainChecker,
    data_dir: &Path,
    params: &ModelParameters,
    tolerance: &DomainTolerance,
) -> DomainReport {
    let domain = checker.domain();
    let path = data_dir.join(domain.file_name());
    let report = match checker.compare(&path, params) {
        Ok(evidence) => judge(domain, &evidence, tolerance),
        Err(err) => {
            tracing::warn!(%domain, path = %path.display(), error = %err, "dataset unusable");
            insufficient(domain, tolerance, format!("{}: {err}", domain.file_name()))
        }
    };
    tracing::info!(
        %domain,
        verdict = %report.verdict,
        rows = report.rows_evaluated,
        max_deviation = ?report.max_deviation,
        "domain checked"
    );
    report
}

pub(crate) fn insufficient(
    domain: DomainId,
    tolerance: &DomainTolerance,
    detail: String,
) -> DomainReport {
    DomainReport {
        domain,
        verdict: Verdict::InsufficientData,
        max_deviation: None,
        rows_evaluated: 0,
        rule: tolerance.row.label().to_string(),
        bound: tolerance.row.bound(),
        flagged_rows: Vec::new(),
        summaries: Vec::new(),
        detail: Some(detail),
    }
}

/// Shared `inspect` implementation for any row type.
pub(crate) fn inspect_rows<R: CsvRow>(path: &Path) -> Result<DatasetStats, DatasetError> {
    let rows: Vec<Observed<R>> = load_rows(path)?;
    summarize(&rows).ok_or(DatasetError::Empty)
}
