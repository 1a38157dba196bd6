//! Dark-matter direct-detection exclusion limits.
//!
//! Each row is an experimental upper limit; the predicted cross-section at that mass must
//! not exceed it.

use std::path::Path;

use crate::check::{Comparison, DomainChecker, Evidence, inspect_rows};
use crate::domain::{DomainId, ExclusionRow};
use crate::error::DatasetError;
use crate::io::ingest::{DatasetStats, load_rows};
use crate::models::{ModelParameters, cross_section};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DarkMatterChecker;

impl DomainChecker for DarkMatterChecker {
    fn domain(&self) -> DomainId {
        DomainId::DarkMatter
    }

    fn compare(&self, path: &Path, params: &ModelParameters) -> Result<Evidence, DatasetError> {
        let rows = load_rows::<ExclusionRow>(path)?;
        let rows = rows
            .iter()
            .map(|obs| Comparison {
                line: obs.line,
                x: obs.row.mass_gev,
                observed: obs.row.sigma_si_cm2,
                sigma: 0.0,
                predicted: cross_section(&params.dark_matter, obs.row.mass_gev),
            })
            .collect();
        Ok(Evidence {
            rows,
            derived: Vec::new(),
        })
    }

    fn inspect(&self, path: &Path) -> Result<DatasetStats, DatasetError> {
        inspect_rows::<ExclusionRow>(path)
    }
}
