//! Ultra-high-energy cosmic-ray flux.
//!
//! The suppression above ~5·10¹⁹ eV is checked as `cutoff_ratio`: median flux in the bins
//! just below the split over median flux in the bins above it.

use std::path::Path;

use crate::check::{Comparison, DerivedValue, DomainChecker, Evidence, inspect_rows};
use crate::domain::{DomainId, FluxRow};
use crate::error::DatasetError;
use crate::io::ingest::{DatasetStats, load_rows};
use crate::math::median_mut;
use crate::models::{ModelParameters, cosmic_ray_flux};
use crate::tolerances::{
    CUTOFF_ABOVE_MAX, CUTOFF_ABOVE_MIN_BINS, CUTOFF_BELOW_MIN, CUTOFF_BELOW_MIN_BINS,
    CUTOFF_RATIO, CUTOFF_SPLIT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CosmicRayChecker;

impl DomainChecker for CosmicRayChecker {
    fn domain(&self) -> DomainId {
        DomainId::CosmicRay
    }

    fn summary_bounds(&self) -> &'static [&'static str] {
        &[CUTOFF_RATIO]
    }

    fn compare(&self, path: &Path, params: &ModelParameters) -> Result<Evidence, DatasetError> {
        let rows = load_rows::<FluxRow>(path)?;
        let rows: Vec<Comparison> = rows
            .iter()
            .map(|obs| Comparison {
                line: obs.line,
                x: obs.row.log10_e_ev,
                observed: obs.row.flux,
                sigma: obs.row.combined_sigma(),
                predicted: cosmic_ray_flux(&params.cosmic_ray, obs.row.log10_e_ev),
            })
            .collect();
        let derived = vec![cutoff_ratio(&rows)];
        Ok(Evidence { rows, derived })
    }

    fn inspect(&self, path: &Path) -> Result<DatasetStats, DatasetError> {
        inspect_rows::<FluxRow>(path)
    }
}

fn is_below(x: f64) -> bool {
    (CUTOFF_BELOW_MIN..CUTOFF_SPLIT).contains(&x)
}

fn is_above(x: f64) -> bool {
    (CUTOFF_SPLIT..=CUTOFF_ABOVE_MAX).contains(&x)
}

/// Observed suppression ratio; the expected value is the model's ratio over the same bins.
fn cutoff_ratio(rows: &[Comparison]) -> DerivedValue {
    let below: Vec<&Comparison> = rows.iter().filter(|c| is_below(c.x)).collect();
    let above: Vec<&Comparison> = rows.iter().filter(|c| is_above(c.x)).collect();

    let observed = |bins: &[&Comparison]| -> Vec<f64> { bins.iter().map(|c| c.observed).collect() };
    let predicted = |bins: &[&Comparison]| -> Option<Vec<f64>> {
        bins.iter().map(|c| c.predicted.as_ref().ok().copied()).collect()
    };
    let expected = predicted(&below)
        .zip(predicted(&above))
        .and_then(|(mut b, mut a)| ratio_of_medians(&mut b, &mut a));

    let mut derived = DerivedValue::pending(CUTOFF_RATIO, expected);
    if below.len() < CUTOFF_BELOW_MIN_BINS || above.len() < CUTOFF_ABOVE_MIN_BINS {
        derived.note = Some(format!(
            "{} bins in [{CUTOFF_BELOW_MIN}, {CUTOFF_SPLIT}) and {} in [{CUTOFF_SPLIT}, {CUTOFF_ABOVE_MAX}]; need {CUTOFF_BELOW_MIN_BINS} and {CUTOFF_ABOVE_MIN_BINS}",
            below.len(),
            above.len()
        ));
        return derived;
    }
    derived.value = ratio_of_medians(&mut observed(&below), &mut observed(&above));
    derived
}

fn ratio_of_medians(below: &mut [f64], above: &mut [f64]) -> Option<f64> {
    let below = median_mut(below)?;
    // A vanishing flux above the split is the strongest possible suppression.
    let above = median_mut(above)?.max(f64::MIN_POSITIVE);
    Some(below / above)
}
