//! Stochastic gravitational-wave background strain.
//!
//! Besides the per-row comparison this checker reports two summaries: the log-log slope
//! below the taper (`spectral_index`) and the observed strain in the bin nearest 1 mHz
//! (`strain_at_1mhz`).

use std::f64::consts::LN_10;
use std::path::Path;

use crate::check::{Comparison, DerivedValue, DomainChecker, Evidence, inspect_rows};
use crate::domain::{DomainId, Observed, StrainRow};
use crate::error::DatasetError;
use crate::io::ingest::{DatasetStats, load_rows};
use crate::math::fit_line;
use crate::models::{ModelParameters, StrainParams, strain};
use crate::tolerances::{
    SPECTRAL_INDEX, SPECTRAL_INDEX_MIN_ROWS, STRAIN_ANCHOR_HZ, STRAIN_ANCHOR_MAX_DECADES,
    STRAIN_AT_1MHZ,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GravitationalWaveChecker;

impl DomainChecker for GravitationalWaveChecker {
    fn domain(&self) -> DomainId {
        DomainId::GravitationalWave
    }

    fn summary_bounds(&self) -> &'static [&'static str] {
        &[SPECTRAL_INDEX, STRAIN_AT_1MHZ]
    }

    fn compare(&self, path: &Path, params: &ModelParameters) -> Result<Evidence, DatasetError> {
        let rows = load_rows::<StrainRow>(path)?;
        let p = &params.gravitational_wave;
        let comparisons = rows
            .iter()
            .map(|obs| Comparison {
                line: obs.line,
                x: obs.row.f_hz,
                observed: obs.row.h_strain,
                sigma: obs.row.sigma_h,
                predicted: strain(p, obs.row.f_hz),
            })
            .collect();
        Ok(Evidence {
            rows: comparisons,
            derived: vec![spectral_index(&rows, p), strain_at_anchor(&rows, p)],
        })
    }

    fn inspect(&self, path: &Path) -> Result<DatasetStats, DatasetError> {
        inspect_rows::<StrainRow>(path)
    }
}

/// Weighted slope of `log10 h` against `log10 f` over rows inside the fit band.
///
/// Rows whose weight is not finite (zero quoted error) cannot enter the fit and do not count
/// towards the minimum.
fn spectral_index(rows: &[Observed<StrainRow>], p: &StrainParams) -> DerivedValue {
    let mut derived = DerivedValue::pending(SPECTRAL_INDEX, Some(p.alpha));

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut ws = Vec::new();
    for r in rows.iter().map(|obs| &obs.row) {
        if !(r.f_hz > 0.0 && r.f_hz <= p.index_fit_max_hz && r.h_strain > 0.0) {
            continue;
        }
        // σ(log10 h) = σ_h / (h ln 10)
        let sigma_log = r.sigma_h / (r.h_strain * LN_10);
        let w = 1.0 / (sigma_log * sigma_log);
        if w.is_finite() && w > 0.0 {
            xs.push(r.f_hz.log10());
            ys.push(r.h_strain.log10());
            ws.push(w);
        }
    }

    if xs.len() < SPECTRAL_INDEX_MIN_ROWS {
        derived.note = Some(format!(
            "{} usable rows with f <= {:e} Hz; need {SPECTRAL_INDEX_MIN_ROWS}",
            xs.len(),
            p.index_fit_max_hz
        ));
        return derived;
    }

    match fit_line(&xs, &ys, &ws) {
        Some((_, slope)) => derived.value = Some(slope),
        None => derived.note = Some("log-log fit is degenerate".to_string()),
    }
    derived
}

/// Observed strain in the bin nearest (in log frequency) to the 1 mHz anchor.
fn strain_at_anchor(rows: &[Observed<StrainRow>], p: &StrainParams) -> DerivedValue {
    let nearest = rows
        .iter()
        .map(|obs| &obs.row)
        .filter(|r| r.f_hz > 0.0)
        .map(|r| ((r.f_hz / STRAIN_ANCHOR_HZ).log10().abs(), r))
        .min_by(|a, b| a.0.total_cmp(&b.0));

    let Some((decades, row)) = nearest else {
        let mut derived = DerivedValue::pending(STRAIN_AT_1MHZ, strain(p, STRAIN_ANCHOR_HZ).ok());
        derived.note = Some("no rows with positive frequency".to_string());
        return derived;
    };

    let mut derived = DerivedValue::pending(STRAIN_AT_1MHZ, strain(p, row.f_hz).ok());
    if decades > STRAIN_ANCHOR_MAX_DECADES {
        derived.note = Some(format!(
            "nearest bin f={:e} Hz is {decades:.2} decades from {STRAIN_ANCHOR_HZ:e} Hz",
            row.f_hz
        ));
        return derived;
    }
    derived.value = Some(row.h_strain);
    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::judge;
    use crate::domain::Verdict;
    use crate::models::CRU_PARAMETERS;
    use crate::tolerances::ToleranceTable;
    use std::io::Write;

    fn write_strain(freqs: &[f64], scale: impl Fn(f64) -> f64) -> tempfile::NamedTempFile {
        let p = &CRU_PARAMETERS.gravitational_wave;
        let mut body = String::from("f_Hz,h_strain,sigma_h\n");
        for &f in freqs {
            let h = strain(p, f).unwrap() * scale(f);
            body.push_str(&format!("{f:e},{h:e},{:e}\n", 0.1 * h));
        }
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn exact_model_recovers_spectral_index() {
        let file = write_strain(&[1e-9, 1e-8, 1e-7, 1e-6, 1e-5, 1e-3], |_| 1.0);
        let evidence = GravitationalWaveChecker
            .compare(file.path(), &CRU_PARAMETERS)
            .unwrap();
        let index = &evidence.derived[0];
        assert_eq!(index.name, SPECTRAL_INDEX);
        assert!((index.value.unwrap() - 2.0).abs() < 1e-3);
        let anchor = &evidence.derived[1];
        assert_eq!(anchor.name, STRAIN_AT_1MHZ);
        assert_eq!(anchor.value, anchor.expected);

        let table = ToleranceTable::defaults();
        let report = judge(
            DomainId::GravitationalWave,
            &evidence,
            table.get(DomainId::GravitationalWave).unwrap(),
        );
        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(report.summaries[0].passed, Some(true));
        assert_eq!(report.summaries[1].passed, Some(true));
    }

    #[test]
    fn tilted_spectrum_fails_the_index_bound() {
        // Multiply by f^0.2 relative to 1e-6 Hz, staying inside 3σ only near the pivot.
        let file = write_strain(&[1e-7, 1e-6, 1e-5], |f| (f / 1e-6).powf(0.2));
        let evidence = GravitationalWaveChecker
            .compare(file.path(), &CRU_PARAMETERS)
            .unwrap();
        let slope = evidence.derived[0].value.unwrap();
        assert!((slope - 2.2).abs() < 1e-3, "slope {slope}");

        let table = ToleranceTable::defaults();
        let report = judge(
            DomainId::GravitationalWave,
            &evidence,
            table.get(DomainId::GravitationalWave).unwrap(),
        );
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.summaries[0].passed, Some(false));
        // 1e-5 Hz is two decades from the anchor.
        assert_eq!(report.summaries[1].passed, None);
        assert!(report.summaries[1].note.as_ref().unwrap().contains("decades"));
    }

    #[test]
    fn sparse_band_leaves_index_unevaluated() {
        let file = write_strain(&[1e-5, 1e-3, 2e-3, 5e-3], |_| 1.0);
        let evidence = GravitationalWaveChecker
            .compare(file.path(), &CRU_PARAMETERS)
            .unwrap();
        assert_eq!(evidence.derived[0].value, None);
        assert!(evidence.derived[0].note.as_ref().unwrap().contains("1 usable rows"));

        let table = ToleranceTable::defaults();
        let report = judge(
            DomainId::GravitationalWave,
            &evidence,
            table.get(DomainId::GravitationalWave).unwrap(),
        );
        assert_eq!(report.verdict, Verdict::Pass);
    }

    #[test]
    fn zero_error_row_does_not_count_towards_the_fit() {
        let p = &CRU_PARAMETERS.gravitational_wave;
        let mut body = String::from("f_Hz,h_strain,sigma_h\n");
        for (f, rel) in [(1e-7, 0.1), (1e-6, 0.0), (1e-5, 0.1)] {
            let h = strain(p, f).unwrap();
            body.push_str(&format!("{f:e},{h:e},{:e}\n", rel * h));
        }
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();

        let evidence = GravitationalWaveChecker
            .compare(file.path(), &CRU_PARAMETERS)
            .unwrap();
        assert_eq!(evidence.derived[0].value, None);
        assert!(evidence.derived[0].note.as_ref().unwrap().starts_with("2 usable rows"));
    }

    #[test]
    fn nearest_bin_to_one_millihertz_is_used() {
        let file = write_strain(&[5e-4, 9e-4, 2e-3], |_| 1.0);
        let evidence = GravitationalWaveChecker
            .compare(file.path(), &CRU_PARAMETERS)
            .unwrap();
        let anchor = &evidence.derived[1];
        let h = strain(&CRU_PARAMETERS.gravitational_wave, 9e-4).unwrap();
        assert!((anchor.value.unwrap() - h).abs() < 1e-6 * h);
    }

    #[test]
    fn anchor_an_order_of_magnitude_high_fails() {
        // Large quoted errors keep every row inside 3σ.
        let p = &CRU_PARAMETERS.gravitational_wave;
        let mut body = String::from("f_Hz,h_strain,sigma_h\n");
        for f in [5e-4, 1e-3, 2e-3] {
            let h = 10.0 * strain(p, f).unwrap();
            body.push_str(&format!("{f:e},{h:e},{h:e}\n"));
        }
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();

        let evidence = GravitationalWaveChecker
            .compare(file.path(), &CRU_PARAMETERS)
            .unwrap();
        let table = ToleranceTable::defaults();
        let report = judge(
            DomainId::GravitationalWave,
            &evidence,
            table.get(DomainId::GravitationalWave).unwrap(),
        );
        assert!(report.flagged_rows.is_empty());
        assert_eq!(report.summaries[1].name, STRAIN_AT_1MHZ);
        assert_eq!(report.summaries[1].passed, Some(false));
        assert_eq!(report.verdict, Verdict::Fail);
    }
}
