//! CMB angular power spectra (TT and EE share one checker, parameterized by spectrum).
//!
//! Besides the per-row comparison the checker measures the imprint near ℓ ≈ 500 as the
//! `modulation_depth` summary: the amplitude of `sin(ℓ/λ)` fitted to `C_ℓ / envelope − 1`.
//! Row errors of 1e-3 alone cannot tell a featureless spectrum from one with ε = 1e-3.

use std::path::Path;

use crate::check::{Comparison, DerivedValue, DomainChecker, Evidence, inspect_rows};
use crate::domain::{DomainId, Observed, SpectrumRow};
use crate::error::DatasetError;
use crate::io::ingest::{DatasetStats, load_rows};
use crate::math::fit_scale;
use crate::models::{ModelParameters, SpectrumParams, cmb_envelope, cmb_power};
use crate::tolerances::{
    MODULATION_DEPTH, MODULATION_ELL_MAX, MODULATION_ELL_MIN, MODULATION_MIN_ROWS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmbChecker {
    domain: DomainId,
}

impl CmbChecker {
    pub const TT: CmbChecker = CmbChecker {
        domain: DomainId::CmbTt,
    };
    pub const EE: CmbChecker = CmbChecker {
        domain: DomainId::CmbEe,
    };

    fn spectrum<'a>(&self, params: &'a ModelParameters) -> &'a SpectrumParams {
        match self.domain {
            DomainId::CmbEe => &params.cmb_ee,
            _ => &params.cmb_tt,
        }
    }
}

impl DomainChecker for CmbChecker {
    fn domain(&self) -> DomainId {
        self.domain
    }

    fn summary_bounds(&self) -> &'static [&'static str] {
        &[MODULATION_DEPTH]
    }

    fn compare(&self, path: &Path, params: &ModelParameters) -> Result<Evidence, DatasetError> {
        let rows = load_rows::<SpectrumRow>(path)?;
        let spectrum = self.spectrum(params);
        let comparisons = rows
            .iter()
            .map(|obs| Comparison {
                line: obs.line,
                x: f64::from(obs.row.ell),
                observed: obs.row.cl,
                sigma: obs.row.sigma,
                predicted: cmb_power(spectrum, obs.row.ell),
            })
            .collect();
        Ok(Evidence {
            rows: comparisons,
            derived: vec![modulation_depth(&rows, spectrum)],
        })
    }

    fn inspect(&self, path: &Path) -> Result<DatasetStats, DatasetError> {
        inspect_rows::<SpectrumRow>(path)
    }
}

/// Imprint amplitude relative to the model envelope inside the ℓ window.
fn modulation_depth(rows: &[Observed<SpectrumRow>], p: &SpectrumParams) -> DerivedValue {
    let mut derived = DerivedValue::pending(MODULATION_DEPTH, Some(p.imprint_depth));

    let (template, residual): (Vec<f64>, Vec<f64>) = rows
        .iter()
        .filter(|obs| (MODULATION_ELL_MIN..=MODULATION_ELL_MAX).contains(&obs.row.ell))
        .filter_map(|obs| {
            let envelope = cmb_envelope(p, obs.row.ell).ok()?;
            let phase = f64::from(obs.row.ell) / p.imprint_period;
            Some((phase.sin(), obs.row.cl / envelope - 1.0))
        })
        .unzip();

    if template.len() < MODULATION_MIN_ROWS {
        derived.note = Some(format!(
            "{} rows with {MODULATION_ELL_MIN} <= ell <= {MODULATION_ELL_MAX}; need {MODULATION_MIN_ROWS}",
            template.len()
        ));
        return derived;
    }
    match fit_scale(&template, &residual) {
        Some(depth) => derived.value = Some(depth),
        None => derived.note = Some("imprint template vanishes across the window".to_string()),
    }
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

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn dipole_row_fails_while_siblings_are_evaluated() {
        let tt = &CRU_PARAMETERS.cmb_tt;
        let c600 = cmb_power(tt, 600).unwrap();
        let c700 = cmb_power(tt, 700).unwrap();
        let body = format!(
            "ell,cl,sigma\n1,1e-10,1e-13\n600,{c600:e},{:e}\n700,{c700:e},{:e}\n",
            c600 * 1e-3,
            c700 * 1e-3
        );
        let file = write_csv(&body);

        let evidence = CmbChecker::TT.compare(file.path(), &CRU_PARAMETERS).unwrap();
        assert_eq!(evidence.rows.len(), 3);
        assert!(evidence.rows[0].predicted.is_err());

        let table = ToleranceTable::defaults();
        let report = judge(
            DomainId::CmbTt,
            &evidence,
            table.get(DomainId::CmbTt).unwrap(),
        );
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.rows_evaluated, 3);
        assert_eq!(report.flagged_rows.len(), 1);
        assert_eq!(report.flagged_rows[0].line, 2);
        assert!(report.max_deviation.unwrap() < 1e-6);
    }

    #[test]
    fn ee_uses_its_own_amplitude() {
        let ee = &CRU_PARAMETERS.cmb_ee;
        let c = cmb_power(ee, 800).unwrap();
        let file = write_csv(&format!("l,C_ell,error\n800,{c:e},{:e}\n", c * 1e-3));

        let table = ToleranceTable::defaults();
        let evidence = CmbChecker::EE.compare(file.path(), &CRU_PARAMETERS).unwrap();
        let report = judge(DomainId::CmbEe, &evidence, table.get(DomainId::CmbEe).unwrap());
        assert_eq!(report.verdict, Verdict::Pass);

        // The same row judged against the TT amplitude is far outside 3σ.
        let evidence = CmbChecker::TT.compare(file.path(), &CRU_PARAMETERS).unwrap();
        let report = judge(DomainId::CmbTt, &evidence, table.get(DomainId::CmbTt).unwrap());
        assert_eq!(report.verdict, Verdict::Fail);
    }

    /// ℓ = 450..=550 in steps of 2 with `C = shape(ℓ)` and σ = 1e-3·C.
    fn imprint_window(shape: impl Fn(u32) -> f64) -> tempfile::NamedTempFile {
        let mut body = String::from("ell,cl,sigma\n");
        for ell in (450..=550).step_by(2) {
            let c = shape(ell);
            body.push_str(&format!("{ell},{c:e},{:e}\n", c * 1e-3));
        }
        write_csv(&body)
    }

    #[test]
    fn imprint_depth_matches_the_model() {
        let tt = &CRU_PARAMETERS.cmb_tt;
        let file = imprint_window(|ell| cmb_power(tt, ell).unwrap());
        let evidence = CmbChecker::TT.compare(file.path(), &CRU_PARAMETERS).unwrap();
        let depth = &evidence.derived[0];
        assert_eq!(depth.name, MODULATION_DEPTH);
        assert!((depth.value.unwrap() - 1.0e-3).abs() < 1e-6, "{depth:?}");

        let table = ToleranceTable::defaults();
        let report = judge(DomainId::CmbTt, &evidence, table.get(DomainId::CmbTt).unwrap());
        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(report.summaries[0].passed, Some(true));
    }

    #[test]
    fn featureless_spectrum_fails_on_depth_alone() {
        let ee = &CRU_PARAMETERS.cmb_ee;
        let file = imprint_window(|ell| cmb_envelope(ee, ell).unwrap());
        let evidence = CmbChecker::EE.compare(file.path(), &CRU_PARAMETERS).unwrap();
        assert!(evidence.derived[0].value.unwrap().abs() < 1e-9);

        let table = ToleranceTable::defaults();
        let report = judge(DomainId::CmbEe, &evidence, table.get(DomainId::CmbEe).unwrap());
        // Every row is within 1σ; only the missing imprint gives it away.
        assert!(report.flagged_rows.is_empty());
        assert_eq!(report.summaries[0].passed, Some(false));
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn spectrum_outside_the_window_leaves_depth_unevaluated() {
        let tt = &CRU_PARAMETERS.cmb_tt;
        let c = cmb_power(tt, 800).unwrap();
        let file = write_csv(&format!("ell,cl,sigma\n800,{c:e},{:e}\n", c * 1e-3));
        let evidence = CmbChecker::TT.compare(file.path(), &CRU_PARAMETERS).unwrap();
        assert_eq!(evidence.derived[0].value, None);
        assert!(evidence.derived[0].note.as_ref().unwrap().starts_with("0 rows"));
    }
}
