//! Closed-form predictions, one per domain.
//!
//! Each function maps the dataset's independent variable to the predicted dependent
//! variable. They are pure and deterministic; an input outside the model's domain of
//! validity is reported as an `EvalError` rather than a panic or a NaN.

use crate::error::EvalError;
use crate::models::params::{CrossSectionParams, FluxParams, SpectrumParams, StrainParams};

/// Predicted angular power `C_ℓ`.
pub fn cmb_power(p: &SpectrumParams, ell: u32) -> Result<f64, EvalError> {
    let envelope = cmb_envelope(p, ell)?;
    let imprint = 1.0 + p.imprint_depth * (f64::from(ell) / p.imprint_period).sin();
    finite(envelope * imprint)
}

/// The smooth part of `C_ℓ`, without the imprint.
pub fn cmb_envelope(p: &SpectrumParams, ell: u32) -> Result<f64, EvalError> {
    if ell < p.ell_min || ell > p.ell_max {
        return Err(EvalError::OutOfDomain {
            variable: "ell",
            value: f64::from(ell),
        });
    }
    let l = f64::from(ell);
    let u = (l - p.pivot_start) / (p.pivot_end - p.pivot_start);
    let envelope = 1.0 - p.decay * u;
    if envelope <= 0.0 {
        return Err(EvalError::OutOfDomain {
            variable: "ell",
            value: l,
        });
    }
    finite(p.amplitude * envelope)
}

/// Predicted differential flux at `x = log10(E/eV)`.
pub fn cosmic_ray_flux(p: &FluxParams, log10_e_ev: f64) -> Result<f64, EvalError> {
    if !(log10_e_ev >= p.x_min && log10_e_ev <= p.x_max) {
        return Err(EvalError::OutOfDomain {
            variable: "log10_e_ev",
            value: log10_e_ev,
        });
    }
    let power_law = p.j0 * 10f64.powf(-p.gamma * (log10_e_ev - p.x0));
    let suppression = 1.0 + ((log10_e_ev - p.cutoff) / p.cutoff_width).exp();
    finite(power_law / suppression)
}

/// Predicted dimensionless strain amplitude at frequency `f`.
pub fn strain(p: &StrainParams, f_hz: f64) -> Result<f64, EvalError> {
    if !(f_hz > 0.0 && f_hz.is_finite()) {
        return Err(EvalError::OutOfDomain {
            variable: "f_hz",
            value: f_hz,
        });
    }
    let taper = 1.0 + (f_hz / p.taper_hz).powi(2);
    finite(p.h0 * (f_hz / p.f0_hz).powf(p.alpha) / taper)
}

/// Predicted spin-independent cross-section (cm²) at WIMP mass `m` (GeV).
pub fn cross_section(p: &CrossSectionParams, mass_gev: f64) -> Result<f64, EvalError> {
    if !(mass_gev > 0.0 && mass_gev.is_finite()) {
        return Err(EvalError::OutOfDomain {
            variable: "mass_gev",
            value: mass_gev,
        });
    }
    finite(p.sigma_ref_cm2 * (mass_gev / p.mass_ref_gev).powf(p.mass_slope))
}

fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinitePrediction { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::params::CRU_PARAMETERS;

    #[test]
    fn cmb_power_matches_envelope_at_pivot() {
        let p = CRU_PARAMETERS.cmb_tt;
        let c = cmb_power(&p, 500).unwrap();
        let expected = p.amplitude * (1.0 + p.imprint_depth * (500.0f64 / 50.0).sin());
        assert!((c - expected).abs() < 1e-24);
    }

    #[test]
    fn envelope_is_power_without_imprint() {
        let p = CRU_PARAMETERS.cmb_tt;
        let env = cmb_envelope(&p, 1500).unwrap();
        assert!((env - p.amplitude * (1.0 - p.decay * 0.5)).abs() < 1e-24);
        let ratio = cmb_power(&p, 1500).unwrap() / env - 1.0;
        assert!((ratio - p.imprint_depth * 30.0f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn cmb_power_rejects_dipole() {
        let err = cmb_power(&CRU_PARAMETERS.cmb_tt, 1).unwrap_err();
        assert_eq!(
            err,
            EvalError::OutOfDomain {
                variable: "ell",
                value: 1.0
            }
        );
    }

    #[test]
    fn cosmic_ray_flux_is_suppressed_above_cutoff() {
        let p = CRU_PARAMETERS.cosmic_ray;
        let below = cosmic_ray_flux(&p, 19.5).unwrap();
        let above = cosmic_ray_flux(&p, 20.3).unwrap();
        assert!(below / above > 5.0, "ratio {}", below / above);
        assert!(cosmic_ray_flux(&p, 22.0).is_err());
    }

    #[test]
    fn strain_anchor_at_one_millihertz() {
        let p = CRU_PARAMETERS.gravitational_wave;
        let h = strain(&p, 1.0e-3).unwrap();
        // Anchor sits inside the documented [3e-23, 3e-22] window.
        assert!(h > 3.0e-23 && h < 3.0e-22, "h={h}");
        assert!(strain(&p, 0.0).is_err());
    }

    #[test]
    fn cross_section_rejects_negative_mass() {
        let p = CRU_PARAMETERS.dark_matter;
        assert!((cross_section(&p, 100.0).unwrap() - 1.0e-48).abs() < 1e-60);
        assert!(matches!(
            cross_section(&p, -5.0),
            Err(EvalError::OutOfDomain {
                variable: "mass_gev",
                ..
            })
        ));
    }
}
