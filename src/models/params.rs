//! Fixed model parameter table.
//!
//! Every constant the prediction functions use lives here, with its meaning. These are
//! inputs to the model, not fit results: changing one changes the theory under test.

use crate::error::ConfigError;

/// Angular power spectrum: linear envelope with an oscillatory imprint.
///
/// `C_ℓ = A · (1 − s·(ℓ − ℓa)/(ℓb − ℓa)) · (1 + ε·sin(ℓ/λ))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumParams {
    /// `A`: power at the start of the pivot range.
    pub amplitude: f64,
    /// `s`: fractional envelope decay across the pivot range.
    pub decay: f64,
    /// `ℓa`
    pub pivot_start: f64,
    /// `ℓb`
    pub pivot_end: f64,
    /// `ε`: relative depth of the resonance imprint.
    pub imprint_depth: f64,
    /// `λ`: imprint period in multipole units.
    pub imprint_period: f64,
    /// Lowest multipole the envelope describes (monopole/dipole excluded).
    pub ell_min: u32,
    /// Highest multipole the envelope describes.
    pub ell_max: u32,
}

/// Cosmic-ray flux: single power law with a logistic suppression.
///
/// `J(x) = J0 · 10^(−γ(x − x0)) / (1 + exp((x − xc)/w))` with `x = log10(E/eV)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxParams {
    pub j0: f64,
    pub x0: f64,
    pub gamma: f64,
    /// `xc`: suppression midpoint.
    pub cutoff: f64,
    /// `w`: suppression width in decades.
    pub cutoff_width: f64,
    pub x_min: f64,
    pub x_max: f64,
}

/// Stochastic background strain: power law with a high-frequency taper.
///
/// `h(f) = h0 · (f/f0)^α / (1 + (f/ft)²)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainParams {
    pub h0: f64,
    pub f0_hz: f64,
    pub alpha: f64,
    pub taper_hz: f64,
    /// Upper edge of the band used to fit the spectral index (taper is negligible below it).
    pub index_fit_max_hz: f64,
}

/// Spin-independent WIMP–nucleon cross-section: `σ(m) = σref · (m/mref)^p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossSectionParams {
    pub sigma_ref_cm2: f64,
    pub mass_ref_gev: f64,
    pub mass_slope: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParameters {
    pub cmb_tt: SpectrumParams,
    pub cmb_ee: SpectrumParams,
    pub cosmic_ray: FluxParams,
    pub gravitational_wave: StrainParams,
    pub dark_matter: CrossSectionParams,
}

pub const CRU_PARAMETERS: ModelParameters = ModelParameters {
    cmb_tt: SpectrumParams {
        amplitude: 1.2e-10,
        decay: 0.58,
        pivot_start: 500.0,
        pivot_end: 2500.0,
        imprint_depth: 1.0e-3,
        imprint_period: 50.0,
        ell_min: 2,
        ell_max: 3000,
    },
    cmb_ee: SpectrumParams {
        amplitude: 4.0e-12,
        decay: 0.45,
        pivot_start: 500.0,
        pivot_end: 2500.0,
        imprint_depth: 1.0e-3,
        imprint_period: 50.0,
        ell_min: 2,
        ell_max: 3000,
    },
    cosmic_ray: FluxParams {
        j0: 1.0e-17,
        x0: 18.0,
        gamma: 0.5,
        cutoff: 19.75,
        cutoff_width: 0.1,
        x_min: 17.0,
        x_max: 21.0,
    },
    gravitational_wave: StrainParams {
        h0: 1.0e-22,
        f0_hz: 1.0e-3,
        alpha: 2.0,
        taper_hz: 2.0e-2,
        index_fit_max_hz: 1.0e-4,
    },
    dark_matter: CrossSectionParams {
        sigma_ref_cm2: 1.0e-48,
        mass_ref_gev: 100.0,
        mass_slope: 1.0,
    },
};

impl ModelParameters {
    /// Type-level sanity only: every constant must be finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values: [(&'static str, f64); 23] = [
            ("cmb_tt.amplitude", self.cmb_tt.amplitude),
            ("cmb_tt.decay", self.cmb_tt.decay),
            ("cmb_tt.pivot_range", self.cmb_tt.pivot_end - self.cmb_tt.pivot_start),
            ("cmb_tt.imprint_depth", self.cmb_tt.imprint_depth),
            ("cmb_tt.imprint_period", self.cmb_tt.imprint_period),
            ("cmb_ee.amplitude", self.cmb_ee.amplitude),
            ("cmb_ee.decay", self.cmb_ee.decay),
            ("cmb_ee.pivot_range", self.cmb_ee.pivot_end - self.cmb_ee.pivot_start),
            ("cmb_ee.imprint_depth", self.cmb_ee.imprint_depth),
            ("cmb_ee.imprint_period", self.cmb_ee.imprint_period),
            ("cosmic_ray.j0", self.cosmic_ray.j0),
            ("cosmic_ray.x0", self.cosmic_ray.x0),
            ("cosmic_ray.gamma", self.cosmic_ray.gamma),
            ("cosmic_ray.cutoff", self.cosmic_ray.cutoff),
            ("cosmic_ray.cutoff_width", self.cosmic_ray.cutoff_width),
            ("gravitational_wave.h0", self.gravitational_wave.h0),
            ("gravitational_wave.f0_hz", self.gravitational_wave.f0_hz),
            ("gravitational_wave.alpha", self.gravitational_wave.alpha),
            ("gravitational_wave.taper_hz", self.gravitational_wave.taper_hz),
            ("gravitational_wave.index_fit_max_hz", self.gravitational_wave.index_fit_max_hz),
            ("dark_matter.sigma_ref_cm2", self.dark_matter.sigma_ref_cm2),
            ("dark_matter.mass_ref_gev", self.dark_matter.mass_ref_gev),
            ("dark_matter.mass_slope", self.dark_matter.mass_slope),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}
