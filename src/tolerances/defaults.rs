//! Built-in acceptance thresholds.
//!
//! These are the values used when no `--tolerances` file is given. An override file replaces
//! the whole table, so every value here has a YAML counterpart.

// ═══════════════════════════════════════════════════════════════════
// Row rules
// ═══════════════════════════════════════════════════════════════════

/// CMB TT/EE: maximum |prediction − observation| in units of the quoted 1σ error.
///
/// Published band powers carry Gaussian errors; 3σ keeps the per-row false-alarm rate
/// near 0.3% over ~1000 multipoles while still flagging a misplaced envelope.
pub const CMB_SIGMA_MULTIPLE: f64 = 3.0;

/// Cosmic-ray flux: maximum deviation in units of stat ⊕ sys.
///
/// Energy-scale systematics are correlated across bins, so the per-bin bound is looser
/// than the CMB one.
pub const COSMIC_RAY_SIGMA_MULTIPLE: f64 = 5.0;

/// GW strain: maximum deviation in units of the quoted strain error.
pub const GW_SIGMA_MULTIPLE: f64 = 3.0;

/// Dark matter: maximum `log10(σ_pred / σ_limit)`.
///
/// Zero means the predicted cross-section may touch but never exceed an exclusion limit.
pub const DM_MAX_LOG_RATIO: f64 = 0.0;

// ═══════════════════════════════════════════════════════════════════
// Summary bounds
// ═══════════════════════════════════════════════════════════════════

/// Name of the GW derived-parameter check.
pub const SPECTRAL_INDEX: &str = "spectral_index";

/// GW: maximum |fitted log-log slope − α| below the taper.
pub const GW_SPECTRAL_INDEX_BOUND: f64 = 0.05;

/// Minimum number of usable in-band rows before a spectral index is fitted.
pub const SPECTRAL_INDEX_MIN_ROWS: usize = 3;

// ═══════════════════════════════════════════════════════════════════
// CMB imprint near ℓ ≈ 500
// ═══════════════════════════════════════════════════════════════════

/// Name of the CMB imprint check (TT and EE).
pub const MODULATION_DEPTH: &str = "modulation_depth";

/// Multipole window the imprint amplitude is fitted over (inclusive).
pub const MODULATION_ELL_MIN: u32 = 450;
pub const MODULATION_ELL_MAX: u32 = 550;

/// Fewer rows than this inside the window leaves the depth unevaluated.
pub const MODULATION_MIN_ROWS: usize = 10;

/// Accepted imprint depth relative to the smooth envelope.
///
/// The model carries ε = 1e-3. The lower edge separates a real imprint from a featureless
/// spectrum at 1e-3 band-power errors; the upper edge rejects a resonance an order of
/// magnitude stronger than predicted.
pub const MODULATION_DEPTH_MIN: f64 = 3.0e-4;
pub const MODULATION_DEPTH_MAX: f64 = 5.0e-3;

// ═══════════════════════════════════════════════════════════════════
// UHECR suppression near 5·10¹⁹ eV
// ═══════════════════════════════════════════════════════════════════

/// Name of the UHECR suppression check.
pub const CUTOFF_RATIO: &str = "cutoff_ratio";

/// Bins with `CUTOFF_BELOW_MIN <= log10 E < CUTOFF_SPLIT` form the reference flux.
pub const CUTOFF_BELOW_MIN: f64 = 19.0;

/// log10(5·10¹⁹ eV), rounded to the binning.
pub const CUTOFF_SPLIT: f64 = 19.7;

/// Bins with `CUTOFF_SPLIT <= log10 E <= CUTOFF_ABOVE_MAX` form the suppressed flux.
pub const CUTOFF_ABOVE_MAX: f64 = 20.3;

pub const CUTOFF_BELOW_MIN_BINS: usize = 3;
pub const CUTOFF_ABOVE_MIN_BINS: usize = 2;

/// Minimum median(flux below) / median(flux above).
pub const CUTOFF_RATIO_MIN: f64 = 5.0;

// ═══════════════════════════════════════════════════════════════════
// GW anchor at 1 mHz
// ═══════════════════════════════════════════════════════════════════

/// Name of the GW amplitude-anchor check.
pub const STRAIN_AT_1MHZ: &str = "strain_at_1mhz";

pub const STRAIN_ANCHOR_HZ: f64 = 1.0e-3;

/// The nearest bin must lie within this many decades of the anchor.
pub const STRAIN_ANCHOR_MAX_DECADES: f64 = 0.5;

/// Order-of-magnitude window around the predicted h ≈ 1e-22.
pub const STRAIN_AT_1MHZ_MIN: f64 = 3.0e-23;
pub const STRAIN_AT_1MHZ_MAX: f64 = 3.0e-22;
