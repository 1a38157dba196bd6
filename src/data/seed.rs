//! Write the five representative datasets the checker consumes.
//!
//! Values are the model predictions plus seeded Gaussian scatter clipped to ±1σ, so a freshly
//! seeded directory passes every row bound. Dark-matter limits are a fixed table of
//! representative published exclusion curves. Existing files are left alone unless `force`.

use std::path::{Path, PathBuf};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DomainId, SeedConfig};
use crate::error::{AppError, EXIT_CONFIG, EvalError};
use crate::models::{CRU_PARAMETERS, ModelParameters, cmb_power, cosmic_ray_flux, strain};

/// Multipole grid: ℓ = 500, 502, …, 2500.
const CMB_ELL_START: u32 = 500;
const CMB_ELL_END: u32 = 2500;
const CMB_ELL_STEP: usize = 2;
const CMB_RELATIVE_SIGMA: f64 = 1.0e-3;

/// Energy bins log10(E/eV) = 18.0, 18.2, …, 20.0.
const UHECR_BINS: usize = 11;
const UHECR_X_START: f64 = 18.0;
const UHECR_X_STEP: f64 = 0.2;
const UHECR_RELATIVE_STAT: f64 = 0.05;
const UHECR_RELATIVE_SYS: f64 = 0.07;

/// Pulsar-timing through space-interferometer band (Hz).
const GW_FREQUENCIES_HZ: [f64; 24] = [
    1e-9, 2e-9, 5e-9, 1e-8, 2e-8, 5e-8, 1e-7, 2e-7, 5e-7, 1e-6, 2e-6, 5e-6, 1e-5, 2e-5, 5e-5,
    7.5e-5, 1e-4, 2e-4, 5e-4, 7.5e-4, 1e-3, 2e-3, 5e-3, 1e-2,
];
const GW_RELATIVE_SIGMA: f64 = 0.10;

/// (mass GeV, σ_SI limit cm², provenance)
const DM_LIMITS: [(f64, f64, &str); 8] = [
    (6.0, 5.0e-42, "SuperCDMS-like"),
    (10.0, 8.0e-44, "CRESST-like"),
    (30.0, 2.0e-46, "XENONnT-like"),
    (50.0, 1.2e-46, "LZ-like"),
    (100.0, 8.0e-47, "LZ-like"),
    (200.0, 1.5e-46, "PandaX-like"),
    (500.0, 3.0e-46, "XENONnT-like"),
    (1000.0, 6.0e-46, "LZ-like"),
];

/// What `seed_datasets` did with each file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Write every dataset under `config.data_dir`.
pub fn seed_datasets(config: &SeedConfig) -> Result<SeedOutcome, AppError> {
    seed_datasets_with(config, &CRU_PARAMETERS)
}

pub fn seed_datasets_with(
    config: &SeedConfig,
    params: &ModelParameters,
) -> Result<SeedOutcome, AppError> {
    std::fs::create_dir_all(&config.data_dir).map_err(|e| {
        AppError::io(format!(
            "Failed to create data directory '{}': {e}",
            config.data_dir.display()
        ))
    })?;

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(EXIT_CONFIG, format!("Noise distribution error: {e}")))?;

    let mut outcome = SeedOutcome::default();
    for (index, domain) in DomainId::ALL.into_iter().enumerate() {
        let path = config.data_dir.join(domain.file_name());
        if path.exists() && !config.force {
            tracing::info!(path = %path.display(), "exists; use --force to overwrite");
            outcome.skipped.push(path);
            continue;
        }

        // One stream per domain so skipping a file does not shift the others.
        let mut scatter = Scatter {
            rng: StdRng::seed_from_u64(config.seed.wrapping_add(index as u64)),
            normal,
        };
        let table = build_table(domain, params, &mut scatter).map_err(|e| {
            AppError::new(
                EXIT_CONFIG,
                format!("Cannot generate {}: {e}", domain.display_name()),
            )
        })?;
        write_table(&path, &table)?;
        tracing::info!(path = %path.display(), rows = table.rows.len(), "wrote dataset");
        outcome.written.push(path);
    }
    Ok(outcome)
}

struct Table {
    header: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

fn build_table(
    domain: DomainId,
    params: &ModelParameters,
    noise: &mut Scatter,
) -> Result<Table, EvalError> {
    match domain {
        DomainId::CmbTt | DomainId::CmbEe => {
            let spectrum = if domain == DomainId::CmbTt {
                &params.cmb_tt
            } else {
                &params.cmb_ee
            };
            let rows = (CMB_ELL_START..=CMB_ELL_END)
                .step_by(CMB_ELL_STEP)
                .map(|ell| -> Result<Vec<String>, EvalError> {
                    let cl = cmb_power(spectrum, ell)?;
                    let sigma = cl * CMB_RELATIVE_SIGMA;
                    Ok(vec![ell.to_string(), num(noise.apply(cl, sigma)), num(sigma)])
                })
                .collect::<Result<_, EvalError>>()?;
            Ok(Table {
                header: &["ell", "C_ell_sr_inv", "sigma_C_ell_sr_inv"],
                rows,
            })
        }
        DomainId::CosmicRay => {
            let rows = (0..UHECR_BINS)
                .map(|i| -> Result<Vec<String>, EvalError> {
                    // Rounded so the grid reads 18.0, 18.2, … in the file.
                    let x = ((UHECR_X_START + i as f64 * UHECR_X_STEP) * 10.0).round() / 10.0;
                    let flux = cosmic_ray_flux(&params.cosmic_ray, x)?;
                    let stat = flux * UHECR_RELATIVE_STAT;
                    let sys = flux * UHECR_RELATIVE_SYS;
                    let observed = noise.apply(flux, stat.hypot(sys));
                    Ok(vec![format!("{x:.1}"), num(observed), num(stat), num(sys)])
                })
                .collect::<Result<_, EvalError>>()?;
            Ok(Table {
                header: &["log10_E_eV", "J_eV_m2_s_sr_inv", "sigma_stat", "sigma_sys"],
                rows,
            })
        }
        DomainId::GravitationalWave => {
            let rows = GW_FREQUENCIES_HZ
                .iter()
                .map(|&f| -> Result<Vec<String>, EvalError> {
                    let h = strain(&params.gravitational_wave, f)?;
                    let sigma = h * GW_RELATIVE_SIGMA;
                    Ok(vec![num(f), num(noise.apply(h, sigma)), num(sigma)])
                })
                .collect::<Result<_, EvalError>>()?;
            Ok(Table {
                header: &["frequency_hz", "strain", "sigma_strain"],
                rows,
            })
        }
        DomainId::DarkMatter => Ok(Table {
            header: &["mass_GeV", "sigma_SI_cm2", "experiment"],
            rows: DM_LIMITS
                .iter()
                .map(|&(m, limit, experiment)| vec![num(m), num(limit), experiment.to_string()])
                .collect(),
        }),
    }
}

/// Standard-normal scatter clipped to ±1.
struct Scatter {
    rng: StdRng,
    normal: Normal<f64>,
}

impl Scatter {
    fn apply(&mut self, value: f64, sigma: f64) -> f64 {
        let z: f64 = self.normal.sample(&mut self.rng);
        value + z.clamp(-1.0, 1.0) * sigma
    }
}

fn num(v: f64) -> String {
    format!("{v:e}")
}

fn write_table(path: &Path, table: &Table) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", path.display())))?;
    writer
        .write_record(table.header)
        .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", path.display())))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush '{}': {e}", path.display())))?;
    Ok(())
}
