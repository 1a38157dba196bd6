//! Per-domain acceptance policies.
//!
//! Each domain gets exactly one row rule plus zero or more named summary bounds. The table is
//! either the built-in defaults or a YAML file that replaces it entirely:
//!
//! ```yaml
//! cmb_tt:
//!   row: { rule: sigma_multiple, k: 3 }
//!   summary: { modulation_depth: { min: 3.0e-4, max: 5.0e-3 } }
//! cmb_ee:
//!   row: { rule: sigma_multiple, k: 3 }
//!   summary: { modulation_depth: { min: 3.0e-4, max: 5.0e-3 } }
//! cosmic_ray:
//!   row: { rule: sigma_multiple, k: 5 }
//!   summary: { cutoff_ratio: { min: 5 } }
//! gravitational_wave:
//!   row: { rule: sigma_multiple, k: 3 }
//!   summary: { spectral_index: 0.05, strain_at_1mhz: { min: 3.0e-23, max: 3.0e-22 } }
//! dark_matter:        { row: { rule: upper_limit, max_log_ratio: 0 } }
//! ```

pub mod defaults;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::DomainId;
use crate::error::{ConfigError, EvalError};

pub use defaults::*;

/// How one row's prediction is compared with its observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case", deny_unknown_fields)]
pub enum TolerancePolicy {
    /// `|pred − obs| / σ ≤ k`
    SigmaMultiple { k: f64 },
    /// `|pred − obs| / |obs| ≤ max`
    Fractional { max: f64 },
    /// `log10(pred / limit) ≤ max_log_ratio`; the observation is an upper limit.
    UpperLimit { max_log_ratio: f64 },
}

impl TolerancePolicy {
    /// Deviation of `predicted` from `observed` in this rule's units.
    ///
    /// `sigma` is only consulted by `SigmaMultiple`.
    pub fn deviation(&self, predicted: f64, observed: f64, sigma: f64) -> Result<f64, EvalError> {
        let deviation = match self {
            TolerancePolicy::SigmaMultiple { .. } => {
                if !(sigma > 0.0 && sigma.is_finite()) {
                    return Err(EvalError::DegenerateUncertainty { value: sigma });
                }
                (predicted - observed).abs() / sigma
            }
            TolerancePolicy::Fractional { .. } => {
                if observed == 0.0 || !observed.is_finite() {
                    return Err(EvalError::DegenerateReference { value: observed });
                }
                (predicted - observed).abs() / observed.abs()
            }
            TolerancePolicy::UpperLimit { .. } => {
                if !(observed > 0.0 && observed.is_finite()) {
                    return Err(EvalError::DegenerateReference { value: observed });
                }
                (predicted / observed).log10()
            }
        };
        if deviation.is_finite() {
            Ok(deviation)
        } else {
            Err(EvalError::NonFinitePrediction { value: predicted })
        }
    }

    /// Threshold the deviation is compared against.
    pub fn bound(&self) -> f64 {
        match *self {
            TolerancePolicy::SigmaMultiple { k } => k,
            TolerancePolicy::Fractional { max } => max,
            TolerancePolicy::UpperLimit { max_log_ratio } => max_log_ratio,
        }
    }

    /// Deviations exactly at the bound pass.
    pub fn accepts(&self, deviation: f64) -> bool {
        deviation <= self.bound()
    }

    pub fn label(&self) -> &'static str {
        match self {
            TolerancePolicy::SigmaMultiple { .. } => "sigma_multiple",
            TolerancePolicy::Fractional { .. } => "fractional",
            TolerancePolicy::UpperLimit { .. } => "upper_limit",
        }
    }

    fn validate(&self, domain: DomainId) -> Result<(), ConfigError> {
        let bound = self.bound();
        if !bound.is_finite() {
            return Err(ConfigError::InvalidThreshold {
                domain,
                message: format!("{} bound {bound} is not finite", self.label()),
            });
        }
        // A log-ratio may legitimately be zero or negative; multiples and fractions may not.
        let needs_positive = !matches!(self, TolerancePolicy::UpperLimit { .. });
        if needs_positive && bound <= 0.0 {
            return Err(ConfigError::InvalidThreshold {
                domain,
                message: format!("{} bound must be positive, got {bound}", self.label()),
            });
        }
        Ok(())
    }
}

impl fmt::Display for TolerancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TolerancePolicy::SigmaMultiple { k } => write!(f, "|pred-obs|/sigma <= {k}"),
            TolerancePolicy::Fractional { max } => write!(f, "|pred-obs|/|obs| <= {max}"),
            TolerancePolicy::UpperLimit { max_log_ratio } => {
                write!(f, "log10(pred/limit) <= {max_log_ratio}")
            }
        }
    }
}

/// Acceptance bound for one derived value.
///
/// In YAML a bare number is a tolerance around the model's expected value, `{ min, max }` is
/// a closed range and `{ min }` a floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum SummaryBound {
    /// `|value − expected| ≤ tolerance`
    Within(f64),
    /// `min ≤ value ≤ max`
    Range { min: f64, max: f64 },
    /// `value ≥ min`
    AtLeast { min: f64 },
}

impl SummaryBound {
    /// `None` when a `Within` bound has no expected value to compare against.
    pub fn accepts(&self, value: f64, expected: Option<f64>) -> Option<bool> {
        match *self {
            SummaryBound::Within(tolerance) => {
                expected.map(|expected| (value - expected).abs() <= tolerance)
            }
            SummaryBound::Range { min, max } => Some(value >= min && value <= max),
            SummaryBound::AtLeast { min } => Some(value >= min),
        }
    }

    fn validate(&self, domain: DomainId, name: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidThreshold {
            domain,
            message: format!("summary bound `{name}` {message}"),
        };
        match *self {
            SummaryBound::Within(tolerance) if !(tolerance.is_finite() && tolerance > 0.0) => {
                Err(invalid(format!("must be positive, got {tolerance}")))
            }
            SummaryBound::Range { min, max } if !(min.is_finite() && max.is_finite()) => {
                Err(invalid(format!("range [{min}, {max}] is not finite")))
            }
            SummaryBound::Range { min, max } if min > max => {
                Err(invalid(format!("range [{min}, {max}] is inverted")))
            }
            SummaryBound::AtLeast { min } if !min.is_finite() => {
                Err(invalid(format!("floor {min} is not finite")))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SummaryBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SummaryBound::Within(tolerance) => write!(f, "within {tolerance} of expected"),
            SummaryBound::Range { min, max } => write!(f, "in [{min}, {max}]"),
            SummaryBound::AtLeast { min } => write!(f, ">= {min}"),
        }
    }
}

/// Row rule and summary bounds for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainTolerance {
    pub row: TolerancePolicy,
    #[serde(default)]
    pub summary: BTreeMap<String, SummaryBound>,
}

/// The complete tolerance table, one entry per domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceTable {
    entries: BTreeMap<DomainId, DomainTolerance>,
}

impl ToleranceTable {
    /// Built-in thresholds (see `defaults`).
    pub fn defaults() -> Self {
        let entry = |row, summary: &[(&str, SummaryBound)]| DomainTolerance {
            row,
            summary: summary
                .iter()
                .map(|&(name, bound)| (name.to_string(), bound))
                .collect(),
        };
        let cmb_imprint = [(
            MODULATION_DEPTH,
            SummaryBound::Range {
                min: MODULATION_DEPTH_MIN,
                max: MODULATION_DEPTH_MAX,
            },
        )];

        let mut entries = BTreeMap::new();
        entries.insert(
            DomainId::CmbTt,
            entry(
                TolerancePolicy::SigmaMultiple {
                    k: CMB_SIGMA_MULTIPLE,
                },
                &cmb_imprint,
            ),
        );
        entries.insert(
            DomainId::CmbEe,
            entry(
                TolerancePolicy::SigmaMultiple {
                    k: CMB_SIGMA_MULTIPLE,
                },
                &cmb_imprint,
            ),
        );
        entries.insert(
            DomainId::CosmicRay,
            entry(
                TolerancePolicy::SigmaMultiple {
                    k: COSMIC_RAY_SIGMA_MULTIPLE,
                },
                &[(
                    CUTOFF_RATIO,
                    SummaryBound::AtLeast {
                        min: CUTOFF_RATIO_MIN,
                    },
                )],
            ),
        );
        entries.insert(
            DomainId::GravitationalWave,
            entry(
                TolerancePolicy::SigmaMultiple {
                    k: GW_SIGMA_MULTIPLE,
                },
                &[
                    (SPECTRAL_INDEX, SummaryBound::Within(GW_SPECTRAL_INDEX_BOUND)),
                    (
                        STRAIN_AT_1MHZ,
                        SummaryBound::Range {
                            min: STRAIN_AT_1MHZ_MIN,
                            max: STRAIN_AT_1MHZ_MAX,
                        },
                    ),
                ],
            ),
        );
        entries.insert(
            DomainId::DarkMatter,
            entry(
                TolerancePolicy::UpperLimit {
                    max_log_ratio: DM_MAX_LOG_RATIO,
                },
                &[],
            ),
        );
        Self { entries }
    }

    /// Built-in table, or the YAML file at `path` replacing it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::defaults());
        };
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let table = Self::from_yaml(&text).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        tracing::info!(path = %path.display(), "loaded tolerance overrides");
        Ok(table)
    }

    /// Parse a YAML table. Domain keys are checked here; completeness is checked by `validate`.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, DomainTolerance> =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
                path: Default::default(),
                message: e.to_string(),
            })?;
        let mut entries = BTreeMap::new();
        for (key, tolerance) in raw {
            let domain = DomainId::from_key(&key).ok_or(ConfigError::UnknownDomain(key))?;
            entries.insert(domain, tolerance);
        }
        Ok(Self { entries })
    }

    /// Every domain must have a usable row rule and exactly the summary bounds it needs.
    ///
    /// `required_summaries` names the summary bounds each domain's checker consults.
    pub fn validate(
        &self,
        required_summaries: impl Fn(DomainId) -> &'static [&'static str],
    ) -> Result<(), ConfigError> {
        for domain in DomainId::ALL {
            let entry = self
                .entries
                .get(&domain)
                .ok_or(ConfigError::MissingTolerance(domain))?;
            entry.row.validate(domain)?;

            let required = required_summaries(domain);
            for &name in required {
                entry
                    .summary
                    .get(name)
                    .ok_or(ConfigError::MissingSummaryBound { domain, name })?
                    .validate(domain, name)?;
            }
            if let Some(extra) = entry.summary.keys().find(|k| !required.contains(&k.as_str())) {
                return Err(ConfigError::UnknownSummaryBound {
                    domain,
                    name: extra.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, domain: DomainId) -> Option<&DomainTolerance> {
        self.entries.get(&domain)
    }
}
