//! CSV ingest and validation.
//!
//! This module is responsible for turning one dataset file into typed rows that are safe to
//! compare against predictions.
//!
//! Design goals:
//! - **Strict schema** for required columns (extra columns are ignored)
//! - **All-or-nothing rows**: one malformed row makes the whole dataset unusable, because a
//!   partially read dataset would produce a misleading verdict
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no prediction or tolerance logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::{ExclusionRow, FluxRow, Observed, SpectrumRow, StrainRow};
use crate::error::DatasetError;

/// A required column: canonical name plus accepted aliases (all lowercase).
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

/// A dataset row type that can be parsed from one CSV record.
pub trait CsvRow: Sized {
    /// Required columns, in the documented column order.
    const COLUMNS: &'static [Column];

    fn parse(fields: &Fields<'_>) -> Result<Self, String>;

    /// Independent variable (used for dataset summaries).
    fn x(&self) -> f64;

    /// Measured quantity (power, flux, strain or limit).
    fn y(&self) -> f64;
}

/// Typed accessors over one record, keyed by canonical column name.
pub struct Fields<'a> {
    record: &'a StringRecord,
    index: &'a HashMap<&'static str, usize>,
}

impl<'a> Fields<'a> {
    pub fn text(&self, name: &str) -> Result<&'a str, String> {
        let idx = self
            .index
            .get(name)
            .ok_or_else(|| format!("unknown column `{name}`"))?;
        self.record
            .get(*idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("missing value for `{name}`"))
    }

    pub fn float(&self, name: &str) -> Result<f64, String> {
        let raw = self.text(name)?;
        let v = raw
            .parse::<f64>()
            .map_err(|_| format!("non-numeric `{name}` value '{raw}'"))?;
        if v.is_finite() {
            Ok(v)
        } else {
            Err(format!("non-finite `{name}` value '{raw}'"))
        }
    }

    /// A one-sigma uncertainty: finite and non-negative.
    pub fn uncertainty(&self, name: &str) -> Result<f64, String> {
        let v = self.float(name)?;
        if v < 0.0 {
            return Err(format!("negative uncertainty in `{name}` ({v})"));
        }
        Ok(v)
    }

    pub fn unsigned(&self, name: &str) -> Result<u32, String> {
        let raw = self.text(name)?;
        raw.parse::<u32>()
            .map_err(|_| format!("`{name}` must be a non-negative integer, got '{raw}'"))
    }
}

/// Summary stats about a loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub rows: usize,
    pub x_min: f64,
    pub x_max: f64,
    /// Independent variable is strictly increasing down the file.
    pub strictly_increasing: bool,
    /// Measured quantity never rises down the file (a falling flux spectrum).
    pub non_increasing: bool,
    /// Share of rows with a negative measured quantity (power and flux cannot be negative).
    pub negative_fraction: f64,
}

/// Load and validate a dataset file into typed rows.
pub fn load_rows<R: CsvRow>(path: &Path) -> Result<Vec<Observed<R>>, DatasetError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DatasetError::Missing {
            path: path.to_path_buf(),
        },
        _ => DatasetError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| DatasetError::Unreadable {
            path: path.to_path_buf(),
            message: format!("failed to read CSV header: {e}"),
        })?
        .clone();

    let index = resolve_columns(&headers, R::COLUMNS)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Without a position, assume one record per line after the header.
        let fallback = idx + 2;
        let record = result.map_err(|e| DatasetError::Malformed {
            line: e.position().map_or(fallback, |pos| pos.line() as usize),
            message: format!("CSV parse error: {e}"),
        })?;
        // Quoted fields may span lines, so the record's own start line is authoritative.
        let line = record.position().map_or(fallback, |pos| pos.line() as usize);
        let fields = Fields {
            record: &record,
            index: &index,
        };
        let row = R::parse(&fields).map_err(|message| DatasetError::Malformed { line, message })?;
        rows.push(Observed { line, row });
    }

    if rows.is_empty() {
        return Err(DatasetError::Empty);
    }

    debug!(path = %path.display(), rows = rows.len(), "dataset loaded");
    Ok(rows)
}

/// Compute span and ordering of the independent variable, plus the sanity flags on the
/// measured quantity.
pub fn summarize<R: CsvRow>(rows: &[Observed<R>]) -> Option<DatasetStats> {
    let first = rows.first()?;
    let mut x_min = first.row.x();
    let mut x_max = x_min;
    let mut strictly_increasing = true;
    let mut non_increasing = true;
    for w in rows.windows(2) {
        if w[1].row.x() <= w[0].row.x() {
            strictly_increasing = false;
        }
        if w[1].row.y() > w[0].row.y() {
            non_increasing = false;
        }
    }
    for r in rows {
        x_min = x_min.min(r.row.x());
        x_max = x_max.max(r.row.x());
    }
    let negative = rows.iter().filter(|r| r.row.y() < 0.0).count();
    Some(DatasetStats {
        rows: rows.len(),
        x_min,
        x_max,
        strictly_increasing,
        non_increasing,
        negative_fraction: negative as f64 / rows.len() as f64,
    })
}

fn resolve_columns(
    headers: &StringRecord,
    columns: &'static [Column],
) -> Result<HashMap<&'static str, usize>, DatasetError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();

    let mut index = HashMap::with_capacity(columns.len());
    for col in columns {
        let found = std::iter::once(col.name)
            .chain(col.aliases.iter().copied())
            .find_map(|name| header_map.get(name).copied())
            .ok_or(DatasetError::MissingColumn { column: col.name })?;
        index.insert(col.name, found);
    }
    Ok(index)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

impl CsvRow for SpectrumRow {
    const COLUMNS: &'static [Column] = &[
        Column {
            name: "ell",
            aliases: &["l"],
        },
        Column {
            name: "cl",
            aliases: &["c_ell", "cl_tt", "cl_ee", "c_l", "c_ell_sr_inv"],
        },
        Column {
            name: "sigma",
            aliases: &["error", "sigma_cl", "sigma_c_ell_sr_inv"],
        },
    ];

    fn parse(fields: &Fields<'_>) -> Result<Self, String> {
        Ok(SpectrumRow {
            ell: fields.unsigned("ell")?,
            cl: fields.float("cl")?,
            sigma: fields.uncertainty("sigma")?,
        })
    }

    fn x(&self) -> f64 {
        f64::from(self.ell)
    }

    fn y(&self) -> f64 {
        self.cl
    }
}

impl CsvRow for FluxRow {
    const COLUMNS: &'static [Column] = &[
        Column {
            name: "log10_e_ev",
            aliases: &["log10e_ev", "log10e"],
        },
        Column {
            name: "flux",
            aliases: &["j", "j_ev_m2_s_sr_inv"],
        },
        Column {
            name: "stat_err",
            aliases: &["sigma_stat", "stat"],
        },
        Column {
            name: "sys_err",
            aliases: &["sigma_sys", "sys"],
        },
    ];

    fn parse(fields: &Fields<'_>) -> Result<Self, String> {
        Ok(FluxRow {
            log10_e_ev: fields.float("log10_e_ev")?,
            flux: fields.float("flux")?,
            stat_err: fields.uncertainty("stat_err")?,
            sys_err: fields.uncertainty("sys_err")?,
        })
    }

    fn x(&self) -> f64 {
        self.log10_e_ev
    }

    fn y(&self) -> f64 {
        self.flux
    }
}

impl CsvRow for StrainRow {
    const COLUMNS: &'static [Column] = &[
        Column {
            name: "f_hz",
            aliases: &["frequency_hz"],
        },
        Column {
            name: "h_strain",
            aliases: &["strain"],
        },
        Column {
            name: "sigma_h",
            aliases: &["strain_err", "sigma_strain"],
        },
    ];

    fn parse(fields: &Fields<'_>) -> Result<Self, String> {
        Ok(StrainRow {
            f_hz: fields.float("f_hz")?,
            h_strain: fields.float("h_strain")?,
            sigma_h: fields.uncertainty("sigma_h")?,
        })
    }

    fn x(&self) -> f64 {
        self.f_hz
    }

    fn y(&self) -> f64 {
        self.h_strain
    }
}

impl CsvRow for ExclusionRow {
    const COLUMNS: &'static [Column] = &[
        Column {
            name: "mass_gev",
            aliases: &["m_gev"],
        },
        Column {
            name: "sigma_si_cm2",
            aliases: &["sigma_cm2", "limit_si_cm2"],
        },
        Column {
            name: "experiment",
            aliases: &[],
        },
    ];

    fn parse(fields: &Fields<'_>) -> Result<Self, String> {
        Ok(ExclusionRow {
            mass_gev: fields.float("mass_gev")?,
            sigma_si_cm2: fields.float("sigma_si_cm2")?,
            experiment: fields.text("experiment")?.to_string(),
        })
    }

    fn x(&self) -> f64 {
        self.mass_gev
    }

    fn y(&self) -> f64 {
        self.sigma_si_cm2
    }
}
