//! Write the structured report and its text rendering.
//!
//! Nothing written here depends on wall-clock time, so reruns over the same inputs produce
//! byte-identical files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::CheckReport;
use crate::error::AppError;

/// Write `report` as pretty-printed JSON.
pub fn write_report_json(path: &Path, report: &CheckReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create report '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| AppError::io(format!("Failed to write report JSON: {e}")))?;
    writeln!(writer).map_err(|e| AppError::io(format!("Failed to write report JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush report '{}': {e}", path.display())))?;

    Ok(())
}

/// Read back a report written by `write_report_json`.
pub fn read_report_json(path: &Path) -> Result<CheckReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open report '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid report JSON: {e}")))
}

/// Write a text artifact verbatim.
pub fn write_text(path: &Path, text: &str) -> Result<(), AppError> {
    std::fs::write(path, text)
        .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", path.display())))
}
