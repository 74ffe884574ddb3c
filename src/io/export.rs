//! File exports: merged daily table (CSV/JSON) and the markdown report.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream
//! scripts; absent values are written as empty cells, never zeros.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::DailyRun;
use crate::domain::{DailySummary, MergedDailyRow};
use crate::error::AppError;

/// Write the merged daily table to a CSV file.
pub fn write_daily_csv(path: &Path, rows: &[MergedDailyRow]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(
        file,
        "date,bme_avg_temp,dht_avg_temp,bme_avg_hum,dht_avg_hum,dht_avg_lux,bme_avg_press"
    )
    .map_err(|e| AppError::usage(format!("Failed to write export CSV header: {e}")))?;

    for row in rows {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            row.date,
            cell(row.bme_avg_temp),
            cell(row.dht_avg_temp),
            cell(row.bme_avg_hum),
            cell(row.dht_avg_hum),
            cell(row.dht_avg_lux),
            cell(row.bme_avg_press),
        )
        .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }

    log::info!("wrote {} daily rows to {}", rows.len(), path.display());
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_default()
}

#[derive(Serialize)]
struct DailyExport<'a> {
    from: String,
    to: String,
    rows: &'a [MergedDailyRow],
    summary: &'a DailySummary,
}

/// Write the merged run (rows + summaries) as pretty JSON.
pub fn write_daily_json(path: &Path, run: &DailyRun) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to create export JSON '{}': {e}",
            path.display()
        ))
    })?;

    let export = DailyExport {
        from: run.range.from_str_key(),
        to: run.range.to_str_key(),
        rows: &run.rows,
        summary: &run.summary,
    };

    serde_json::to_writer_pretty(file, &export)
        .map_err(|e| AppError::usage(format!("Failed to write export JSON: {e}")))?;

    log::info!("wrote daily JSON to {}", path.display());
    Ok(())
}

/// Write the assembled markdown report.
pub fn write_report(path: &Path, report: &str) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::usage(format!("Failed to create report '{}': {e}", path.display()))
    })?;
    file.write_all(report.as_bytes())
        .map_err(|e| AppError::usage(format!("Failed to write report: {e}")))?;

    log::info!("wrote report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_become_empty_cells() {
        assert_eq!(cell(None), "");
        assert_eq!(cell(Some(25.0)), "25.0000");
    }
}
