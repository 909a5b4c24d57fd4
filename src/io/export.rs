//! Export the computed dashboard to CSV (chart rows) or JSON (full view).
//!
//! The CSV is meant to be easy to consume in spreadsheets; the JSON carries
//! everything the text report shows, including the partition and trend cards.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::app::pipeline::DashboardView;
use crate::domain::ChartSeries;
use crate::error::AppError;

/// Write the chart rows (one line per bucket) to a CSV file.
pub fn write_chart_csv(path: &Path, series: &ChartSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut file = BufWriter::new(file);

    writeln!(file, "bucket,bucket_start,cases,deaths,recovered,recovered_estimated")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in &series.rows {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            row.label,
            row.bucket_start,
            row.cases,
            row.deaths,
            row.recovered,
            series.recovered_estimated,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    file.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

/// Write the whole dashboard view as pretty-printed JSON.
pub fn write_view_json(path: &Path, view: &DashboardView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, view)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))
}
