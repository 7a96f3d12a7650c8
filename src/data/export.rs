use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use super::analysis::SuccessReport;
use super::model::MeasurementRecord;

/// One row of the records CSV.
#[derive(Debug, Serialize)]
struct RecordRow<'a> {
    filename: &'a str,
    timestamp: Option<String>,
    fiber: Option<i32>,
    integration_time_us: Option<i64>,
    integration_time_ms: Option<i32>,
    pixel_mode: Option<i32>,
    data_length: usize,
    valid: bool,
    error: Option<String>,
}

impl<'a> From<&'a MeasurementRecord> for RecordRow<'a> {
    fn from(r: &'a MeasurementRecord) -> Self {
        RecordRow {
            filename: &r.filename,
            timestamp: r.timestamp.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            fiber: r.fiber,
            integration_time_us: r.integration_time_us,
            integration_time_ms: r.header.map(|h| h.integration_time_ms),
            pixel_mode: r.header.map(|h| h.pixel_mode),
            data_length: r.data.len(),
            valid: r.is_valid(),
            error: r.error_message(),
        }
    }
}

/// Write one CSV row per record.
pub fn write_records_csv<W: Write>(records: &[MeasurementRecord], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for r in records {
        csv.serialize(RecordRow::from(r))
            .with_context(|| format!("writing CSV row for {}", r.filename))?;
    }
    csv.flush().context("flushing records CSV")?;
    Ok(())
}

/// Write the analyzer's per-record rows as `filename,max_value,status`.
pub fn write_success_csv<W: Write>(report: &SuccessReport, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in &report.rows {
        csv.serialize(row)
            .with_context(|| format!("writing CSV row for {}", row.filename))?;
    }
    csv.flush().context("flushing success CSV")?;
    Ok(())
}
