//! Auto-integration success analysis.
//!
//! The external controller changes a fiber's integration time when the
//! peak drifts out of the target range. A change counts as successful when
//! the first measurement taken with the new integration time on the same
//! fiber has its peak inside `[lower_boundary, upper_boundary)`.

use std::fmt;

use serde::Serialize;

use super::model::MeasurementRecord;
use crate::config::AnalysisConfig;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Per-record verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    #[serde(rename = "true")]
    Success,
    #[serde(rename = "false")]
    Failure,
    /// Not a scored candidate, or a candidate without samples.
    #[serde(rename = "unknown")]
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Success => "true",
            Status::Failure => "false",
            Status::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessRow {
    pub filename: String,
    pub max_value: Option<i32>,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuccessRate {
    Rate(f64),
    /// No candidate could be scored.
    NoData,
}

impl fmt::Display for SuccessRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuccessRate::Rate(r) => write!(f, "{:.1}%", r * 100.0),
            SuccessRate::NoData => f.write_str("no data"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuccessReport {
    /// Valid records in time order, then invalid records in input order.
    pub rows: Vec<SuccessRow>,
    /// Candidates that had samples and were scored.
    pub evaluated: usize,
    pub successes: usize,
    /// Candidates without samples (reported as unknown).
    pub skipped: usize,
}

impl SuccessReport {
    pub fn rate(&self) -> SuccessRate {
        if self.evaluated == 0 {
            SuccessRate::NoData
        } else {
            SuccessRate::Rate(self.successes as f64 / self.evaluated as f64)
        }
    }
}

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Valid records sorted by timestamp. Equal timestamps keep input order.
pub fn time_ordered(records: &[MeasurementRecord]) -> Vec<&MeasurementRecord> {
    let mut valid: Vec<&MeasurementRecord> = records.iter().filter(|r| r.is_valid()).collect();
    valid.sort_by_key(|r| r.timestamp);
    valid
}

/// Whether `curr` is the first measurement after an integration-time change
/// on the same fiber, below the integration-time cap.
pub fn is_candidate(prev: &MeasurementRecord, curr: &MeasurementRecord, integration_time_limit: i64) -> bool {
    curr.integration_time_us != prev.integration_time_us
        && curr.fiber == prev.fiber
        && curr
            .integration_time_us
            .is_some_and(|t| t < integration_time_limit)
}

/// Indices into `ordered` of candidate records.
pub fn candidate_indices(ordered: &[&MeasurementRecord], integration_time_limit: i64) -> Vec<usize> {
    ordered
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| is_candidate(pair[0], pair[1], integration_time_limit))
        .map(|(i, _)| i + 1)
        .collect()
}

/// Score every candidate and build the per-record report.
pub fn analyze_success(records: &[MeasurementRecord], config: &AnalysisConfig) -> SuccessReport {
    let ordered = time_ordered(records);
    let candidates = candidate_indices(&ordered, config.integration_time_limit);

    let mut report = SuccessReport::default();
    let mut next_candidate = candidates.iter().peekable();

    for (i, record) in ordered.iter().enumerate() {
        let max_value = record.max_value();
        let mut status = Status::Unknown;

        if next_candidate.next_if_eq(&&i).is_some() {
            match max_value {
                Some(peak) => {
                    report.evaluated += 1;
                    if config.in_target_range(peak) {
                        report.successes += 1;
                        status = Status::Success;
                    } else {
                        status = Status::Failure;
                    }
                }
                None => {
                    log::warn!("{}: candidate has no samples, skipped", record.filename);
                    report.skipped += 1;
                }
            }
        }

        report.rows.push(SuccessRow {
            filename: record.filename.clone(),
            max_value,
            status,
        });
    }

    report.rows.extend(
        records
            .iter()
            .filter(|r| !r.is_valid())
            .map(|r| SuccessRow {
                filename: r.filename.clone(),
                max_value: None,
                status: Status::Unknown,
            }),
    );

    log::info!(
        "Auto-integration success rate: {} ({}/{} candidates, {} without samples)",
        report.rate(),
        report.successes,
        report.evaluated,
        report.skipped
    );
    report
}
