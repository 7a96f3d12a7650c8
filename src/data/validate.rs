use super::model::MeasurementRecord;

/// Outcome of checking a batch against the expected pixel count.
#[derive(Debug, Clone)]
pub struct WellFormedReport<'a> {
    pub well_formed: usize,
    pub total: usize,
    /// Invalid records and valid ones with the wrong number of samples,
    /// in input order.
    pub erroneous: Vec<&'a MeasurementRecord>,
}

impl WellFormedReport<'_> {
    pub fn erroneous_count(&self) -> usize {
        self.erroneous.len()
    }
}

/// A record is well-formed when it is valid and has exactly `nr_pixels` samples.
pub fn is_well_formed(record: &MeasurementRecord, nr_pixels: usize) -> bool {
    record.is_valid() && record.data.len() == nr_pixels
}

/// Partition `records` into well-formed and erroneous.
pub fn check_well_formed(records: &[MeasurementRecord], nr_pixels: usize) -> WellFormedReport<'_> {
    let erroneous: Vec<&MeasurementRecord> = records
        .iter()
        .filter(|r| !is_well_formed(r, nr_pixels))
        .collect();

    let report = WellFormedReport {
        well_formed: records.len() - erroneous.len(),
        total: records.len(),
        erroneous,
    };
    log::info!(
        "{}/{} files are well-formed ({} pixels expected)",
        report.well_formed,
        report.total,
        nr_pixels
    );
    report
}
