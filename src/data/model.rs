use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;
use encoding_rs::Encoding;

use super::error::RecordError;
use super::parser::{parse_content, parse_filename};

// ---------------------------------------------------------------------------
// SpectrumHeader – fixed-layout values written by the spectrometer
// ---------------------------------------------------------------------------

/// The seven leading header values plus the trailing end marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectrumHeader {
    pub start_of_spectrum: i32,
    pub data_size_flag: i32,
    pub nr_of_scans: i32,
    pub integration_time_ms: i32,
    pub baseline_i: i32,
    pub baseline_ii: i32,
    /// Sample layout selector; only `0` is understood.
    pub pixel_mode: i32,
    pub end_of_spectrum: i32,
}

// ---------------------------------------------------------------------------
// MeasurementRecord – one file
// ---------------------------------------------------------------------------

/// A single measurement file, parsed eagerly on construction.
///
/// Construction never fails: any problem is stored in `error` and leaves
/// the content-derived fields empty.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    /// File name including extension; the record's identity.
    pub filename: String,
    /// Cause of invalidity. `None` means the record is valid.
    pub error: Option<RecordError>,

    // -- from the file name --
    pub timestamp: Option<NaiveDateTime>,
    pub fiber: Option<i32>,
    pub integration_time_us: Option<i64>,

    // -- from the file content --
    /// Present exactly when the record is valid.
    pub header: Option<SpectrumHeader>,
    /// Spectral samples; empty for invalid records and unsupported pixel modes.
    pub data: Vec<i32>,
}

impl MeasurementRecord {
    /// Read and parse the file at `path`.
    pub fn from_path(path: &Path, encoding: &'static Encoding) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match std::fs::read(path) {
            Ok(bytes) => Self::from_bytes(filename, &bytes, encoding),
            Err(e) => {
                let mut record = Self::empty(filename);
                record.invalidate(RecordError::Read(e.to_string()));
                record
            }
        }
    }

    /// Parse a record from its file name and raw file content.
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8], encoding: &'static Encoding) -> Self {
        let mut record = Self::empty(filename.into());

        let stem = Path::new(&record.filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        match parse_filename(&stem) {
            Ok(meta) => {
                record.timestamp = meta.timestamp;
                record.fiber = meta.fiber;
                record.integration_time_us = meta.integration_time_us;
            }
            Err(e) => {
                record.invalidate(e);
                return record;
            }
        }

        match parse_content(bytes, encoding) {
            Ok(content) => {
                record.header = Some(content.header);
                record.data = content.data;
                if !record.pixel_mode_supported() {
                    log::warn!(
                        "{}: pixel mode {} is not supported, no samples read",
                        record.filename,
                        content.header.pixel_mode
                    );
                }
                log::debug!("{}: {} samples", record.filename, record.data.len());
            }
            Err(e) => record.invalidate(e),
        }
        record
    }

    fn empty(filename: String) -> Self {
        MeasurementRecord {
            filename,
            error: None,
            timestamp: None,
            fiber: None,
            integration_time_us: None,
            header: None,
            data: Vec::new(),
        }
    }

    fn invalidate(&mut self, error: RecordError) {
        log::warn!("{}: {error}", self.filename);
        self.header = None;
        self.data.clear();
        self.error = Some(error);
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Human-readable cause of invalidity.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// False for valid records whose pixel mode has no known sample layout.
    pub fn pixel_mode_supported(&self) -> bool {
        self.header.map_or(true, |h| h.pixel_mode == 0)
    }

    /// Largest sample, `None` when there are no samples.
    pub fn max_value(&self) -> Option<i32> {
        self.data.iter().copied().max()
    }

    pub fn min_value(&self) -> Option<i32> {
        self.data.iter().copied().min()
    }
}

impl fmt::Display for MeasurementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.filename)?;
        if let Some(e) = &self.error {
            return write!(f, "\tError: {e}");
        }
        match self.timestamp {
            Some(ts) => writeln!(f, "\tTimestamp: {ts}")?,
            None => writeln!(f, "\tTimestamp: -")?,
        }
        let show = |v: Option<i32>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        write!(
            f,
            "\tPixels: {}\tMin: {}\tMax: {}",
            self.data.len(),
            show(self.min_value()),
            show(self.max_value())
        )
    }
}

// ---------------------------------------------------------------------------
// MeasurementSet – a loaded batch
// ---------------------------------------------------------------------------

/// A batch of records with the value sets the viewer filters on.
#[derive(Debug, Clone, Default)]
pub struct MeasurementSet {
    pub records: Vec<MeasurementRecord>,
    /// Distinct fibers over all records (`None` = untagged).
    pub fibers: BTreeSet<Option<i32>>,
    /// Distinct integration times in µs over all records.
    pub integration_times: BTreeSet<Option<i64>>,
}

impl MeasurementSet {
    pub fn from_records(records: Vec<MeasurementRecord>) -> Self {
        let fibers = records.iter().map(|r| r.fiber).collect();
        let integration_times = records.iter().map(|r| r.integration_time_us).collect();
        MeasurementSet {
            records,
            fibers,
            integration_times,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_valid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    #[test]
    fn valid_record_carries_both_parses() {
        let r = MeasurementRecord::from_bytes(
            "20260121T143000-F2-i500.txt",
            b"1 2 3 4 5 6 0 10 30 20 9",
            UTF_8,
        );
        assert!(r.is_valid());
        assert_eq!(r.fiber, Some(2));
        assert_eq!(r.integration_time_us, Some(500));
        assert_eq!(r.header.map(|h| h.end_of_spectrum), Some(9));
        assert_eq!(r.data, vec![10, 30, 20]);
        assert_eq!(r.max_value(), Some(30));
    }

    #[test]
    fn too_few_values_leaves_content_empty() {
        let r = MeasurementRecord::from_bytes("20260121T143000-F1.txt", b"1 2 3", UTF_8);
        assert!(!r.is_valid());
        assert_eq!(r.error_message().as_deref(), Some("Too few values"));
        assert!(r.header.is_none());
        assert!(r.data.is_empty());
        // filename metadata is still available
        assert_eq!(r.fiber, Some(1));
    }

    #[test]
    fn malformed_timestamp_skips_content() {
        let r = MeasurementRecord::from_bytes("notes-F1.txt", b"1 2 3 4 5 6 0 7 8 9", UTF_8);
        assert!(matches!(r.error, Some(RecordError::MalformedTimestamp { .. })));
        assert!(r.header.is_none());
        assert!(r.data.is_empty());
    }

    #[test]
    fn opaque_tags_keep_the_record_valid() {
        let r = MeasurementRecord::from_bytes(
            "20260121T143000-F2-i500-info.txt",
            b"1 2 3 4 5 6 0 10 30 20 9",
            UTF_8,
        );
        assert!(r.is_valid(), "{:?}", r.error);
        assert_eq!(r.fiber, Some(2));
        assert_eq!(r.integration_time_us, Some(500));
        assert_eq!(r.data, vec![10, 30, 20]);
    }

    #[test]
    fn unsupported_pixel_mode_is_valid_without_data() {
        let r = MeasurementRecord::from_bytes(
            "20260121T143000-F1-i100.txt",
            b"1 2 3 4 5 6 2 7 8 9 10",
            UTF_8,
        );
        assert!(r.is_valid());
        assert!(!r.pixel_mode_supported());
        assert!(r.data.is_empty());
        assert_eq!(r.max_value(), None);
    }

    #[test]
    fn unreadable_path_is_a_read_error() {
        let r = MeasurementRecord::from_path(Path::new("/nonexistent/20260121T143000.txt"), UTF_8);
        assert_eq!(r.filename, "20260121T143000.txt");
        assert!(matches!(r.error, Some(RecordError::Read(_))));
    }

    #[test]
    fn display_matches_report_layout() {
        let ok = MeasurementRecord::from_bytes(
            "20260121T143000-F2.txt",
            b"1 2 3 4 5 6 0 10 30 20 9",
            UTF_8,
        );
        assert_eq!(
            ok.to_string(),
            "20260121T143000-F2.txt\n\tTimestamp: 2026-01-21 14:30:00\n\tPixels: 3\tMin: 10\tMax: 30"
        );

        let bad = MeasurementRecord::from_bytes("20260121T143000.txt", b"1", UTF_8);
        assert_eq!(bad.to_string(), "20260121T143000.txt\n\tError: Too few values");
    }

    #[test]
    fn set_collects_distinct_tags() {
        let records = vec![
            MeasurementRecord::from_bytes("20260121T143000-F1-i100.txt", b"", UTF_8),
            MeasurementRecord::from_bytes("20260121T143001-F2-i100.txt", b"", UTF_8),
            MeasurementRecord::from_bytes("20260121T143002-i200.txt", b"", UTF_8),
        ];
        let set = MeasurementSet::from_records(records);
        assert_eq!(set.len(), 3);
        assert_eq!(set.valid_count(), 0);
        assert_eq!(set.fibers.into_iter().collect::<Vec<_>>(), vec![None, Some(1), Some(2)]);
        assert_eq!(set.integration_times.len(), 2);
    }
}
