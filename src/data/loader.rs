use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use rayon::prelude::*;

use super::model::{MeasurementRecord, MeasurementSet};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every regular file directly inside `dir` as a measurement.
///
/// Sub-directories are not descended into. Files are parsed in parallel
/// and returned in path order. Only a failure to list `dir` is an error;
/// a file that cannot be read or parsed becomes an invalid record.
pub fn load_directory(dir: &Path, encoding: &'static Encoding) -> Result<MeasurementSet> {
    let paths = list_files(dir)?;
    log::info!("Loading {} files from {}", paths.len(), dir.display());
    Ok(load_paths(&paths, encoding))
}

/// Parse an explicit list of measurement files, preserving order.
pub fn load_paths(paths: &[PathBuf], encoding: &'static Encoding) -> MeasurementSet {
    let records: Vec<MeasurementRecord> = paths
        .par_iter()
        .map(|p| MeasurementRecord::from_path(p, encoding))
        .collect();

    let set = MeasurementSet::from_records(records);
    log::info!(
        "Parsed {} measurements, {} valid",
        set.len(),
        set.valid_count()
    );
    set
}

/// Regular files in `dir`, sorted by path.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("reading directory {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
