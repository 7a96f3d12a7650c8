use std::path::{Path, PathBuf};

use eframe::egui;

use flame_analysis::config::AnalysisConfig;
use flame_analysis::data::analysis::{analyze_success, SuccessReport};
use flame_analysis::data::filter::{filtered_indices, init_filter_state, FilterState};
use flame_analysis::data::model::MeasurementSet;
use flame_analysis::data::validate::check_well_formed;

use crate::color::ColorMap;

/// Which view the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Spectra,
    Report,
}

/// Well-formedness tallies for the loaded folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellFormedCounts {
    pub well_formed: usize,
    pub erroneous: usize,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded measurements (None until user opens a folder).
    pub measurements: Option<MeasurementSet>,

    /// Folder the measurements were loaded from.
    pub folder: Option<PathBuf>,

    /// Analysis constants; folders cannot be opened without them.
    pub config: Option<AnalysisConfig>,

    pub filters: FilterState,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Colour per fiber.
    pub color_map: Option<ColorMap>,

    pub well_formed: Option<WellFormedCounts>,

    pub success: Option<SuccessReport>,

    pub view: View,

    /// Scale every plotted spectrum to [0, 1].
    pub minmax_scaling: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Target of a requested plot snapshot, written once the screenshot arrives.
    pub pending_png: Option<PathBuf>,

    /// Screen area of the spectra plot in the last frame, in points.
    pub plot_rect: Option<egui::Rect>,
}

impl AppState {
    /// Start with the config from `FLAME_CONFIG` / `flame.json` if present.
    pub fn with_default_config() -> Self {
        let mut state = Self::default();
        if let Some(path) = AnalysisConfig::default_path() {
            state.load_config(&path);
        }
        state
    }

    pub fn load_config(&mut self, path: &Path) {
        match AnalysisConfig::load(path) {
            Ok(config) => {
                log::info!("Using config {}", path.display());
                self.config = Some(config);
                self.status_message = None;
                self.reanalyze();
            }
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded folder, initialise filters and colours.
    pub fn set_measurements(&mut self, folder: PathBuf, set: MeasurementSet) {
        self.filters = init_filter_state(&set);
        self.visible_indices = (0..set.len()).collect();
        self.color_map = Some(ColorMap::new(&set.fibers));
        self.folder = Some(folder);
        self.measurements = Some(set);
        self.status_message = None;
        self.reanalyze();
    }

    /// Recompute the well-formedness counts and success report.
    pub fn reanalyze(&mut self) {
        let (Some(set), Some(config)) = (&self.measurements, &self.config) else {
            self.well_formed = None;
            self.success = None;
            return;
        };
        let report = check_well_formed(&set.records, config.nr_pixels);
        self.well_formed = Some(WellFormedCounts {
            well_formed: report.well_formed,
            erroneous: report.erroneous_count(),
            total: report.total,
        });
        self.success = Some(analyze_success(&set.records, config));
    }

    /// Recompute `visible_indices` after filter change.
    pub fn refilter(&mut self) {
        if let Some(set) = &self.measurements {
            self.visible_indices = filtered_indices(set, &self.filters);
        }
    }

    pub fn toggle_fiber(&mut self, fiber: Option<i32>) {
        if !self.filters.fibers.remove(&fiber) {
            self.filters.fibers.insert(fiber);
        }
        self.refilter();
    }

    pub fn toggle_integration_time(&mut self, us: Option<i64>) {
        if !self.filters.integration_times.remove(&us) {
            self.filters.integration_times.insert(us);
        }
        self.refilter();
    }

    pub fn select_all(&mut self) {
        if let Some(set) = &self.measurements {
            self.filters = FilterState {
                show_invalid: self.filters.show_invalid,
                ..init_filter_state(set)
            };
            self.refilter();
        }
    }

    pub fn select_none(&mut self) {
        self.filters.fibers.clear();
        self.filters.integration_times.clear();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;
    use flame_analysis::data::model::MeasurementRecord;

    #[test]
    fn reanalyze_counts_erroneous_records() {
        let mut state = AppState {
            config: Some(AnalysisConfig {
                nr_pixels: 3,
                integration_time_limit: 1000,
                lower_boundary: 100,
                upper_boundary: 200,
                encoding: "utf-8".to_string(),
                wavelengths: None,
            }),
            ..AppState::default()
        };
        let records = vec![
            MeasurementRecord::from_bytes("20260121T143000-F1-i100.txt", b"2 1 1 0 0 0 0 10 150 20 3", UTF_8),
            MeasurementRecord::from_bytes("20260121T143001-F1-i100.txt", b"2 1 1 0 0 0 0 10 20 3", UTF_8),
            MeasurementRecord::from_bytes("20260121T143002-F1-i100.txt", b"2, 1", UTF_8),
        ];
        state.set_measurements(PathBuf::from("run"), MeasurementSet::from_records(records));

        assert_eq!(
            state.well_formed,
            Some(WellFormedCounts {
                well_formed: 1,
                erroneous: 2,
                total: 3,
            })
        );
    }
}
