use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use flame_analysis::data::analysis::Status;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Report view (central panel)
// ---------------------------------------------------------------------------

/// Well-formedness counts, success rate and the per-record verdicts.
pub fn report_view(ui: &mut Ui, state: &AppState) {
    let Some(config) = &state.config else {
        ui.heading("Load a config to analyse measurements  (File → Load config…)");
        return;
    };

    ui.heading("Summary");
    match state.well_formed {
        Some(counts) => {
            ui.label(format!(
                "{}/{} files are well-formed ({} pixels expected).",
                counts.well_formed, counts.total, config.nr_pixels
            ));
            if counts.erroneous > 0 {
                ui.label(format!("{} erroneous files", counts.erroneous));
            }
        }
        None => {
            ui.label("No folder loaded.");
            return;
        }
    }

    let Some(report) = &state.success else {
        return;
    };
    ui.label(format!(
        "Auto-integration success rate: {}  ({}/{} changes in [{}, {}), {} without samples)",
        report.rate(),
        report.successes,
        report.evaluated,
        config.lower_boundary,
        config.upper_boundary,
        report.skipped
    ));
    ui.separator();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(260.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("File");
            });
            header.col(|ui| {
                ui.strong("Max");
            });
            header.col(|ui| {
                ui.strong("Success");
            });
        })
        .body(|body| {
            body.rows(18.0, report.rows.len(), |mut row| {
                let r = &report.rows[row.index()];
                row.col(|ui| {
                    ui.label(r.filename.as_str());
                });
                row.col(|ui| {
                    ui.label(r.max_value.map_or_else(|| "-".to_string(), |v| v.to_string()));
                });
                row.col(|ui| {
                    let color = match r.status {
                        Status::Success => Color32::GREEN,
                        Status::Failure => Color32::RED,
                        Status::Unknown => Color32::GRAY,
                    };
                    ui.label(RichText::new(r.status.to_string()).color(color));
                });
            });
        });
}
