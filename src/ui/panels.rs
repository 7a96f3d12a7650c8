use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use flame_analysis::data::export::{write_records_csv, write_success_csv};
use flame_analysis::data::loader::load_directory;

use crate::color::fiber_label;
use crate::state::{AppState, View};
use crate::ui::plot::default_plot_name;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(set) = &state.measurements else {
        ui.label("No folder loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let fibers = set.fibers.clone();
    let integration_times = set.integration_times.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all();
                }
                if ui.small_button("None").clicked() {
                    state.select_none();
                }
            });

            let mut show_invalid = state.filters.show_invalid;
            if ui.checkbox(&mut show_invalid, "List invalid files").changed() {
                state.filters.show_invalid = show_invalid;
                state.refilter();
            }
            ui.separator();

            // ---- Fibers, coloured like their plot lines ----
            let header = format!("Fiber  ({}/{})", state.filters.fibers.len(), fibers.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("fiber_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for &fiber in &fibers {
                        let mut text = RichText::new(fiber_label(fiber));
                        if let Some(cm) = &state.color_map {
                            text = text.color(cm.color_for(fiber));
                        }
                        let mut checked = state.filters.fibers.contains(&fiber);
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_fiber(fiber);
                        }
                    }
                });

            // ---- Integration times ----
            let header = format!(
                "Integration time  ({}/{})",
                state.filters.integration_times.len(),
                integration_times.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("integration_filter")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for &us in &integration_times {
                        let label = us.map_or_else(|| "untagged".to_string(), |us| format!("{us} µs"));
                        let mut checked = state.filters.integration_times.contains(&us);
                        if ui.checkbox(&mut checked, label).changed() {
                            state.toggle_integration_time(us);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Load config…").clicked() {
                open_config_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let loaded = state.measurements.is_some();
            if ui
                .add_enabled(loaded, egui::Button::new("Export records CSV…"))
                .clicked()
            {
                export_dialog(state, "records.csv", export_records);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.success.is_some(), egui::Button::new("Export success CSV…"))
                .clicked()
            {
                export_dialog(state, "success.csv", export_success);
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(loaded, egui::Button::new("Save plot as PNG…"))
                .clicked()
            {
                save_plot_dialog(ui.ctx(), state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .selectable_label(state.view == View::Spectra, "Spectra")
            .clicked()
        {
            state.view = View::Spectra;
        }
        if ui
            .selectable_label(state.view == View::Report, "Report")
            .clicked()
        {
            state.view = View::Report;
        }

        ui.separator();

        if let Some(set) = &state.measurements {
            ui.label(format!(
                "{} files loaded, {} valid, {} visible",
                set.len(),
                set.valid_count(),
                state.visible_indices.len()
            ));
            ui.separator();
        }

        if ui
            .selectable_label(state.minmax_scaling, "Min-Max Scaling")
            .clicked()
        {
            state.minmax_scaling = !state.minmax_scaling;
        }

        if state.config.is_none() {
            ui.label(RichText::new("No config loaded").color(Color32::YELLOW));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let encoding = match state.config.as_ref().map(|c| c.text_encoding()) {
        Some(Ok(encoding)) => encoding,
        Some(Err(e)) => {
            state.status_message = Some(format!("Error: {e}"));
            return;
        }
        None => {
            state.status_message = Some("Load a config before opening a folder".into());
            return;
        }
    };

    let Some(folder) = rfd::FileDialog::new()
        .set_title("Open measurement folder")
        .pick_folder()
    else {
        return;
    };

    match load_directory(&folder, encoding) {
        Ok(set) => {
            log::info!(
                "Loaded {} measurements ({} valid) from {}",
                set.len(),
                set.valid_count(),
                folder.display()
            );
            state.set_measurements(folder, set);
        }
        Err(e) => {
            log::error!("Failed to load folder: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn open_config_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Load analysis config")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_config(&path);
    }
}

fn export_dialog(state: &mut AppState, default_name: &str, export: fn(&AppState, &Path) -> Result<()>) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export CSV")
        .add_filter("CSV", &["csv"])
        .set_file_name(default_name)
        .save_file()
    else {
        return;
    };

    match export(state, &path) {
        Ok(()) => log::info!("Wrote {}", path.display()),
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

/// Ask for a target file, then request a screenshot of the spectra view.
fn save_plot_dialog(ctx: &egui::Context, state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save plot as PNG")
        .add_filter("PNG", &["png"])
        .set_file_name(default_plot_name(state))
        .save_file()
    else {
        return;
    };

    state.view = View::Spectra;
    state.pending_png = Some(path);
    ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
}

fn export_records(state: &AppState, path: &Path) -> Result<()> {
    let set = state.measurements.as_ref().context("no folder loaded")?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_records_csv(&set.records, file)
}

fn export_success(state: &AppState, path: &Path) -> Result<()> {
    let report = state.success.as_ref().context("no analysis available")?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_success_csv(report, file)
}
