use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{Color32, ColorImage, Rect, Ui};
use egui_plot::{Line, Plot, PlotPoints};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

/// Render the spectra of all visible records with samples.
///
/// Returns the screen rect of the plot, `None` when nothing is loaded.
pub fn spectral_plot(ui: &mut Ui, state: &AppState) -> Option<Rect> {
    let Some(set) = &state.measurements else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a measurement folder to view spectra  (File → Open folder…)");
        });
        return None;
    };

    let wavelengths = state.config.as_ref().and_then(|c| c.wavelengths.as_deref());
    let x_label = if wavelengths.is_some() {
        "Wavelength [nm]"
    } else {
        "Pixel"
    };

    let response = Plot::new("spectral_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label(x_label)
        .y_axis_label("Counts")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for &idx in &state.visible_indices {
                let record = &set.records[idx];
                if record.data.is_empty() {
                    continue;
                }

                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(record.fiber))
                    .unwrap_or(Color32::LIGHT_BLUE);

                let y_values: Vec<f64> = if state.minmax_scaling {
                    minmax_scaled(&record.data)
                } else {
                    record.data.iter().map(|&v| f64::from(v)).collect()
                };

                // Fall back to pixel index when no (or mismatching) wavelengths are configured.
                let points: PlotPoints = match wavelengths {
                    Some(w) if w.len() == y_values.len() => {
                        w.iter().zip(&y_values).map(|(&x, &y)| [x, y]).collect()
                    }
                    _ => y_values
                        .iter()
                        .enumerate()
                        .map(|(i, &y)| [i as f64, y])
                        .collect(),
                };

                let line = Line::new(points)
                    .name(&record.filename)
                    .color(color)
                    .width(1.5);

                plot_ui.line(line);
            }
        });
    Some(response.response.rect)
}

fn minmax_scaled(data: &[i32]) -> Vec<f64> {
    let min = data.iter().copied().min().unwrap_or(0);
    let max = data.iter().copied().max().unwrap_or(0);
    let range = f64::from(max) - f64::from(min);
    if range == 0.0 {
        vec![0.0; data.len()]
    } else {
        data.iter()
            .map(|&v| (f64::from(v) - f64::from(min)) / range)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// PNG snapshot
// ---------------------------------------------------------------------------

/// Suggested snapshot name: the file stem when a single spectrum is shown,
/// otherwise the folder name.
pub fn default_plot_name(state: &AppState) -> String {
    let single = state.measurements.as_ref().and_then(|set| {
        let mut plotted = state
            .visible_indices
            .iter()
            .map(|&i| &set.records[i])
            .filter(|r| !r.data.is_empty());
        match (plotted.next(), plotted.next()) {
            (Some(record), None) => Some(record),
            _ => None,
        }
    });

    let stem = single
        .and_then(|r| Path::new(&r.filename).file_stem())
        .or_else(|| state.folder.as_deref().and_then(Path::file_name))
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "spectra".to_string());
    format!("{stem}.png")
}

/// Write `snapshot` as an RGBA PNG.
pub fn save_png(snapshot: &ColorImage, path: &Path) -> Result<()> {
    let [width, height] = snapshot.size;
    let rgba: Vec<u8> = snapshot.pixels.iter().flat_map(|c| c.to_array()).collect();
    image::save_buffer(
        path,
        &rgba,
        width as u32,
        height as u32,
        image::ExtendedColorType::Rgba8,
    )
    .with_context(|| format!("writing {}", path.display()))
}
