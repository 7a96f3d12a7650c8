use eframe::egui;

use crate::state::{AppState, View};
use crate::ui::{panels, plot, report};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FlameViewerApp {
    pub state: AppState,
}

impl FlameViewerApp {
    pub fn new() -> Self {
        Self {
            state: AppState::with_default_config(),
        }
    }
}

impl eframe::App for FlameViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot or report ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Spectra => self.state.plot_rect = plot::spectral_plot(ui, &self.state),
            View::Report => report::report_view(ui, &self.state),
        });

        self.save_requested_snapshot(ctx);
    }
}

impl FlameViewerApp {
    /// Crop a delivered screenshot to the plot and write it to the pending path.
    fn save_requested_snapshot(&mut self, ctx: &egui::Context) {
        if self.state.pending_png.is_none() {
            return;
        }
        let screenshot = ctx.input(|i| {
            i.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        let Some(screenshot) = screenshot else {
            return;
        };
        let Some(path) = self.state.pending_png.take() else {
            return;
        };

        let image = match self.state.plot_rect {
            Some(rect) => screenshot.region(&rect, Some(ctx.pixels_per_point())),
            None => (*screenshot).clone(),
        };
        match plot::save_png(&image, &path) {
            Ok(()) => log::info!("Wrote {}", path.display()),
            Err(e) => {
                log::error!("Saving plot failed: {e:#}");
                self.state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
