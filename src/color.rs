use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: fiber → Color32
// ---------------------------------------------------------------------------

/// One colour per optical fiber so channels are told apart in the plot.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Option<i32>, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(fibers: &BTreeSet<Option<i32>>) -> Self {
        let mapping = fibers
            .iter()
            .copied()
            .zip(generate_palette(fibers.len()))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, fiber: Option<i32>) -> Color32 {
        self.mapping
            .get(&fiber)
            .copied()
            .unwrap_or(self.default_color)
    }
}

/// Legend / filter label for a fiber.
pub fn fiber_label(fiber: Option<i32>) -> String {
    match fiber {
        Some(f) => format!("F{f}"),
        None => "untagged".to_string(),
    }
}
