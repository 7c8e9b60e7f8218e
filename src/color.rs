use std::collections::BTreeMap;

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

/// Fixed colours for the full-text availability chart.
pub const FULL_TEXT_AVAILABLE: Color32 = Color32::from_rgb(0x2E, 0x8B, 0x57);
pub const FULL_TEXT_MISSING: Color32 = Color32::from_rgb(0xDC, 0x14, 0x3C);

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of a categorical column (e.g. sources) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Colours are assigned in the order labels are given.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ordered: Vec<&str> = Vec::new();
        for label in labels {
            if !ordered.contains(&label) {
                ordered.push(label);
            }
        }
        let palette = generate_palette(ordered.len());
        let mapping = ordered
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[2]);
    }

    #[test]
    fn labels_get_distinct_colours_and_unknowns_are_gray() {
        let cm = ColorMap::new(["PMC", "Medline", "PMC", "WHO"]);
        assert_eq!(cm.len(), 3);
        assert_ne!(cm.color_for("PMC"), cm.color_for("WHO"));
        assert_eq!(cm.color_for("arXiv"), Color32::GRAY);
    }
}
