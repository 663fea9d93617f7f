use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Visual settings shared by every graph a drawer puts on its canvas.
///
/// Sizes follow print conventions: the figure is measured in inches, fonts
/// and markers in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawStyle {
    /// Figure `(width, height)` in inches.
    pub fig_size: (f64, f64),
    pub font_size: f64,
    pub marker_size: f64,
    pub line_width: f64,
    pub font_family: String,
    pub vertex_color: Color,
    pub edge_color: Color,
    pub text_color: Color,
    /// Fraction of the data range left empty on each side before cropping.
    pub margin: f64,
}

impl DrawStyle {
    pub const POINTS_PER_INCH: f64 = 72.0;

    /// Black ink on a transparent page, serif math-style labels.
    pub fn classic() -> Self {
        Self {
            fig_size: (6.0, 6.0),
            font_size: 25.0,
            marker_size: 20.0,
            line_width: 1.5,
            font_family: "DejaVu Serif, Times New Roman, serif".to_string(),
            vertex_color: Color::BLACK,
            edge_color: Color::BLACK,
            text_color: Color::BLACK,
            margin: 0.05,
        }
    }

    pub fn modern() -> Self {
        Self {
            fig_size: (6.0, 6.0),
            font_size: 18.0,
            marker_size: 14.0,
            line_width: 1.4,
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            vertex_color: Color::rgb(0x1c, 0x24, 0x30),
            edge_color: Color::rgb(0x7a, 0x8a, 0xa6),
            text_color: Color::rgb(0x1c, 0x24, 0x30),
            margin: 0.05,
        }
    }

    /// Classic style with the given figure size in inches.
    pub fn with_fig_size(width: f64, height: f64) -> Self {
        Self {
            fig_size: (width, height),
            ..Self::classic()
        }
    }

    /// Figure size in points.
    pub fn page_size(&self) -> (f64, f64) {
        (
            self.fig_size.0 * Self::POINTS_PER_INCH,
            self.fig_size.1 * Self::POINTS_PER_INCH,
        )
    }

    /// Diameter, in points, of the dot drawn for a vertex.
    pub fn dot_diameter(&self) -> f64 {
        // A point marker is drawn at half the nominal marker size.
        self.marker_size * 0.5
    }
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self::classic()
    }
}
