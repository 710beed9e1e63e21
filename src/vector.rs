//! SVG reconstruction from a module grid

use crate::qr::{Color, ModuleGrid, PADDING, RenderSettings};
use std::fmt::Write as _;

/// A serialized SVG document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorDocument {
    markup: String,
    total_size: u32,
    dark_rects: usize,
}

impl VectorDocument {
    /// The SVG markup
    pub fn as_str(&self) -> &str {
        &self.markup
    }

    /// Consume the document, returning the markup
    pub fn into_string(self) -> String {
        self.markup
    }

    /// Side of the view box: target size plus padding on both sides
    pub fn total_size(&self) -> u32 {
        self.total_size
    }

    /// Number of module rectangles emitted
    pub fn dark_rects(&self) -> usize {
        self.dark_rects
    }
}

/// Builds SVG documents at a target size and palette
#[derive(Debug, Clone, Copy)]
pub struct VectorReconstructor {
    size: u32,
    padding: u32,
    foreground: Color,
    background: Color,
}

impl VectorReconstructor {
    /// Reconstructor for a `size`-pixel symbol area with the standard padding
    pub fn new(size: u32, foreground: Color, background: Color) -> Self {
        Self {
            size,
            padding: PADDING,
            foreground,
            background,
        }
    }

    /// Reconstructor matching a render's size and colors
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self::new(settings.size, settings.foreground, settings.background)
    }

    /// Override the padding
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Emit the document: a full background rectangle, then one square per
    /// dark module inside a group translated by the padding.
    pub fn reconstruct(&self, grid: &ModuleGrid) -> VectorDocument {
        let total = self.size + self.padding * 2;
        let cell = if grid.width() == 0 {
            0.0
        } else {
            self.size as f64 / grid.width() as f64
        };

        let mut markup = String::with_capacity(256 + grid.dark_count() * 64);
        let _ = write!(
            markup,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {total} {total}\" width=\"{total}\" height=\"{total}\">\n  \
             <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n  \
             <g transform=\"translate({pad}, {pad})\">",
            self.background,
            pad = self.padding,
        );

        let mut dark_rects = 0;
        for (row, col) in grid.dark_modules() {
            let _ = write!(
                markup,
                "\n    <rect x=\"{}\" y=\"{}\" width=\"{cell}\" height=\"{cell}\" fill=\"{}\"/>",
                col as f64 * cell,
                row as f64 * cell,
                self.foreground,
            );
            dark_rects += 1;
        }

        markup.push_str("\n  </g>\n</svg>");

        VectorDocument {
            markup,
            total_size: total,
            dark_rects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ModuleGrid {
        ModuleGrid::new(
            3,
            1,
            vec![true, false, true, false, true, false, false, false, true],
        )
    }

    #[test]
    fn test_one_rect_per_dark_module() {
        let doc = VectorReconstructor::new(300, Color::BLACK, Color::WHITE).reconstruct(&grid());
        assert_eq!(doc.dark_rects(), 4);
        // Background rect plus one per dark module.
        assert_eq!(doc.as_str().matches("<rect ").count(), 5);
        assert_eq!(doc.as_str().matches("fill=\"#000000\"").count(), 4);
    }

    #[test]
    fn test_view_box_includes_padding() {
        let doc = VectorReconstructor::new(300, Color::BLACK, Color::WHITE).reconstruct(&grid());
        assert_eq!(doc.total_size(), 332);
        assert!(doc.as_str().contains("viewBox=\"0 0 332 332\""));
        assert!(doc.as_str().contains("width=\"332\" height=\"332\""));
        assert!(doc.as_str().contains("<g transform=\"translate(16, 16)\">"));
    }

    #[test]
    fn test_rect_positions_scale_with_target_size() {
        let doc = VectorReconstructor::new(300, Color::BLACK, Color::WHITE).reconstruct(&grid());
        assert!(doc.as_str().contains("<rect x=\"0\" y=\"0\" width=\"100\" height=\"100\""));
        assert!(doc.as_str().contains("<rect x=\"200\" y=\"0\""));
        assert!(doc.as_str().contains("<rect x=\"100\" y=\"100\""));
        assert!(doc.as_str().contains("<rect x=\"200\" y=\"200\""));
    }

    #[test]
    fn test_fractional_cells() {
        let grid = ModuleGrid::new(21, 1, vec![true]);
        let doc = VectorReconstructor::new(256, Color::BLACK, Color::WHITE).reconstruct(&grid);
        let cell = 256.0_f64 / 21.0;
        assert!(doc.as_str().contains(&format!("width=\"{cell}\"")));
    }

    #[test]
    fn test_colors_and_padding_override() {
        let fg = Color::parse_hex("#112233").unwrap();
        let bg = Color::parse_hex("#fed").unwrap();
        let doc = VectorReconstructor::new(100, fg, bg)
            .with_padding(0)
            .reconstruct(&grid());
        assert!(doc.as_str().contains("<rect width=\"100%\" height=\"100%\" fill=\"#ffeedd\"/>"));
        assert!(doc.as_str().contains("fill=\"#112233\""));
        assert!(doc.as_str().contains("viewBox=\"0 0 100 100\""));
    }

    #[test]
    fn test_blank_grid_has_only_background() {
        let grid = ModuleGrid::new(21, 1, Vec::new());
        let doc = VectorReconstructor::new(256, Color::BLACK, Color::WHITE).reconstruct(&grid);
        assert_eq!(doc.dark_rects(), 0);
        assert_eq!(doc.as_str().matches("<rect ").count(), 1);
        assert!(doc.as_str().ends_with("</g>\n</svg>"));
    }
}
