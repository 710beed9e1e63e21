//! QR code encoder

use crate::error::{Error, Result};
use crate::qr::{EncodingRequest, ErrorCorrection, PADDING, RasterSurface};
use crate::qr::grid::ModuleGrid;
use image::RgbaImage;
use qrcode::QrCode;

/// Raster adapter around the `qrcode` encoder
///
/// Surfaces are laid out like a canvas renderer: module pixels are
/// `floor((size - 2 * padding) / width)` (at least one) and the symbol starts
/// at the padding, so leftover pixels become background on the right and
/// bottom edges.
#[derive(Debug, Clone)]
pub struct QrEncoder {
    padding: u32,
}

impl QrEncoder {
    /// Create an encoder with the standard 16px padding
    pub fn new() -> Self {
        Self { padding: PADDING }
    }

    /// Create an encoder with a custom padding
    pub fn with_padding(padding: u32) -> Self {
        Self { padding }
    }

    /// Padding kept around the symbol, in pixels
    pub fn padding(&self) -> u32 {
        self.padding
    }

    fn symbol(&self, payload: &str, level: ErrorCorrection) -> Result<QrCode> {
        if payload.is_empty() {
            return Err(Error::Input("payload is empty".to_string()));
        }

        QrCode::with_error_correction_level(payload.as_bytes(), level.to_ec_level()).map_err(|e| {
            Error::Encoding(format!(
                "{} bytes at level {}: {e}",
                payload.len(),
                level.as_str()
            ))
        })
    }

    /// Encode a payload and return the encoder's module matrix directly.
    pub fn modules(&self, payload: &str, level: ErrorCorrection) -> Result<ModuleGrid> {
        let code = self.symbol(payload, level)?;
        Ok(grid_from_code(&code))
    }

    /// Render a request onto a raster surface.
    pub fn encode(&self, request: &EncodingRequest) -> Result<RasterSurface> {
        self.encode_with_grid(request).map(|(surface, _)| surface)
    }

    /// Render a request and return both the raster surface and the module grid
    /// it was drawn from.
    pub fn encode_with_grid(&self, request: &EncodingRequest) -> Result<(RasterSurface, ModuleGrid)> {
        let code = self.symbol(&request.payload, request.level)?;
        let grid = grid_from_code(&code);
        let surface = self.rasterize(&grid, request)?;

        tracing::debug!(
            modules = grid.width(),
            size = request.size,
            level = request.level.as_str(),
            dark = grid.dark_count(),
            "Rendered QR raster"
        );

        Ok((surface, grid))
    }

    fn rasterize(&self, grid: &ModuleGrid, request: &EncodingRequest) -> Result<RasterSurface> {
        let size = request.size;
        let count = grid.width() as u32;
        let module_px = (size.saturating_sub(self.padding * 2) / count).max(1);
        let offset = self.padding;

        let mut image = RgbaImage::from_pixel(size, size, request.background.to_rgba());
        let ink = request.foreground.to_rgba();

        for (row, col) in grid.dark_modules() {
            let left = offset + col as u32 * module_px;
            let top = offset + row as u32 * module_px;
            for y in top..(top + module_px).min(size) {
                for x in left..(left + module_px).min(size) {
                    image.put_pixel(x, y, ink);
                }
            }
        }

        RasterSurface::from_image(image)
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn grid_from_code(code: &QrCode) -> ModuleGrid {
    let modules = code
        .to_colors()
        .into_iter()
        .map(|color| color == qrcode::Color::Dark)
        .collect();
    ModuleGrid::new(code.width(), 1, modules)
}
