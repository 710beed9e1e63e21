//! Module grid recovery from reference rasters
//!
//! A reference raster is a QR symbol drawn at a fixed square resolution with
//! no padding, dark modules on a light background. The introspector measures
//! the first dark run on the top pixel row to find the module size, derives
//! the module count from it, and classifies every module by sampling the pixel
//! nearest its center so that anti-aliased edges never decide a module.

use crate::error::{Error, Result};
use crate::qr::RasterSurface;

/// Channel values below this are dark
pub const LUMA_THRESHOLD: u8 = 128;

/// Default reference resolution for introspection
pub const REFERENCE_SIZE: u32 = 256;

/// Dark/light modules of one QR symbol, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    width: usize,
    cell_size: u32,
    modules: Vec<bool>,
    degenerate: bool,
}

impl ModuleGrid {
    /// Build a grid from row-major dark flags.
    ///
    /// `modules` is padded with light modules or truncated to `width * width`.
    pub fn new(width: usize, cell_size: u32, mut modules: Vec<bool>) -> Self {
        modules.resize(width * width, false);
        Self {
            width,
            cell_size,
            modules,
            degenerate: false,
        }
    }

    /// Modules per side
    pub fn width(&self) -> usize {
        self.width
    }

    /// Side of one module in source pixels
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Whether the module at `(row, col)` is dark; out of range is light
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < self.width && col < self.width && self.modules[row * self.width + col]
    }

    /// Number of dark modules
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|dark| **dark).count()
    }

    /// `(row, col)` of every dark module in row-major order
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(move |(index, _)| (index / width, index % width))
    }

    /// True when introspection found no dark pixel on the scanned row
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Whether the width is one of the 40 QR symbol widths (21 + 4k)
    pub fn is_valid_symbol_width(&self) -> bool {
        (21..=177).contains(&self.width) && (self.width - 21) % 4 == 0
    }
}

/// Recovers a [`ModuleGrid`] from a reference raster
#[derive(Debug, Clone, Copy)]
pub struct GridIntrospector {
    reference_size: u32,
    threshold: u8,
}

impl GridIntrospector {
    /// Introspector for surfaces of `reference_size` pixels per side
    pub fn new(reference_size: u32) -> Self {
        Self {
            reference_size: reference_size.max(1),
            threshold: LUMA_THRESHOLD,
        }
    }

    /// Reference resolution in pixels
    pub fn reference_size(&self) -> u32 {
        self.reference_size
    }

    /// Recover the module grid of `surface`.
    ///
    /// Fails only when the surface is not at the reference resolution. A row
    /// without dark pixels gives a degenerate one-pixel grid, which callers
    /// should treat as unrenderable.
    pub fn introspect(&self, surface: &RasterSurface) -> Result<ModuleGrid> {
        if surface.size() != self.reference_size {
            return Err(Error::GridRecovery(format!(
                "surface is {}px, expected the {}px reference resolution",
                surface.size(),
                self.reference_size
            )));
        }

        let measured = self.module_size(surface);
        let cell = measured.unwrap_or(1);
        let width = (self.reference_size as f64 / cell as f64).round() as usize;

        let mut modules = Vec::with_capacity(width * width);
        for row in 0..width {
            for col in 0..width {
                let x = col as u32 * cell + cell / 2;
                let y = row as u32 * cell + cell / 2;
                modules.push(self.is_dark_pixel(surface, x, y));
            }
        }

        let mut grid = ModuleGrid::new(width, cell, modules);
        grid.degenerate = measured.is_none();

        tracing::debug!(
            cell_size = cell,
            modules = width,
            dark = grid.dark_count(),
            degenerate = grid.degenerate,
            "Recovered module grid"
        );

        Ok(grid)
    }

    /// Width of the first dark run on the top pixel row, `None` if the row has
    /// no dark pixel.
    fn module_size(&self, surface: &RasterSurface) -> Option<u32> {
        let size = surface.size();
        let start = (0..size).find(|&x| self.is_dark_pixel(surface, x, 0))?;
        let end = (start..size)
            .find(|&x| !self.is_dark_pixel(surface, x, 0))
            .unwrap_or(size);
        Some((end - start).max(1))
    }

    fn is_dark_pixel(&self, surface: &RasterSurface, x: u32, y: u32) -> bool {
        surface
            .channel(x, y)
            .is_some_and(|value| value < self.threshold)
    }
}

impl Default for GridIntrospector {
    fn default() -> Self {
        Self::new(REFERENCE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Draw `pattern` (row-major, `count` per side) with `cell` pixels per module.
    fn synthetic(pattern: &[bool], count: u32, cell: u32, side: u32) -> RasterSurface {
        let mut image = RgbaImage::from_pixel(side, side, Rgba([255, 255, 255, 255]));
        for (index, dark) in pattern.iter().enumerate() {
            if !dark {
                continue;
            }
            let row = index as u32 / count;
            let col = index as u32 % count;
            for y in row * cell..(row + 1) * cell {
                for x in col * cell..(col + 1) * cell {
                    image.put_pixel(x, y, Rgba([0, 0, 0, 255]));
                }
            }
        }
        RasterSurface::from_image(image).unwrap()
    }

    /// Checkerboard with a light second module on the first row.
    fn checkerboard(count: u32) -> Vec<bool> {
        (0..count * count)
            .map(|i| (i / count + i % count) % 2 == 0)
            .collect()
    }

    #[test]
    fn test_recovers_exact_count_for_exact_fit() {
        for (cell, count) in [(8u32, 32u32), (16, 16), (4, 64), (32, 8)] {
            let pattern = checkerboard(count);
            let surface = synthetic(&pattern, count, cell, cell * count);
            let grid = GridIntrospector::new(cell * count).introspect(&surface).unwrap();
            assert_eq!(grid.width(), count as usize);
            assert_eq!(grid.cell_size(), cell);
            assert!(!grid.is_degenerate());
        }
    }

    #[test]
    fn test_classification_matches_drawn_pattern() {
        let count = 16;
        let mut pattern = checkerboard(count);
        // Break the symmetry away from the first row.
        pattern[5 * count as usize + 2] = true;
        pattern[9 * count as usize + 9] = false;

        let surface = synthetic(&pattern, count, 16, 256);
        let grid = GridIntrospector::default().introspect(&surface).unwrap();

        for row in 0..count as usize {
            for col in 0..count as usize {
                assert_eq!(grid.is_dark(row, col), pattern[row * count as usize + col]);
            }
        }
        assert_eq!(grid.dark_count(), pattern.iter().filter(|d| **d).count());
    }

    #[test]
    fn test_count_rounds_to_nearest() {
        // 10px modules on a 256px surface: 25.6 rounds to 26.
        let pattern = checkerboard(25);
        let surface = synthetic(&pattern, 25, 10, 256);
        let grid = GridIntrospector::default().introspect(&surface).unwrap();
        assert_eq!(grid.width(), 26);
        // Samples past the surface edge are light.
        assert!(!grid.is_dark(25, 25));
    }

    #[test]
    fn test_dark_run_offset_from_left_edge() {
        let mut image = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255]));
        for x in 3..11 {
            image.put_pixel(x, 0, Rgba([10, 10, 10, 255]));
        }
        let surface = RasterSurface::from_image(image).unwrap();
        let grid = GridIntrospector::new(64).introspect(&surface).unwrap();
        assert_eq!(grid.cell_size(), 8);
        assert_eq!(grid.width(), 8);
    }

    #[test]
    fn test_run_reaching_row_end() {
        let image = RgbaImage::from_pixel(32, 32, Rgba([0, 0, 0, 255]));
        let surface = RasterSurface::from_image(image).unwrap();
        let grid = GridIntrospector::new(32).introspect(&surface).unwrap();
        assert_eq!(grid.cell_size(), 32);
        assert_eq!(grid.width(), 1);
        assert!(grid.is_dark(0, 0));
    }

    #[test]
    fn test_blank_row_is_degenerate() {
        let image = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255]));
        let surface = RasterSurface::from_image(image).unwrap();
        let grid = GridIntrospector::new(16).introspect(&surface).unwrap();
        assert!(grid.is_degenerate());
        assert_eq!(grid.cell_size(), 1);
        assert_eq!(grid.width(), 16);
        assert_eq!(grid.dark_count(), 0);
    }

    #[test]
    fn test_threshold_boundary() {
        let mut image = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        image.put_pixel(0, 0, Rgba([127, 127, 127, 255]));
        image.put_pixel(1, 0, Rgba([128, 128, 128, 255]));
        let surface = RasterSurface::from_image(image).unwrap();
        let grid = GridIntrospector::new(8).introspect(&surface).unwrap();
        assert_eq!(grid.cell_size(), 1);
        assert!(grid.is_dark(0, 0));
        assert!(!grid.is_dark(0, 1));
    }

    #[test]
    fn test_rejects_wrong_resolution() {
        let surface = RasterSurface::from_image(RgbaImage::new(100, 100)).unwrap();
        let result = GridIntrospector::default().introspect(&surface);
        assert!(matches!(result, Err(Error::GridRecovery(_))));
    }

    #[test]
    fn test_symbol_width_validation() {
        assert!(ModuleGrid::new(21, 1, vec![]).is_valid_symbol_width());
        assert!(ModuleGrid::new(177, 1, vec![]).is_valid_symbol_width());
        assert!(!ModuleGrid::new(23, 1, vec![]).is_valid_symbol_width());
        assert!(!ModuleGrid::new(181, 1, vec![]).is_valid_symbol_width());
        assert!(!ModuleGrid::new(17, 1, vec![]).is_valid_symbol_width());
    }

    #[test]
    fn test_dark_modules_iterates_row_major() {
        let grid = ModuleGrid::new(2, 1, vec![false, true, true, false]);
        let dark: Vec<_> = grid.dark_modules().collect();
        assert_eq!(dark, vec![(0, 1), (1, 0)]);
    }
}
