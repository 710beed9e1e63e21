//! PNG/SVG file export and clipboard copy for generated codes

pub mod clipboard;

pub use clipboard::{Clipboard, ClipboardBackend, CopyOutcome, SystemClipboard, copy_code};

use crate::error::{Error, Result};
use crate::qr::RasterSurface;
use crate::session::GeneratedCode;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use image::ImageFormat;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// MIME type of raster exports
pub const PNG_MIME: &str = "image/png";

/// Encode a raster surface as PNG.
pub fn png_bytes(surface: &RasterSurface) -> Result<Bytes> {
    let mut buffer = Cursor::new(Vec::new());
    surface.image().write_to(&mut buffer, ImageFormat::Png)?;
    Ok(Bytes::from(buffer.into_inner()))
}

/// `data:image/png;base64,...` URI for PNG bytes
pub fn data_uri(png: &[u8]) -> String {
    format!("data:{PNG_MIME};base64,{}", STANDARD.encode(png))
}

/// `qrcode-<unix-millis>.<extension>` for the given instant
pub fn filename_at(time: SystemTime, extension: &str) -> String {
    let millis = time
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    format!("qrcode-{millis}.{extension}")
}

/// `qrcode-<unix-millis>.<extension>` for the current time
pub fn timestamped_filename(extension: &str) -> String {
    filename_at(SystemTime::now(), extension)
}

/// Writes exports into a directory with timestamped names
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    /// Exporter writing into `output_dir` (created on first write)
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Target directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save the raster as `qrcode-<millis>.png`.
    pub fn save_png(&self, code: &GeneratedCode) -> Result<PathBuf> {
        let png = png_bytes(code.surface())?;
        self.write("png", &png)
    }

    /// Save the vector document as `qrcode-<millis>.svg`.
    pub fn save_svg(&self, code: &GeneratedCode) -> Result<PathBuf> {
        let document = code.vector();
        self.write("svg", document.as_str().as_bytes())
    }

    fn write(&self, extension: &str, contents: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create output directory {}: {e}",
                    self.output_dir.display()
                ),
            ))
        })?;

        let path = self.output_dir.join(timestamped_filename(extension));
        std::fs::write(&path, contents).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write {}: {e}", path.display()),
            ))
        })?;

        tracing::info!(path = %path.display(), bytes = contents.len(), "Exported QR code");
        Ok(path)
    }
}
