//! QFORGE - local-only QR code generator
//!
//! This library turns structured content (plain text, URLs, WiFi credentials
//! and email drafts) into QR codes without any network access, and exports
//! them as PNG, SVG or clipboard data.
//!
//! # Features
//!
//! - **Content Builders**: Canonical payloads for text, URL, WiFi and mailto
//! - **Raster Rendering**: Padded, colored QR rasters at 128-1024 px
//! - **Vector Export**: SVG documents built from the module grid
//! - **Live Sessions**: Debounced regeneration driven by field edits
//!
//! # Example
//!
//! ```no_run
//! use qforge::{ContentInput, ContentMode, Exporter, QrEncoder, RenderSettings, generate};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut input = ContentInput::with_mode(ContentMode::Url);
//!     input.url = "example.com".into();
//!
//!     let code = generate(&input, &RenderSettings::default(), &QrEncoder::new())?;
//!     let exporter = Exporter::new(".");
//!     let png = exporter.save_png(&code)?;
//!     let svg = exporter.save_svg(&code)?;
//!
//!     println!("Wrote {} and {}", png.display(), svg.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod logging;
pub mod output;
pub mod qr;
pub mod session;
pub mod vector;

// Re-exports for convenience
pub use error::{Error, Result};

pub use config::{
    ExportOptions, LogRotation, LoggingOptions, QforgeConfig, RenderOptions, SessionOptions,
};
pub use content::{ContentInput, ContentMode, EmailDraft, WifiCredentials, WifiEncryption};
pub use export::{Clipboard, CopyOutcome, Exporter, SystemClipboard, copy_code};
pub use qr::{
    Color, ColorPreset, EncodingRequest, ErrorCorrection, GridIntrospector, ModuleGrid,
    QrEncoder, RasterSurface, RenderSettings,
};
pub use session::{
    Debouncer, FieldUpdate, GeneratedCode, Session, SessionState, Trigger, generate,
};
pub use vector::{VectorDocument, VectorReconstructor};
