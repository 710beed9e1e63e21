//! QR code rendering and module grid recovery
//!
//! This module wraps the external encoder to produce raster surfaces, and
//! recovers module grids either straight from the encoder or by sampling a
//! reference raster.

mod encoder;
pub mod grid;

pub use encoder::QrEncoder;
pub use grid::{GridIntrospector, ModuleGrid};

use crate::error::{Error, Result};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Padding in pixels kept around the symbol on raster surfaces and vector documents
pub const PADDING: u32 = 16;

/// Smallest accepted output size in pixels
pub const MIN_SIZE: u32 = 128;

/// Largest accepted output size in pixels
pub const MAX_SIZE: u32 = 1024;

/// Default output size in pixels
pub const DEFAULT_SIZE: u32 = 256;

/// QR error-correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// ~7% recovery
    L,
    /// ~15% recovery
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl ErrorCorrection {
    /// Level understood by the `qrcode` encoder
    pub fn to_ec_level(self) -> qrcode::EcLevel {
        match self {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }

    /// Single-letter name
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        }
    }

    /// Parse a level letter (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" => Some(ErrorCorrection::L),
            "M" => Some(ErrorCorrection::M),
            "Q" => Some(ErrorCorrection::Q),
            "H" => Some(ErrorCorrection::H),
            _ => None,
        }
    }
}

/// Opaque RGB color parsed from `#rgb` or `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Pure black
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    /// Pure white
    pub const WHITE: Color = Color {
        r: 0xff,
        g: 0xff,
        b: 0xff,
    };

    /// Parse a hex color in `#rgb` or `#rrggbb` form.
    pub fn parse_hex(value: &str) -> Result<Self> {
        let digits = value
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| Error::Color(format!("'{value}' must start with '#'")))?;

        let expanded = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            _ => {
                return Err(Error::Color(format!(
                    "'{value}' must have 3 or 6 hex digits"
                )));
            }
        };

        let bytes = hex::decode(expanded)?;
        Ok(Self {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
        })
    }

    /// Whether `value` is an acceptable hex color
    pub fn is_valid_hex(value: &str) -> bool {
        Self::parse_hex(value).is_ok()
    }

    /// Opaque pixel value for raster surfaces
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 0xff])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode([self.r, self.g, self.b]))
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// Named foreground/background pairs applied together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPreset {
    /// Preset name
    pub name: &'static str,
    /// Module color
    pub foreground: Color,
    /// Background color
    pub background: Color,
}

/// Built-in swatches
pub const PRESETS: &[ColorPreset] = &[
    ColorPreset {
        name: "classic",
        foreground: Color::BLACK,
        background: Color::WHITE,
    },
    ColorPreset {
        name: "inverted",
        foreground: Color::WHITE,
        background: Color::BLACK,
    },
    ColorPreset {
        name: "ocean",
        foreground: Color { r: 0x0b, g: 0x3c, b: 0x5d },
        background: Color { r: 0xe6, g: 0xf4, b: 0xf1 },
    },
    ColorPreset {
        name: "forest",
        foreground: Color { r: 0x1b, g: 0x43, b: 0x32 },
        background: Color { r: 0xf1, g: 0xf8, b: 0xe9 },
    },
    ColorPreset {
        name: "sunset",
        foreground: Color { r: 0x7c, g: 0x2d, b: 0x12 },
        background: Color { r: 0xff, g: 0xf7, b: 0xed },
    },
];

impl ColorPreset {
    /// Look up a built-in preset by name (case-insensitive)
    pub fn find(name: &str) -> Option<&'static ColorPreset> {
        PRESETS
            .iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Everything about a render except the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Output side length in pixels, padding included
    pub size: u32,
    /// Error-correction level
    pub level: ErrorCorrection,
    /// Module color
    pub foreground: Color,
    /// Background color
    pub background: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            level: ErrorCorrection::default(),
            foreground: Color::BLACK,
            background: Color::WHITE,
        }
    }
}

impl RenderSettings {
    /// Set the size, clamped to the accepted slider range.
    pub fn set_size(&mut self, size: u32) {
        self.size = size.clamp(MIN_SIZE, MAX_SIZE);
    }

    /// Combine these settings with a payload into an encoding request.
    pub fn request(&self, payload: impl Into<String>) -> EncodingRequest {
        EncodingRequest {
            payload: payload.into(),
            level: self.level,
            size: self.size,
            foreground: self.foreground,
            background: self.background,
        }
    }
}

/// A single render: payload plus every parameter the raster adapter needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingRequest {
    /// Exact content to encode
    pub payload: String,
    /// Error-correction level
    pub level: ErrorCorrection,
    /// Surface side length in pixels
    pub size: u32,
    /// Module color
    pub foreground: Color,
    /// Background color
    pub background: Color,
}

/// Square RGBA pixel buffer produced by the raster adapter
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    /// Wrap an existing image; it must be square and non-empty.
    pub fn from_image(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || width != height {
            return Err(Error::Image(format!(
                "raster surface must be a non-empty square, got {width}x{height}"
            )));
        }
        Ok(Self { image })
    }

    /// Side length in pixels
    pub fn size(&self) -> u32 {
        self.image.width()
    }

    /// Red channel at `(x, y)`, or `None` outside the surface
    pub fn channel(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.image.width() && y < self.image.height() {
            Some(self.image.get_pixel(x, y)[0])
        } else {
            None
        }
    }

    /// Borrow the underlying image
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}
