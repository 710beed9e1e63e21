//! Error types for QFORGE operations

use thiserror::Error;

/// Result type alias using QFORGE's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for QFORGE operations
#[derive(Error, Debug)]
pub enum Error {
    /// Required input is missing, so nothing can be generated
    #[error("Insufficient input: {0}")]
    Input(String),

    /// The QR encoder rejected the payload (usually a capacity overflow)
    #[error("Failed to encode QR code: {0}")]
    Encoding(String),

    /// The module grid could not be recovered from a raster surface
    #[error("Failed to recover module grid: {0}")]
    GridRecovery(String),

    /// Both the image and the text clipboard writes were rejected
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Invalid hex color value
    #[error("Invalid color: {0}")]
    Color(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error only means "show the placeholder" rather than a failure
    /// the user should be told about.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Error::Input(_) | Error::Encoding(_))
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<qrcode::types::QrError> for Error {
    fn from(e: qrcode::types::QrError) -> Self {
        Error::Encoding(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::Color(format!("Hex decode error: {}", e))
    }
}
