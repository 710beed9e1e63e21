//! QFORGE runtime configuration handling

use crate::error::{Error, Result};
use crate::export::clipboard::ClipboardBackend;
use crate::qr::grid::REFERENCE_SIZE;
use crate::qr::{Color, DEFAULT_SIZE, ErrorCorrection, RenderSettings};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QforgeConfig {
    /// Default render settings
    pub render: RenderOptions,
    /// Interactive session behaviour
    pub session: SessionOptions,
    /// Export destinations
    pub export: ExportOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl QforgeConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No qforge.toml / qforge.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["qforge.toml", "qforge.yaml", "qforge.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("qforge");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.render.apply_env_overrides();
        self.session.apply_env_overrides();
        self.export.apply_env_overrides();
        self.logging.apply_env_overrides();
    }

    /// Produce validated render settings.
    pub fn render_settings(&self) -> Result<RenderSettings> {
        self.render.to_render_settings()
    }
}

/// User-facing render defaults, validated by [`RenderOptions::to_render_settings`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output size in pixels (clamped to 128..=1024)
    pub size: u32,
    /// Error-correction level letter
    pub level: String,
    /// Module color as `#rgb` / `#rrggbb`
    pub foreground: String,
    /// Background color as `#rgb` / `#rrggbb`
    pub background: String,
    /// Side length of rasters handed to the grid introspector
    pub reference_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            level: "M".to_string(),
            foreground: "#000000".to_string(),
            background: "#ffffff".to_string(),
            reference_size: REFERENCE_SIZE,
        }
    }
}

impl RenderOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(size) = env::var("QFORGE_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.size = parsed;
            }
        }
        if let Ok(level) = env::var("QFORGE_LEVEL") {
            self.level = level;
        }
        if let Ok(foreground) = env::var("QFORGE_FOREGROUND") {
            self.foreground = foreground;
        }
        if let Ok(background) = env::var("QFORGE_BACKGROUND") {
            self.background = background;
        }
        if let Ok(reference) = env::var("QFORGE_REFERENCE_SIZE") {
            if let Ok(parsed) = reference.parse::<u32>() {
                self.reference_size = parsed.max(1);
            }
        }
    }

    /// Parse colors and level, clamp the size.
    pub fn to_render_settings(&self) -> Result<RenderSettings> {
        let level = ErrorCorrection::parse(&self.level).ok_or_else(|| {
            Error::Config(format!(
                "Unknown error-correction level '{}'. Use L, M, Q or H",
                self.level
            ))
        })?;
        let foreground = Color::parse_hex(&self.foreground)
            .map_err(|e| Error::Config(format!("Invalid foreground: {e}")))?;
        let background = Color::parse_hex(&self.background)
            .map_err(|e| Error::Config(format!("Invalid background: {e}")))?;

        let mut settings = RenderSettings {
            level,
            foreground,
            background,
            ..RenderSettings::default()
        };
        settings.set_size(self.size);
        Ok(settings)
    }
}

/// Interactive session behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Quiet period after the last field edit before regenerating
    pub debounce_ms: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl SessionOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(debounce) = env::var("QFORGE_DEBOUNCE_MS") {
            if let Ok(parsed) = debounce.parse::<u64>() {
                self.debounce_ms = parsed;
            }
        }
    }

    /// Debounce delay as a duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Where exports go
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Directory receiving `qrcode-<millis>.{png,svg}` files
    pub output_dir: PathBuf,
    /// Desktop clipboard tool
    pub clipboard: ClipboardBackend,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            clipboard: ClipboardBackend::Auto,
        }
    }
}

impl ExportOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("QFORGE_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(backend) = env::var("QFORGE_CLIPBOARD") {
            if let Some(parsed) = ClipboardBackend::parse(&backend) {
                self.clipboard = parsed;
            }
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QFORGE_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in terminal logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("QFORGE_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("QFORGE_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("QFORGE_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("QFORGE_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::parse(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
