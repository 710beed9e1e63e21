//! Generation session: current input, render settings and the resulting code
//!
//! Nothing here is global. [`generate`] is a pure pipeline from input to
//! [`GeneratedCode`], and [`Session`] keeps the latest outcome so exports can
//! be handed the code explicitly.

mod debounce;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};

use crate::content::{ContentInput, ContentMode, WifiEncryption};
use crate::error::{Error, Result};
use crate::qr::{
    Color, ColorPreset, EncodingRequest, ErrorCorrection, ModuleGrid, QrEncoder, RasterSurface,
    RenderSettings,
};
use crate::vector::{VectorDocument, VectorReconstructor};

/// A successfully rendered code and everything needed to export it
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    request: EncodingRequest,
    surface: RasterSurface,
    grid: ModuleGrid,
}

impl GeneratedCode {
    /// The encoded content
    pub fn payload(&self) -> &str {
        &self.request.payload
    }

    /// The request this code was rendered from
    pub fn request(&self) -> &EncodingRequest {
        &self.request
    }

    /// Rendered raster
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// Module grid reported by the encoder
    pub fn grid(&self) -> &ModuleGrid {
        &self.grid
    }

    /// SVG document at the request's size and colors
    pub fn vector(&self) -> VectorDocument {
        VectorReconstructor::new(
            self.request.size,
            self.request.foreground,
            self.request.background,
        )
        .reconstruct(&self.grid)
    }
}

/// Build the payload for `input` and render it.
///
/// Returns [`Error::Input`] when the active mode lacks required fields, and
/// [`Error::Encoding`] when the encoder rejects the payload.
pub fn generate(
    input: &ContentInput,
    settings: &RenderSettings,
    encoder: &QrEncoder,
) -> Result<GeneratedCode> {
    let payload = input.payload();
    if payload.is_empty() {
        let mode = input.mode.map(ContentMode::as_str).unwrap_or("unset");
        return Err(Error::Input(format!("{mode} mode has nothing to encode")));
    }

    let request = settings.request(payload);
    let (surface, grid) = encoder.encode_with_grid(&request)?;

    Ok(GeneratedCode {
        request,
        surface,
        grid,
    })
}

/// What the display shows
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// No current code; export actions are disabled
    #[default]
    Placeholder,
    /// A code is displayed and can be exported
    Ready(GeneratedCode),
}

impl SessionState {
    /// The current code, if any
    pub fn code(&self) -> Option<&GeneratedCode> {
        match self {
            SessionState::Ready(code) => Some(code),
            SessionState::Placeholder => None,
        }
    }

    /// Whether PNG/SVG/clipboard export may be offered
    pub fn exports_enabled(&self) -> bool {
        matches!(self, SessionState::Ready(_))
    }
}

/// When an applied update should cause regeneration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// After the debounce quiet period (typed field edits)
    Debounced,
    /// Right away (mode, size, level and color changes)
    Immediate,
    /// Not at all (rejected color text)
    Ignored,
}

/// One user edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Switch the active mode; `None` for an unrecognised mode
    Mode(Option<ContentMode>),
    /// Text mode field
    Text(String),
    /// URL mode field
    Url(String),
    /// WiFi network name
    Ssid(String),
    /// WiFi password
    Password(String),
    /// WiFi authentication type
    Encryption(WifiEncryption),
    /// WiFi hidden flag
    Hidden(bool),
    /// Email recipient
    Address(String),
    /// Email subject
    Subject(String),
    /// Email body
    Body(String),
    /// Output size in pixels
    Size(u32),
    /// Error-correction level
    Level(ErrorCorrection),
    /// Foreground color text, applied only when it is valid hex
    Foreground(String),
    /// Background color text, applied only when it is valid hex
    Background(String),
    /// Named color preset
    Preset(String),
}

impl FieldUpdate {
    /// Parse a `field=value` line.
    pub fn parse(line: &str) -> Result<Self> {
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| Error::Other(format!("Expected field=value, got '{line}'")))?;
        let value = value.to_string();

        let update = match key.trim().to_ascii_lowercase().as_str() {
            "mode" => FieldUpdate::Mode(ContentMode::parse(&value)),
            "text" => FieldUpdate::Text(value),
            "url" => FieldUpdate::Url(value),
            "ssid" => FieldUpdate::Ssid(value),
            "password" => FieldUpdate::Password(value),
            "encryption" => FieldUpdate::Encryption(WifiEncryption::parse(&value).ok_or_else(
                || Error::Other(format!("Unknown encryption '{value}', use WPA, WEP or nopass")),
            )?),
            "hidden" => FieldUpdate::Hidden(parse_flag(&value)?),
            "email" | "address" => FieldUpdate::Address(value),
            "subject" => FieldUpdate::Subject(value),
            "body" => FieldUpdate::Body(value),
            "size" => FieldUpdate::Size(
                value
                    .trim()
                    .parse()
                    .map_err(|e| Error::Other(format!("Invalid size '{value}': {e}")))?,
            ),
            "level" => FieldUpdate::Level(ErrorCorrection::parse(&value).ok_or_else(|| {
                Error::Other(format!("Unknown level '{value}', use L, M, Q or H"))
            })?),
            "fg" | "foreground" => FieldUpdate::Foreground(value),
            "bg" | "background" => FieldUpdate::Background(value),
            "preset" => FieldUpdate::Preset(value),
            other => return Err(Error::Other(format!("Unknown field '{other}'"))),
        };

        Ok(update)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" | "" => Ok(false),
        other => Err(Error::Other(format!("Invalid flag '{other}'"))),
    }
}

/// Live input, render settings and the code they currently produce
#[derive(Debug, Clone)]
pub struct Session {
    input: ContentInput,
    settings: RenderSettings,
    encoder: QrEncoder,
    state: SessionState,
}

impl Session {
    /// Empty text-mode session
    pub fn new(settings: RenderSettings) -> Self {
        Self::with_input(ContentInput::with_mode(ContentMode::Text), settings)
    }

    /// Session starting from existing input
    pub fn with_input(input: ContentInput, settings: RenderSettings) -> Self {
        Self {
            input,
            settings,
            encoder: QrEncoder::new(),
            state: SessionState::Placeholder,
        }
    }

    /// Current field values
    pub fn input(&self) -> &ContentInput {
        &self.input
    }

    /// Current render settings
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// What the display shows
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The current code, if any
    pub fn current(&self) -> Option<&GeneratedCode> {
        self.state.code()
    }

    /// Whether export actions are enabled
    pub fn exports_enabled(&self) -> bool {
        self.state.exports_enabled()
    }

    /// Apply an edit and report when regeneration should follow.
    pub fn apply(&mut self, update: FieldUpdate) -> Trigger {
        match update {
            FieldUpdate::Mode(mode) => {
                self.input.mode = mode;
                Trigger::Immediate
            }
            FieldUpdate::Text(value) => {
                self.input.text = value;
                Trigger::Debounced
            }
            FieldUpdate::Url(value) => {
                self.input.url = value;
                Trigger::Debounced
            }
            FieldUpdate::Ssid(value) => {
                self.input.wifi.ssid = value;
                Trigger::Debounced
            }
            FieldUpdate::Password(value) => {
                self.input.wifi.password = value;
                Trigger::Debounced
            }
            FieldUpdate::Encryption(value) => {
                self.input.wifi.encryption = value;
                Trigger::Debounced
            }
            FieldUpdate::Hidden(value) => {
                self.input.wifi.hidden = value;
                Trigger::Debounced
            }
            FieldUpdate::Address(value) => {
                self.input.email.address = value;
                Trigger::Debounced
            }
            FieldUpdate::Subject(value) => {
                self.input.email.subject = value;
                Trigger::Debounced
            }
            FieldUpdate::Body(value) => {
                self.input.email.body = value;
                Trigger::Debounced
            }
            FieldUpdate::Size(size) => {
                self.settings.set_size(size);
                Trigger::Immediate
            }
            FieldUpdate::Level(level) => {
                self.settings.level = level;
                Trigger::Immediate
            }
            FieldUpdate::Foreground(text) => match Color::parse_hex(&text) {
                Ok(color) => {
                    self.settings.foreground = color;
                    Trigger::Immediate
                }
                Err(err) => {
                    tracing::debug!("Ignoring foreground '{text}': {err}");
                    Trigger::Ignored
                }
            },
            FieldUpdate::Background(text) => match Color::parse_hex(&text) {
                Ok(color) => {
                    self.settings.background = color;
                    Trigger::Immediate
                }
                Err(err) => {
                    tracing::debug!("Ignoring background '{text}': {err}");
                    Trigger::Ignored
                }
            },
            FieldUpdate::Preset(name) => match ColorPreset::find(&name) {
                Some(preset) => {
                    self.settings.foreground = preset.foreground;
                    self.settings.background = preset.background;
                    Trigger::Immediate
                }
                None => {
                    tracing::debug!("Ignoring unknown preset '{name}'");
                    Trigger::Ignored
                }
            },
        }
    }

    /// Rebuild the code from the current input, replacing the previous state.
    ///
    /// Insufficient input and encoder rejections both leave the session in the
    /// placeholder state.
    pub fn regenerate(&mut self) -> &SessionState {
        self.state = match generate(&self.input, &self.settings, &self.encoder) {
            Ok(code) => {
                tracing::debug!(
                    payload_bytes = code.payload().len(),
                    modules = code.grid().width(),
                    "Regenerated QR code"
                );
                SessionState::Ready(code)
            }
            Err(Error::Input(reason)) => {
                tracing::trace!("Showing placeholder: {reason}");
                SessionState::Placeholder
            }
            Err(err) if err.is_placeholder() => {
                tracing::warn!("QR generation error: {err}");
                SessionState::Placeholder
            }
            Err(err) => {
                tracing::error!("Failed to render QR code: {err}");
                SessionState::Placeholder
            }
        };
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_text() {
        let mut input = ContentInput::with_mode(ContentMode::Text);
        input.text = " hello ".into();
        let code = generate(&input, &RenderSettings::default(), &QrEncoder::new()).unwrap();
        assert_eq!(code.payload(), "hello");
        assert_eq!(code.surface().size(), 256);
        assert!(code.grid().is_valid_symbol_width());
    }

    #[test]
    fn test_generate_empty_is_input_error() {
        let input = ContentInput::with_mode(ContentMode::Wifi);
        let result = generate(&input, &RenderSettings::default(), &QrEncoder::new());
        assert!(matches!(result, Err(Error::Input(_))));
    }

    #[test]
    fn test_vector_rects_match_grid() {
        let mut input = ContentInput::with_mode(ContentMode::Url);
        input.url = "example.com/some/longer/path".into();
        let code = generate(&input, &RenderSettings::default(), &QrEncoder::new()).unwrap();
        let doc = code.vector();
        assert_eq!(doc.dark_rects(), code.grid().dark_count());
        assert_eq!(doc.total_size(), 256 + 32);
    }

    #[test]
    fn test_session_starts_without_exports() {
        let session = Session::new(RenderSettings::default());
        assert!(!session.exports_enabled());
        assert!(session.current().is_none());
    }

    #[test]
    fn test_session_regenerates_and_clears() {
        let mut session = Session::new(RenderSettings::default());
        assert_eq!(session.apply(FieldUpdate::Text("hi".into())), Trigger::Debounced);
        assert!(session.regenerate().exports_enabled());
        assert_eq!(session.current().unwrap().payload(), "hi");

        session.apply(FieldUpdate::Text("   ".into()));
        assert!(!session.regenerate().exports_enabled());
        assert!(session.current().is_none());
    }

    #[test]
    fn test_encoding_failure_discards_previous_code() {
        let mut session = Session::new(RenderSettings::default());
        session.apply(FieldUpdate::Text("fits".into()));
        session.regenerate();
        assert!(session.exports_enabled());

        session.apply(FieldUpdate::Level(ErrorCorrection::H));
        session.apply(FieldUpdate::Text("z".repeat(5000)));
        session.regenerate();
        assert!(!session.exports_enabled());
    }

    #[test]
    fn test_mode_switch_is_immediate() {
        let mut session = Session::new(RenderSettings::default());
        session.apply(FieldUpdate::Url("example.com".into()));
        assert_eq!(
            session.apply(FieldUpdate::Mode(Some(ContentMode::Url))),
            Trigger::Immediate
        );
        session.regenerate();
        assert_eq!(session.current().unwrap().payload(), "https://example.com");

        session.apply(FieldUpdate::Mode(None));
        assert!(!session.regenerate().exports_enabled());
    }

    #[test]
    fn test_invalid_color_text_is_ignored() {
        let mut session = Session::new(RenderSettings::default());
        assert_eq!(session.apply(FieldUpdate::Foreground("#12".into())), Trigger::Ignored);
        assert_eq!(session.settings().foreground, Color::BLACK);
        assert_eq!(
            session.apply(FieldUpdate::Foreground("#336699".into())),
            Trigger::Immediate
        );
        assert_eq!(session.settings().foreground.to_string(), "#336699");
    }

    #[test]
    fn test_preset_sets_both_colors() {
        let mut session = Session::new(RenderSettings::default());
        assert_eq!(session.apply(FieldUpdate::Preset("inverted".into())), Trigger::Immediate);
        assert_eq!(session.settings().foreground, Color::WHITE);
        assert_eq!(session.settings().background, Color::BLACK);
        assert_eq!(session.apply(FieldUpdate::Preset("neon".into())), Trigger::Ignored);
    }

    #[test]
    fn test_parse_field_updates() {
        assert_eq!(
            FieldUpdate::parse("ssid=My;Net").unwrap(),
            FieldUpdate::Ssid("My;Net".into())
        );
        assert_eq!(
            FieldUpdate::parse("text=a=b").unwrap(),
            FieldUpdate::Text("a=b".into())
        );
        assert_eq!(FieldUpdate::parse("hidden=true").unwrap(), FieldUpdate::Hidden(true));
        assert_eq!(FieldUpdate::parse("size=512").unwrap(), FieldUpdate::Size(512));
        assert_eq!(
            FieldUpdate::parse("level=h").unwrap(),
            FieldUpdate::Level(ErrorCorrection::H)
        );
        assert_eq!(FieldUpdate::parse("mode=sms").unwrap(), FieldUpdate::Mode(None));
        assert!(FieldUpdate::parse("colour=#fff").is_err());
        assert!(FieldUpdate::parse("size=big").is_err());
        assert!(FieldUpdate::parse("no equals sign").is_err());
    }

    #[test]
    fn test_size_update_is_clamped() {
        let mut session = Session::new(RenderSettings::default());
        session.apply(FieldUpdate::Size(4096));
        assert_eq!(session.settings().size, crate::qr::MAX_SIZE);
    }
}
