//! Payload construction for each input mode
//!
//! Every mode turns its raw field values into the exact string handed to the
//! QR encoder. An empty payload means the input is insufficient and no code
//! should be generated.

mod email;
mod wifi;

pub use email::{EmailDraft, encode_component};
pub use wifi::{WifiCredentials, WifiEncryption, escape_wifi, unescape_wifi};

use serde::{Deserialize, Serialize};

/// Input mode selecting which fields feed the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// Free-form text
    Text,
    /// Web address, `https://` is added when no protocol is given
    Url,
    /// WiFi network credentials
    Wifi,
    /// `mailto:` link with optional subject and body
    Email,
}

impl ContentMode {
    /// Canonical name used in configuration and the interactive session
    pub fn as_str(self) -> &'static str {
        match self {
            ContentMode::Text => "text",
            ContentMode::Url => "url",
            ContentMode::Wifi => "wifi",
            ContentMode::Email => "email",
        }
    }

    /// Parse a mode name (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(ContentMode::Text),
            "url" => Some(ContentMode::Url),
            "wifi" => Some(ContentMode::Wifi),
            "email" | "mail" => Some(ContentMode::Email),
            _ => None,
        }
    }
}

/// Raw field values for every mode plus the active mode
///
/// Fields of inactive modes are kept so switching back restores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentInput {
    /// Active mode; `None` yields an empty payload
    pub mode: Option<ContentMode>,
    /// Text mode field
    pub text: String,
    /// URL mode field
    pub url: String,
    /// WiFi mode fields
    pub wifi: WifiCredentials,
    /// Email mode fields
    pub email: EmailDraft,
}

impl ContentInput {
    /// Input with the given mode active and all fields empty
    pub fn with_mode(mode: ContentMode) -> Self {
        Self {
            mode: Some(mode),
            ..Default::default()
        }
    }

    /// Build the payload for the active mode, empty when input is insufficient.
    pub fn payload(&self) -> String {
        match self.mode {
            Some(ContentMode::Text) => text_payload(&self.text),
            Some(ContentMode::Url) => url_payload(&self.url),
            Some(ContentMode::Wifi) => self.wifi.payload(),
            Some(ContentMode::Email) => self.email.payload(),
            None => String::new(),
        }
    }

    /// Length of the raw text field in UTF-16 code units, as a browser text
    /// field reports it
    pub fn char_count(&self) -> usize {
        self.text.encode_utf16().count()
    }
}

/// Text mode payload: the trimmed text.
pub fn text_payload(raw: &str) -> String {
    raw.trim().to_string()
}

/// URL mode payload: the trimmed address with `https://` prepended when it
/// carries no `http://` or `https://` prefix.
pub fn url_payload(raw: &str) -> String {
    let url = raw.trim();
    if url.is_empty() || has_http_scheme(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|prefix| {
        url.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}
