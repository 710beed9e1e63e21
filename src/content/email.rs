//! `mailto:` link payloads

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters left untouched by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Email mode fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailDraft {
    /// Recipient address (required)
    pub address: String,
    /// Optional subject line
    pub subject: String,
    /// Optional message body
    pub body: String,
}

impl EmailDraft {
    /// Build the `mailto:` URI, or an empty string when the address is blank.
    ///
    /// Subject and body are trimmed, percent-encoded and appended in that order
    /// when non-empty.
    pub fn payload(&self) -> String {
        let address = self.address.trim();
        if address.is_empty() {
            return String::new();
        }

        let params: Vec<String> = [("subject", self.subject.trim()), ("body", self.body.trim())]
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{key}={}", encode_component(value)))
            .collect();

        if params.is_empty() {
            format!("mailto:{address}")
        } else {
            format!("mailto:{address}?{}", params.join("&"))
        }
    }
}

/// Percent-encode a URI component the way browsers' `encodeURIComponent` does.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}
