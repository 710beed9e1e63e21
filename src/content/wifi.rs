//! WiFi network credential payloads (`WIFI:T:...;S:...;P:...;H:true;;`)

use serde::{Deserialize, Serialize};

const RESERVED: [char; 5] = ['\\', ';', ',', ':', '"'];

/// Authentication type advertised in the `T:` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WifiEncryption {
    /// WPA/WPA2/WPA3 personal
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    /// Legacy WEP
    #[serde(rename = "WEP")]
    Wep,
    /// Open network, no password
    #[serde(rename = "nopass")]
    NoPass,
}

impl WifiEncryption {
    /// Value written into the `T:` field
    pub fn as_str(self) -> &'static str {
        match self {
            WifiEncryption::Wpa => "WPA",
            WifiEncryption::Wep => "WEP",
            WifiEncryption::NoPass => "nopass",
        }
    }

    /// Parse from a user-provided string (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wpa" | "wpa2" | "wpa3" => Some(WifiEncryption::Wpa),
            "wep" => Some(WifiEncryption::Wep),
            "nopass" | "none" | "open" => Some(WifiEncryption::NoPass),
            _ => None,
        }
    }
}

/// WiFi mode fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiCredentials {
    /// Network name; trimmed before use
    pub ssid: String,
    /// Network password; used verbatim
    pub password: String,
    /// Authentication type
    pub encryption: WifiEncryption,
    /// Whether the network does not broadcast its SSID
    pub hidden: bool,
}

impl WifiCredentials {
    /// Build the credential string, or an empty string when the SSID is blank.
    pub fn payload(&self) -> String {
        let ssid = self.ssid.trim();
        if ssid.is_empty() {
            return String::new();
        }

        let mut payload = format!(
            "WIFI:T:{};S:{};",
            self.encryption.as_str(),
            escape_wifi(ssid)
        );
        if self.encryption != WifiEncryption::NoPass && !self.password.is_empty() {
            payload.push_str(&format!("P:{};", escape_wifi(&self.password)));
        }
        if self.hidden {
            payload.push_str("H:true;");
        }
        payload.push(';');
        payload
    }
}

/// Prefix every reserved character (`\ ; , : "`) with a backslash.
pub fn escape_wifi(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Reverse [`escape_wifi`]: a backslash makes the following character literal.
pub fn unescape_wifi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(ssid: &str, password: &str, encryption: WifiEncryption, hidden: bool) -> WifiCredentials {
        WifiCredentials {
            ssid: ssid.to_string(),
            password: password.to_string(),
            encryption,
            hidden,
        }
    }

    #[test]
    fn test_hidden_wpa_network_with_reserved_chars() {
        let wifi = creds("My;Net", "p@ss\"1", WifiEncryption::Wpa, true);
        assert_eq!(wifi.payload(), r#"WIFI:T:WPA;S:My\;Net;P:p@ss\"1;H:true;;"#);
    }

    #[test]
    fn test_blank_ssid_suppresses_payload() {
        assert_eq!(creds("", "secret", WifiEncryption::Wpa, false).payload(), "");
        assert_eq!(creds("   ", "secret", WifiEncryption::Wep, true).payload(), "");
    }

    #[test]
    fn test_nopass_omits_password() {
        let wifi = creds("Cafe", "ignored", WifiEncryption::NoPass, false);
        assert_eq!(wifi.payload(), "WIFI:T:nopass;S:Cafe;;");
    }

    #[test]
    fn test_empty_password_omitted() {
        let wifi = creds("Home", "", WifiEncryption::Wep, false);
        assert_eq!(wifi.payload(), "WIFI:T:WEP;S:Home;;");
    }

    #[test]
    fn test_ssid_trimmed_password_verbatim() {
        let wifi = creds("  Home ", " pw ", WifiEncryption::Wpa, false);
        assert_eq!(wifi.payload(), "WIFI:T:WPA;S:Home;P: pw ;;");
    }

    #[test]
    fn test_escape_all_reserved() {
        assert_eq!(escape_wifi(r#"a\b;c,d:e"f"#), r#"a\\b\;c\,d\:e\"f"#);
        assert_eq!(escape_wifi("plain"), "plain");
    }

    #[test]
    fn test_escape_round_trip() {
        let samples = [
            r#"\"#,
            r#"\\;;,,::"""#,
            "My;Net",
            r#"p@ss"1"#,
            "trailing\\",
            "ünï:cödé,",
            "",
        ];
        for original in samples {
            assert_eq!(unescape_wifi(&escape_wifi(original)), original, "{original}");
        }
    }

    #[test]
    fn test_encryption_parse() {
        assert_eq!(WifiEncryption::parse("wpa2"), Some(WifiEncryption::Wpa));
        assert_eq!(WifiEncryption::parse("WEP"), Some(WifiEncryption::Wep));
        assert_eq!(WifiEncryption::parse("nopass"), Some(WifiEncryption::NoPass));
        assert!(WifiEncryption::parse("radius").is_none());
    }
}
