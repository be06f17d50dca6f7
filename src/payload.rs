//! WiFi credential payloads in the `WIFI:` scanner grammar
//!
//! Phones recognise `WIFI:T:WPA;S:<ssid>;P:<password>;;` and offer to join
//! the network. Inside the `S` and `P` values the characters `\`, `;`, `:`
//! and `,` must be backslash-escaped.

use serde::{Deserialize, Serialize};

/// Security type written into every payload.
pub const SECURITY_TYPE: &str = "WPA";

/// Network credentials printed on a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Network name (SSID)
    pub network_name: String,
    /// Network password
    pub password: String,
}

impl Credential {
    /// Create a credential pair, passed through verbatim
    pub fn new(network_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            network_name: network_name.into(),
            password: password.into(),
        }
    }

    /// Encode these credentials as a scanner payload
    pub fn payload(&self) -> String {
        encode(&self.network_name, &self.password)
    }
}

/// Build the payload text for a network name and password.
pub fn encode(name: &str, password: &str) -> String {
    format!(
        "WIFI:T:{SECURITY_TYPE};S:{};P:{};;",
        escape_field(name),
        escape_field(password)
    )
}

/// Escape a single payload value.
///
/// The backslash replacement runs first so the escapes added for the other
/// characters are not escaped a second time.
pub fn escape_field(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(':', "\\:")
        .replace(',', "\\,")
}

/// Reverse [`escape_field`]: every `\x` becomes `x`.
pub fn unescape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a `WIFI:` payload back into credentials.
///
/// Fields may appear in any order; unknown fields are ignored. Returns `None`
/// when the text is not a WIFI payload or lacks the `S` field.
pub fn parse(payload: &str) -> Option<Credential> {
    let body = payload.strip_prefix("WIFI:")?;

    let mut name = None;
    let mut password = String::new();
    for field in split_unescaped(body, ';') {
        if field.is_empty() {
            continue;
        }
        let (key, value) = field.split_once(':')?;
        match key {
            "S" => name = Some(unescape_field(value)),
            "P" => password = unescape_field(value),
            _ => {}
        }
    }

    Some(Credential {
        network_name: name?,
        password,
    })
}

fn split_unescaped(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (idx, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == separator {
            parts.push(&text[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_credentials() {
        assert_eq!(
            encode("HomeNet", "s3cr3t!"),
            "WIFI:T:WPA;S:HomeNet;P:s3cr3t!;;"
        );
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        assert_eq!(
            encode("Cafe;Free", "pa:ss,w\\ord"),
            "WIFI:T:WPA;S:Cafe\\;Free;P:pa\\:ss\\,w\\\\ord;;"
        );
    }

    #[test]
    fn test_backslash_escaped_before_semicolon() {
        assert_eq!(escape_field("a\\;b"), "a\\\\\\;b");
    }

    #[test]
    fn test_empty_credentials() {
        assert_eq!(encode("", ""), "WIFI:T:WPA;S:;P:;;");
        assert_eq!(parse("WIFI:T:WPA;S:;P:;;"), Some(Credential::new("", "")));
    }

    #[test]
    fn test_parse_inverts_encode() {
        let inputs = [
            ("HomeNet", "s3cr3t!"),
            ("Cafe;Free", "pa:ss,w\\ord"),
            ("\\\\;;::,,", "trailing\\"),
            ("Grüße Wlan", "naïve café"),
            ("a\\;b", ";"),
        ];
        for (name, password) in inputs {
            let payload = encode(name, password);
            assert!(payload.starts_with("WIFI:T:WPA;S:"));
            assert!(payload.ends_with(";;"));
            assert_eq!(parse(&payload), Some(Credential::new(name, password)));
        }
    }

    #[test]
    fn test_parse_field_order() {
        let parsed = parse("WIFI:P:pw;S:net;T:WPA;H:false;;").unwrap();
        assert_eq!(parsed, Credential::new("net", "pw"));
    }

    #[test]
    fn test_parse_rejects_other_payloads() {
        assert!(parse("https://example.com").is_none());
        assert!(parse("WIFI:T:WPA;P:only;;").is_none());
    }
}
