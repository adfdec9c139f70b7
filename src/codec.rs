//! Text encoding for arbitrary named charsets.
//!
//! UTF-8 is handled natively. Every other label is resolved through the
//! WHATWG label table of `encoding_rs`; unknown labels, and labels
//! `encoding_rs` cannot handle in the required direction, fall back to
//! UTF-8 with a `warn` event instead of failing the call.

use crate::constants::{REQUEST_DEFAULT_CHARSET, RESPONSE_DEFAULT_CHARSET};
use encoding_rs::{Encoding, REPLACEMENT, UTF_8};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::warn;

/// A resolved charset: the label to advertise on the wire plus its encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    label: Cow<'static, str>,
    encoding: &'static Encoding,
}

impl Charset {
    pub const UTF8: Charset = Charset {
        label: Cow::Borrowed(REQUEST_DEFAULT_CHARSET),
        encoding: UTF_8,
    };

    /// Resolves a charset label for decoding, falling back to UTF-8 when it
    /// is unknown.
    ///
    /// `None`, the empty string, `utf-8` and `utf8` (any case) all mean
    /// UTF-8. Labels that map to the WHATWG replacement encoding (such as
    /// `iso-2022-kr`) would turn a whole body into one U+FFFD and are
    /// treated as unknown.
    pub fn resolve(label: Option<&str>) -> Self {
        Self::lookup(label, |encoding| encoding != REPLACEMENT)
    }

    /// Resolves a charset label for encoding request bodies.
    ///
    /// Only encodings `encoding_rs` can also write are accepted. UTF-16
    /// labels and the replacement labels encode to UTF-8, so advertising
    /// them on the wire would mislabel the body; they fall back to UTF-8.
    pub fn resolve_for_encoding(label: Option<&str>) -> Self {
        Self::lookup(label, |encoding| encoding.output_encoding() == encoding)
    }

    fn lookup(label: Option<&str>, usable: impl Fn(&'static Encoding) -> bool) -> Self {
        let Some(raw) = label.map(str::trim).filter(|l| !l.is_empty()) else {
            return Self::UTF8;
        };
        if raw.eq_ignore_ascii_case("utf-8") || raw.eq_ignore_ascii_case("utf8") {
            return Self::UTF8;
        }
        match Encoding::for_label(raw.as_bytes()).filter(|encoding| usable(*encoding)) {
            Some(encoding) => Self {
                label: Cow::Owned(raw.to_ascii_lowercase()),
                encoding,
            },
            None => {
                warn!(charset = raw, fallback = "utf-8", "unsupported charset, falling back");
                Self::UTF8
            }
        }
    }

    /// The label as requested by the caller, lowercased.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_utf8(&self) -> bool {
        self.encoding == UTF_8
    }

    pub fn encode(&self, text: &str) -> Vec<u8> {
        if self.is_utf8() {
            return text.as_bytes().to_vec();
        }
        let (bytes, _, _) = self.encoding.encode(text);
        bytes.into_owned()
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _) = self.encoding.decode_with_bom_removal(bytes);
        text.into_owned()
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::UTF8
    }
}

pub fn encode(text: &str, charset: Option<&str>) -> Vec<u8> {
    Charset::resolve_for_encoding(charset).encode(text)
}

pub fn decode(bytes: &[u8], charset: Option<&str>) -> String {
    Charset::resolve(charset).decode(bytes)
}

/// Extracts the `charset=` parameter from a `Content-Type` header value.
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r"(?i)charset=([^;]+)").ok())
        .as_ref()?;
    re.captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
}

/// Charset to decode a response body with, given its `Content-Type`.
pub fn response_charset(content_type: Option<&str>) -> Charset {
    let label = content_type
        .and_then(charset_from_content_type)
        .unwrap_or_else(|| RESPONSE_DEFAULT_CHARSET.to_string());
    Charset::resolve(Some(&label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[test]
    fn utf8_aliases_resolve_natively() {
        for label in [None, Some(""), Some("  "), Some("UTF-8"), Some("utf8")] {
            assert_eq!(Charset::resolve(label), Charset::UTF8);
        }
    }

    #[test]
    fn latin1_encodes_single_bytes() {
        assert_eq!(encode("für", Some("ISO-8859-1")), vec![b'f', 0xFC, b'r']);
        assert_eq!(decode(&[b'f', 0xFC, b'r'], Some("windows-1252")), "für");
    }

    #[test]
    fn resolve_keeps_requested_label() {
        assert_eq!(Charset::resolve(Some("ISO-8859-1")).label(), "iso-8859-1");
    }

    #[test]
    fn unknown_charset_falls_back_to_utf8() {
        let charset = Charset::resolve(Some("x-not-a-charset"));
        assert_eq!(charset, Charset::UTF8);
        assert_eq!(charset.encode("ü"), "ü".as_bytes());
    }

    #[test]
    fn utf16_is_not_used_for_request_bodies() {
        let charset = Charset::resolve_for_encoding(Some("UTF-16LE"));
        assert_eq!(charset, Charset::UTF8);
        assert_eq!(charset.label(), "utf-8");
        assert_eq!(encode("ab", Some("utf-16be")), b"ab".to_vec());

        // decoding UTF-16 is fine
        let decoding = Charset::resolve(Some("utf-16le"));
        assert_eq!(decoding.label(), "utf-16le");
        assert_eq!(decoding.decode(&[b'a', 0, b'b', 0]), "ab");
    }

    #[test]
    fn replacement_labels_fall_back_to_utf8() {
        for label in ["iso-2022-kr", "hz-gb-2312", "csiso2022kr"] {
            assert_eq!(Charset::resolve(Some(label)), Charset::UTF8);
            assert_eq!(Charset::resolve_for_encoding(Some(label)), Charset::UTF8);
        }
        assert_eq!(
            decode(b"<html>hi</html>", Some("iso-2022-kr")),
            "<html>hi</html>"
        );
        assert_eq!(
            response_charset(Some("text/html; charset=iso-2022-kr")).decode(b"<p>ok</p>"),
            "<p>ok</p>"
        );
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(f: impl FnOnce()) -> String {
        let sink = Captured::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = sink.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn fallback_emits_a_warning() {
        let logs = captured_logs(|| {
            Charset::resolve(Some("x-not-a-charset"));
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("unsupported charset"), "{logs}");
        assert!(logs.contains("charset=\"x-not-a-charset\""), "{logs}");

        let logs = captured_logs(|| {
            Charset::resolve_for_encoding(Some("utf-16le"));
        });
        assert!(logs.contains("charset=\"utf-16le\""), "{logs}");
    }

    #[test]
    fn supported_charsets_log_nothing() {
        let logs = captured_logs(|| {
            Charset::resolve(Some("windows-1252"));
            Charset::resolve_for_encoding(Some("iso-8859-1"));
        });
        assert_eq!(logs, "");
    }

    #[test]
    fn charset_is_parsed_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; CHARSET=iso-8859-1; foo=bar"),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn response_charset_defaults_to_windows_1252() {
        assert_eq!(response_charset(None).label(), "windows-1252");
        assert_eq!(response_charset(Some("text/html")).label(), "windows-1252");
        assert!(response_charset(Some("text/html; charset=UTF-8")).is_utf8());
    }
}
