//! Character set resolution for fetched pages.
//!
//! Pages are fetched as raw bytes. The charset comes from the `Content-Type`
//! header when it carries one, then from a `<meta charset>` declaration near
//! the top of the document, and finally defaults to UTF-8.
//!
//! # Example
//!
//! ```rust
//! use gleaner_core::encoding::decode_html;
//!
//! let html = decode_html(b"<html><body>Caf\xE9</body></html>", Some("text/html; charset=iso-8859-1"));
//! assert!(html.contains("Café"));
//! ```

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Number of leading bytes scanned for a `<meta charset>` declaration.
pub const META_SNIFF_BYTES: usize = 1024;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"';\s]+)"#).unwrap());

static META_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta[^>]*charset=["']?([^"' >]+)"#).unwrap());

/// Extracts the charset label from a `Content-Type` header value.
pub fn charset_from_header(content_type: &str) -> Option<String> {
    HEADER_CHARSET
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|label| !label.is_empty())
}

/// Extracts the charset label declared by a `<meta>` tag in the first
/// [`META_SNIFF_BYTES`] of the document.
///
/// The prefix is read as Latin-1 so that any byte sequence can be scanned
/// without a decoding step.
pub fn charset_from_meta(bytes: &[u8]) -> Option<String> {
    let prefix: String = bytes.iter().take(META_SNIFF_BYTES).map(|&b| b as char).collect();

    META_CHARSET
        .captures(&prefix)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Determines the encoding for a page from its header and leading bytes.
///
/// Unknown labels resolve to UTF-8. A `<meta>` that claims UTF-16 is treated
/// as UTF-8, since a document readable enough to contain the declaration
/// cannot be UTF-16.
pub fn resolve_charset(content_type: Option<&str>, bytes: &[u8]) -> &'static Encoding {
    if let Some(label) = content_type.and_then(charset_from_header) {
        return Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
    }

    if let Some(label) = charset_from_meta(bytes) {
        let encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
        return if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
            UTF_8
        } else {
            encoding
        };
    }

    UTF_8
}

/// Decodes page bytes into text using the resolved charset.
///
/// Malformed input for the resolved charset falls back to lossy UTF-8
/// decoding of the original bytes. A byte order mark overrides any declared
/// charset.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = resolve_charset(content_type, bytes);
    let (text, used, had_errors) = encoding.decode(bytes);

    if had_errors && used != UTF_8 {
        tracing::warn!(
            charset = used.name(),
            "decoding with declared charset failed, falling back to utf-8"
        );
        return String::from_utf8_lossy(bytes).into_owned();
    }

    tracing::debug!(charset = used.name(), bytes = bytes.len(), "decoded page");
    text.into_owned()
}
