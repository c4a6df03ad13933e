use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use scraper::Html;
use tracing::warn;

/// Saved page dumps commonly carry a Windows single-byte encoding despite a
/// utf-8 declaration; Latin-1 decodes any byte sequence.
const FALLBACK_ENCODING: &str = "latin-1";

#[derive(Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// Declared encoding name is not one we can decode.
    Unsupported(String),
    /// Both the declared encoding and the locale-default fallback failed.
    Undecodable { declared: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Unsupported(name) => write!(f, "unsupported encoding '{}'", name),
            DecodeError::Undecodable { declared } => write!(
                f,
                "could not decode input as '{}' or as fallback '{}'",
                declared, FALLBACK_ENCODING
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Read a saved page and parse it into a traversable node tree.
pub fn load(path: &Path, declared_encoding: &str) -> Result<Html> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading '{}'", path.display()))?;
    let text = decode(&bytes, declared_encoding)?;
    Ok(Html::parse_document(&text))
}

/// Decode raw markup bytes under the declared encoding, retrying once under
/// the locale-default encoding before giving up.
pub fn decode(bytes: &[u8], declared: &str) -> Result<String, DecodeError> {
    match decode_as(bytes, declared)? {
        Some(text) => Ok(text),
        None => {
            warn!(
                "decode under '{}' failed, retrying with '{}'",
                declared, FALLBACK_ENCODING
            );
            decode_as(bytes, FALLBACK_ENCODING)?.ok_or(DecodeError::Undecodable {
                declared: declared.to_string(),
            })
        }
    }
}

/// Ok(None) means the encoding is known but the bytes do not conform.
fn decode_as(bytes: &[u8], encoding: &str) -> Result<Option<String>, DecodeError> {
    match encoding.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Ok(String::from_utf8(bytes.to_vec()).ok()),
        // Total mapping: every byte is a valid Latin-1 code point.
        "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => {
            Ok(Some(bytes.iter().map(|&b| b as char).collect()))
        }
        other => Err(DecodeError::Unsupported(other.to_string())),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_roundtrip() {
        assert_eq!(decode("héllo".as_bytes(), "utf-8").unwrap(), "héllo");
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        // 0xE9 is 'é' in Latin-1 but an invalid standalone byte in utf-8
        let bytes = b"caf\xe9";
        assert_eq!(decode(bytes, "utf-8").unwrap(), "café");
    }

    #[test]
    fn latin1_declared_directly() {
        assert_eq!(decode(b"\xdcber", "iso-8859-1").unwrap(), "Über");
    }

    #[test]
    fn unknown_encoding_is_fatal() {
        let err = decode(b"text", "shift-jis").unwrap_err();
        assert_eq!(err, DecodeError::Unsupported("shift-jis".to_string()));
    }

    #[test]
    fn parses_into_node_tree() {
        let doc = Html::parse_document(&decode(b"<ul><li>item</li></ul>", "utf-8").unwrap());
        let sel = scraper::Selector::parse("li").unwrap();
        assert_eq!(doc.select(&sel).count(), 1);
    }
}
