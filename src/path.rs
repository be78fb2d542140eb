//! Request-path decoding with percent-escape fallback
//!
//! A request path arrives as raw bytes. [`try_decode_path`] is the strict
//! check callers use to reject malformed wire paths with a 400.
//! [`decode_path`] never fails: byte runs the encoding cannot decode are
//! replaced by their `%XX` escapes and decoding continues, so the result is
//! always text and the original bytes stay recoverable.
//!
//! # Examples
//!
//! ```rust
//! use markup_sanitizer::path::{decode_path, escape_uri_path};
//!
//! let text = decode_path(b"/\xED", encoding_rs::UTF_8);
//! assert_eq!(text, "/%ED");
//! assert_eq!(escape_uri_path(&text), "/%25ED");
//! ```

use encoding_rs::{DecoderResult, Encoding};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};

use crate::error::SanitizerError;

/// Bytes escaped by [`escape_uri_path`]: everything except
/// `[A-Za-z0-9_.-]` and `/:@&+$,!*'()`
const PATH_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'/')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Resolve a charset label such as `"utf-8"` or `"latin1"`
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::path::encoding_for_label;
///
/// assert_eq!(encoding_for_label("utf8").unwrap(), encoding_rs::UTF_8);
/// assert!(encoding_for_label("no-such-charset").is_err());
/// ```
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, SanitizerError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| SanitizerError::UnknownEncoding(label.to_string()))
}

/// Decode `raw` strictly, failing on the first malformed byte sequence
///
/// # Errors
///
/// Returns [`SanitizerError::InvalidPath`] with the offset of the first
/// byte that does not decode under `encoding`.
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::path::try_decode_path;
///
/// assert_eq!(try_decode_path(b"/ok", encoding_rs::UTF_8).unwrap(), "/ok");
/// assert!(try_decode_path(b"\xED", encoding_rs::UTF_8).is_err());
/// ```
pub fn try_decode_path(raw: &[u8], encoding: &'static Encoding) -> Result<String, SanitizerError> {
    if encoding == encoding_rs::UTF_8 {
        return std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|e| SanitizerError::InvalidPath {
                position: e.valid_up_to(),
                encoding: encoding.name(),
            });
    }

    if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(raw) {
        return Ok(text.into_owned());
    }

    let (_, first_malformed) = decode_escaping_malformed(raw, encoding);
    Err(SanitizerError::InvalidPath {
        position: first_malformed.unwrap_or(0),
        encoding: encoding.name(),
    })
}

/// Decode `raw`, percent-escaping byte runs that do not decode
///
/// Valid text is returned as-is, including any literal `%` it contains;
/// [`escape_uri_path`] makes the two distinguishable for display.
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::path::decode_path;
///
/// assert_eq!(decode_path(b"/\xE2\x99\xE2\x99\xA5/", encoding_rs::UTF_8), "/%E2%99\u{2665}/");
/// assert_eq!(decode_path(b"caf\xC3\xA9", encoding_rs::UTF_8), "café");
/// ```
pub fn decode_path(raw: &[u8], encoding: &'static Encoding) -> String {
    match try_decode_path(raw, encoding) {
        Ok(text) => text,
        Err(err) => {
            tracing::debug!(error = %err, "path is not valid text, escaping malformed bytes");
            decode_escaping_malformed(raw, encoding).0
        }
    }
}

/// Streaming decode that writes `%XX` for every malformed byte
///
/// Also returns the offset of the first malformed byte, if any.
fn decode_escaping_malformed(raw: &[u8], encoding: &'static Encoding) -> (String, Option<usize>) {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut out = String::with_capacity(raw.len());
    let mut first_malformed = None;
    let mut consumed = 0;

    loop {
        let remaining = raw.len() - consumed;
        let needed = decoder
            .max_utf8_buffer_length_without_replacement(remaining)
            .unwrap_or_else(|| remaining.saturating_mul(3));
        out.reserve(needed.max(16));

        let (result, read) =
            decoder.decode_to_string_without_replacement(&raw[consumed..], &mut out, true);
        consumed += read;

        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::OutputFull => continue,
            DecoderResult::Malformed(bad, extra) => {
                // Offsets are global: `consumed` counts every byte handed to the decoder.
                let end = consumed.saturating_sub(usize::from(extra));
                let start = end.saturating_sub(usize::from(bad));
                first_malformed.get_or_insert(start);
                out.extend(percent_encode(&raw[start..end], NON_ALPHANUMERIC));
            }
        }
    }

    (out, first_malformed)
}

/// Percent-encode a decoded path for display in diagnostics
///
/// Non-ASCII text is encoded as UTF-8 bytes and `%` itself becomes `%25`,
/// so an escape produced by [`decode_path`] stays distinguishable from
/// text that decoded cleanly.
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::path::escape_uri_path;
///
/// assert_eq!(escape_uri_path("/~%A9helloworld"), "/%7E%25A9helloworld");
/// assert_eq!(escape_uri_path("/\u{2665}/"), "/%E2%99%A5/");
/// ```
pub fn escape_uri_path(path: &str) -> String {
    percent_encode(path.as_bytes(), PATH_ESCAPE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;
    use proptest::prelude::*;

    fn unquote(wire: &str) -> Vec<u8> {
        percent_decode_str(wire).collect()
    }

    fn display(wire: &str) -> String {
        let decoded = decode_path(&unquote(wire), encoding_rs::UTF_8);
        escape_uri_path(&decoded)
    }

    #[test]
    fn test_lone_invalid_byte_becomes_escape() {
        assert_eq!(decode_path(b"\xED", encoding_rs::UTF_8), "%ED");
    }

    #[test]
    fn test_strict_decode_reports_position() {
        let err = try_decode_path(b"/abc\xED", encoding_rs::UTF_8).unwrap_err();
        assert_eq!(
            err,
            SanitizerError::InvalidPath {
                position: 4,
                encoding: "UTF-8"
            }
        );
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_display_of_broken_percent_sequences() {
        assert_eq!(display("/~%A9helloworld"), "/%7E%25A9helloworld");
        assert_eq!(
            display("/d%aao%aaw%aan%aal%aao%aaa%aad%aa"),
            "/d%25AAo%25AAw%25AAn%25AAl%25AAo%25AAa%25AAd%25AA"
        );
        assert_eq!(display("/%E2%99%E2%99%A5/"), "/%25E2%2599%E2%99%A5/");
        assert_eq!(
            display("/%E2%98%8E%E2%A9%E2%99%A5/"),
            "/%E2%98%8E%25E2%25A9%E2%99%A5/"
        );
    }

    #[test]
    fn test_valid_multibyte_path_is_text() {
        let raw = unquote("/%E2%A8%87%87%A5%E2%A8%A0");
        let decoded = decode_path(&raw, encoding_rs::UTF_8);
        assert!(decoded.starts_with("/\u{2A07}"));
        assert!(decoded.contains("%87%A5"));
    }

    #[test]
    fn test_single_byte_encoding_never_fails() {
        let latin1 = encoding_for_label("latin1").unwrap();
        assert_eq!(try_decode_path(b"/caf\xE9", latin1).unwrap(), "/café");
    }

    #[test]
    fn test_multibyte_legacy_encoding_escapes_invalid_lead() {
        let sjis = encoding_for_label("shift_jis").unwrap();
        assert!(try_decode_path(b"a\xFFb", sjis).is_err());
        assert_eq!(decode_path(b"a\xFFb", sjis), "a%FFb");
    }

    #[test]
    fn test_escape_uri_path_uses_uppercase_hex() {
        assert_eq!(escape_uri_path("/a b~%"), "/a%20b%7E%25");
        assert_eq!(escape_uri_path("/x:@&+$,!*'()"), "/x:@&+$,!*'()");
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(
            encoding_for_label("klingon"),
            Err(SanitizerError::UnknownEncoding("klingon".to_string()))
        );
    }

    proptest! {
        #[test]
        fn prop_decode_path_never_panics_and_round_trips(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            prop_assume!(!bytes.contains(&b'%'));
            let decoded = decode_path(&bytes, encoding_rs::UTF_8);
            let mut recovered = Vec::new();
            for chunk in decoded.split('%').enumerate() {
                match chunk {
                    (0, text) => recovered.extend_from_slice(text.as_bytes()),
                    (_, rest) => {
                        recovered.extend(unquote(&format!("%{}", &rest[..2])));
                        recovered.extend_from_slice(rest[2..].as_bytes());
                    }
                }
            }
            prop_assert_eq!(recovered, bytes);
        }

        #[test]
        fn prop_valid_utf8_is_unchanged(text in "\\PC{0,32}") {
            prop_assert_eq!(decode_path(text.as_bytes(), encoding_rs::UTF_8), text);
        }
    }
}
