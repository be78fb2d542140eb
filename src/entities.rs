//! Entity reference stripping and ampersand repair
//!
//! An entity reference is `&name;` or `&#digits;`. References are removed or
//! kept as a whole; a bare `&` is the only thing ever rewritten.

use regex::Regex;
use std::sync::OnceLock;

/// Remove every entity reference shaped `&(#?[A-Za-z0-9]+);`
///
/// Bare ampersands and sequences missing the terminating `;` are left alone.
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::entities::strip_entities;
///
/// assert_eq!(strip_entities("asdf &#12; "), "asdf  ");
/// assert_eq!(strip_entities("&&a;"), "&");
/// assert_eq!(strip_entities("a&#a"), "a&#a");
/// ```
pub fn strip_entities(text: &str) -> String {
    static ENTITY_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = ENTITY_REGEX.get_or_init(|| Regex::new(r"&#?[A-Za-z0-9]+;").ok());
    match regex {
        Some(regex) => regex.replace_all(text, "").into_owned(),
        None => text.to_string(),
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Length in bytes of the well-formed reference starting at `rest[0] == b'&'`
fn reference_len(rest: &[u8]) -> Option<usize> {
    let body = &rest[1..];
    let (digits_only, skip) = match body.first() {
        Some(b'#') => (true, 1),
        _ => (false, 0),
    };
    let name_len = body[skip..]
        .iter()
        .take_while(|&&b| {
            if digits_only {
                b.is_ascii_digit()
            } else {
                is_word_byte(b)
            }
        })
        .count();
    if name_len == 0 || body.get(skip + name_len) != Some(&b';') {
        return None;
    }
    Some(1 + skip + name_len + 1)
}

/// Rewrite ampersands that do not start an entity reference as `&amp;`
///
/// Named references use ASCII word characters (`&amp;`, `&x_1;`); numeric
/// references are decimal (`&#38;`). Anything else, such as `&#;`,
/// `&#4abc;` or `&#875 ;`, gets its ampersand encoded.
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::entities::fix_ampersands;
///
/// assert_eq!(fix_ampersands("&amp;"), "&amp;");
/// assert_eq!(fix_ampersands("&#;"), "&amp;#;");
/// assert_eq!(fix_ampersands("Tom & Jerry"), "Tom &amp; Jerry");
/// ```
pub fn fix_ampersands(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + 8);
    let mut copied = 0;
    let mut pos = 0;

    // Names never contain `&`, so each byte is inspected a bounded number of times.
    while let Some(offset) = text[pos..].find('&') {
        let amp = pos + offset;
        match reference_len(&bytes[amp..]) {
            Some(len) => pos = amp + len,
            None => {
                out.push_str(&text[copied..amp]);
                out.push_str("&amp;");
                pos = amp + 1;
                copied = pos;
            }
        }
    }
    out.push_str(&text[copied..]);
    out
}
