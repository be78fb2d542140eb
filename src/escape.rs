//! Character-level escaping for HTML and JavaScript contexts
//!
//! Both functions are single-pass substitutions over the input's code
//! points. Replacement text is written straight to the output buffer and is
//! never rescanned, so `&` introduced by a substitution cannot be escaped a
//! second time.
//!
//! # Examples
//!
//! ```rust
//! use markup_sanitizer::escape::{escape, escapejs};
//!
//! assert_eq!(escape("<&"), "&lt;&amp;");
//! assert_eq!(escapejs("</script>"), "\\u003C/script\\u003E");
//! ```

use std::fmt::Write;

/// Escape the five HTML-reserved characters
///
/// | Input | Output   |
/// |-------|----------|
/// | `&`   | `&amp;`  |
/// | `<`   | `&lt;`   |
/// | `>`   | `&gt;`   |
/// | `"`   | `&quot;` |
/// | `'`   | `&#39;`  |
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::escape::escape;
///
/// assert_eq!(escape("a < b"), "a &lt; b");
/// assert_eq!(escape("&amp;"), "&amp;amp;");
/// ```
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn needs_js_escape(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '\'' | '"' | '<' | '>' | '&' | '=' | '-' | ';' | '\u{2028}' | '\u{2029}'
    ) || (ch as u32) < 0x20
}

/// Escape text for embedding inside a quoted JavaScript string
///
/// Every escaped code point is written as exactly six characters: `\u`
/// followed by four uppercase hex digits. Covered: backslash, both quote
/// characters, `<`, `>`, `&`, `=`, `-`, `;`, all C0 control characters
/// (including CR, LF, tab, vertical tab, form feed and backspace) and the
/// line/paragraph separators U+2028 and U+2029.
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::escape::escapejs;
///
/// assert_eq!(escapejs("\"hi\""), "\\u0022hi\\u0022");
/// assert_eq!(escapejs("a\r\nb"), "a\\u000D\\u000Ab");
/// ```
pub fn escapejs(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if needs_js_escape(ch) {
            // Writing into a String cannot fail.
            let _ = write!(out, "\\u{:04X}", ch as u32);
        } else {
            out.push(ch);
        }
    }
    out
}
