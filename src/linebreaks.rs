//! Paragraph and line-break markup
//!
//! Text is first normalized to `\n` line endings. Runs of two or more
//! newlines separate paragraphs; a single newline inside a paragraph becomes
//! `<br />`.

use regex::Regex;
use std::sync::OnceLock;

use crate::escape::escape;

/// Convert `\r\n` and lone `\r` into `\n`
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::linebreaks::normalize_newlines;
///
/// assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
/// ```
pub fn normalize_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            chars.next_if_eq(&'\n');
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    out
}

fn paragraphs(text: &str) -> Vec<String> {
    let normalized = normalize_newlines(text);
    static PARAGRAPH_BREAK_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = PARAGRAPH_BREAK_REGEX.get_or_init(|| Regex::new(r"\n{2,}").ok());
    match regex {
        Some(regex) => regex.split(&normalized).map(str::to_string).collect(),
        None => vec![normalized],
    }
}

fn render(paras: impl Iterator<Item = String>) -> String {
    paras
        .map(|p| format!("<p>{}</p>", p.replace('\n', "<br />")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Wrap paragraphs in `<p>` and turn single line breaks into `<br />`
///
/// Tabs and other whitespace are kept as they are. The input is not
/// escaped; see [`linebreaks_escaped`].
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::linebreaks::linebreaks;
///
/// assert_eq!(linebreaks("para1\n\npara2"), "<p>para1</p>\n\n<p>para2</p>");
/// assert_eq!(linebreaks("a\nb"), "<p>a<br />b</p>");
/// ```
pub fn linebreaks(text: &str) -> String {
    render(paragraphs(text).into_iter())
}

/// Like [`linebreaks`], but HTML-escapes each paragraph before wrapping it
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::linebreaks::linebreaks_escaped;
///
/// assert_eq!(linebreaks_escaped("a < b\nc"), "<p>a &lt; b<br />c</p>");
/// ```
pub fn linebreaks_escaped(text: &str) -> String {
    render(paragraphs(text).into_iter().map(|p| escape(&p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_linebreaks_table() {
        let items = [
            (
                "para1\n\npara2\r\rpara3",
                "<p>para1</p>\n\n<p>para2</p>\n\n<p>para3</p>",
            ),
            (
                "para1\nsub1\rsub2\n\npara2",
                "<p>para1<br />sub1<br />sub2</p>\n\n<p>para2</p>",
            ),
            (
                "para1\r\n\r\npara2\rsub1\r\rpara4",
                "<p>para1</p>\n\n<p>para2<br />sub1</p>\n\n<p>para4</p>",
            ),
            ("para1\tmore\n\npara2", "<p>para1\tmore</p>\n\n<p>para2</p>"),
        ];
        for (value, output) in items {
            assert_eq!(linebreaks(value), output, "input: {value:?}");
        }
    }

    #[test]
    fn test_linebreaks_collapses_long_breaks() {
        assert_eq!(linebreaks("a\n\n\n\nb"), "<p>a</p>\n\n<p>b</p>");
    }

    #[test]
    fn test_linebreaks_empty_input() {
        assert_eq!(linebreaks(""), "<p></p>");
    }

    #[test]
    fn test_linebreaks_escaped_escapes_markup() {
        assert_eq!(
            linebreaks_escaped("<b>x</b>\n\n&"),
            "<p>&lt;b&gt;x&lt;/b&gt;</p>\n\n<p>&amp;</p>"
        );
    }

    proptest! {
        #[test]
        fn prop_normalized_text_has_no_carriage_returns(text in "[a-z\r\n]{0,64}") {
            prop_assert!(!normalize_newlines(&text).contains('\r'));
        }

        #[test]
        fn prop_paragraph_count_matches_breaks(parts in prop::collection::vec("[a-z]{1,8}", 1..8)) {
            let html = linebreaks(&parts.join("\r\n\r\n"));
            prop_assert_eq!(html.matches("<p>").count(), parts.len());
        }
    }
}
