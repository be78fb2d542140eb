//! Presentational HTML cleanup
//!
//! [`clean_html`] runs an ordered list of [`CleanStage`]s. Each stage is a
//! standalone `&str -> String` rewrite; stages share nothing but the text
//! passed between them, so any subset can be run through
//! [`HtmlCleaner::with_stages`].
//!
//! # Stages
//!
//! 1. `NormalizeNewlines`: `\r\n` and `\r` become `\n`
//! 2. `SemanticEmphasis`: `<b>`/`<i>` become `<strong>`/`<em>`
//! 3. `FixAmpersands`: bare `&` becomes `&amp;`
//! 4. `StripLinkTargets`: `target=...` removed from `<a ...>` tags
//! 5. `RemoveGunk`: `<br clear="all">`, empty emphasis pairs, `<font>` tags
//!    and `<br>` removed
//! 6. `BulletsToList`: runs of paragraphs starting with a bullet become a
//!    `<ul>` list
//! 7. `TrimTrailingEmpty`: empty paragraphs at the very end removed
//!
//! # Examples
//!
//! ```rust
//! use markup_sanitizer::clean::clean_html;
//!
//! assert_eq!(
//!     clean_html("<p>I <i>believe</i></p>"),
//!     "<p>I <em>believe</em></p>"
//! );
//! ```

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::entities::fix_ampersands;
use crate::linebreaks::normalize_newlines;

/// Hard-coded bullet markers recognised at the start of a paragraph
const BULLETS: &[&str] = &["&middot;", "*", "\u{2022}", "&#149;", "&bull;", "&#8226;"];

/// One named rewrite in the cleaning pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanStage {
    NormalizeNewlines,
    SemanticEmphasis,
    FixAmpersands,
    StripLinkTargets,
    RemoveGunk,
    BulletsToList,
    TrimTrailingEmpty,
}

impl CleanStage {
    /// Every stage, in pipeline order
    pub const ALL: [CleanStage; 7] = [
        CleanStage::NormalizeNewlines,
        CleanStage::SemanticEmphasis,
        CleanStage::FixAmpersands,
        CleanStage::StripLinkTargets,
        CleanStage::RemoveGunk,
        CleanStage::BulletsToList,
        CleanStage::TrimTrailingEmpty,
    ];

    /// Run this stage alone
    pub fn apply(self, text: &str) -> String {
        match self {
            CleanStage::NormalizeNewlines => normalize_newlines(text),
            CleanStage::SemanticEmphasis => semantic_emphasis(text),
            CleanStage::FixAmpersands => fix_ampersands(text),
            CleanStage::StripLinkTargets => strip_link_targets(text),
            CleanStage::RemoveGunk => remove_gunk(text),
            CleanStage::BulletsToList => bullets_to_list(text),
            CleanStage::TrimTrailingEmpty => trim_trailing_empty(text),
        }
    }
}

/// Ordered pipeline of cleaning stages
#[derive(Debug, Clone)]
pub struct HtmlCleaner {
    stages: Vec<CleanStage>,
}

impl HtmlCleaner {
    /// Create a cleaner running every stage
    pub fn new() -> Self {
        Self {
            stages: CleanStage::ALL.to_vec(),
        }
    }

    /// Create a cleaner running only `stages`, in the given order
    pub fn with_stages(stages: impl IntoIterator<Item = CleanStage>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
        }
    }

    /// Stages this cleaner runs
    pub fn stages(&self) -> &[CleanStage] {
        &self.stages
    }

    /// Run every configured stage over `text`
    pub fn clean(&self, text: &str) -> String {
        self.stages
            .iter()
            .fold(text.to_string(), |acc, stage| stage.apply(&acc))
    }
}

impl Default for HtmlCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Clean presentational HTML with the full pipeline
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::clean::clean_html;
///
/// assert_eq!(
///     clean_html("<p>* foo</p><p>* bar</p>"),
///     "<ul>\n<li> foo</li><li> bar</li>\n</ul>"
/// );
/// ```
pub fn clean_html(text: &str) -> String {
    HtmlCleaner::new().clean(text)
}

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn replace_all(cell: &'static OnceLock<Option<Regex>>, pattern: &str, text: &str, rep: &str) -> String {
    match compiled(cell, pattern) {
        Some(regex) => regex.replace_all(text, rep).into_owned(),
        None => text.to_string(),
    }
}

fn semantic_emphasis(text: &str) -> String {
    static BOLD: OnceLock<Option<Regex>> = OnceLock::new();
    static ITALIC: OnceLock<Option<Regex>> = OnceLock::new();
    let text = replace_all(&BOLD, r"<(/?)\s*b\s*>", text, "<${1}strong>");
    replace_all(&ITALIC, r"<(/?)\s*i\s*>", &text, "<${1}em>")
}

fn strip_link_targets(text: &str) -> String {
    static LINK_TARGET: OnceLock<Option<Regex>> = OnceLock::new();
    replace_all(&LINK_TARGET, r"(<a [^>]*?)target=[^\s>]+", text, "${1}")
}

fn remove_gunk(text: &str) -> String {
    static GUNK: OnceLock<Option<Regex>> = OnceLock::new();
    replace_all(
        &GUNK,
        r#"(?i)(?:<br clear="all">|<i></i>|<b></b>|<em></em>|<strong></strong>|</?\s*font\s*>|<font [^>]+>|<br\s*/?>)+"#,
        text,
        "",
    )
}

fn bullets_to_list(text: &str) -> String {
    static BULLET_PARAGRAPHS: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = BULLET_PARAGRAPHS.get_or_init(|| {
        let markers: Vec<String> = BULLETS.iter().map(|b| regex::escape(b)).collect();
        Regex::new(&format!(
            r"(?s)(?:<p>(?:{}).*?[a-zA-Z].*?</p>\s*)+",
            markers.join("|")
        ))
        .ok()
    });
    let Some(regex) = regex.as_ref() else {
        return text.to_string();
    };

    regex
        .replace_all(text, |caps: &Captures<'_>| {
            let mut items = caps[0].replace("</p>", "</li>");
            for bullet in BULLETS {
                items = items.replace(&format!("<p>{bullet}"), "<li>");
            }
            format!("<ul>\n{items}\n</ul>")
        })
        .into_owned()
}

fn trim_trailing_empty(text: &str) -> String {
    static TRAILING_EMPTY: OnceLock<Option<Regex>> = OnceLock::new();
    replace_all(
        &TRAILING_EMPTY,
        r"(?:<p>(?:&nbsp;|\s|<br />)*?</p>\s*)+\z",
        text,
        "",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_html_table() {
        let items = [
            (
                "<p>I <i>believe</i> in <b>semantic markup</b>!</p>",
                "<p>I <em>believe</em> in <strong>semantic markup</strong>!</p>",
            ),
            (
                "I escape & I don't <a href=\"#\" target=\"_blank\">target</a>",
                "I escape &amp; I don't <a href=\"#\" >target</a>",
            ),
            (
                "<p>I kill whitespace</p><br clear=\"all\"><p>&nbsp;</p>",
                "<p>I kill whitespace</p>",
            ),
            (
                "<p>* foo</p><p>* bar</p>",
                "<ul>\n<li> foo</li><li> bar</li>\n</ul>",
            ),
        ];
        for (value, output) in items {
            assert_eq!(clean_html(value), output, "input: {value:?}");
        }
    }

    #[test]
    fn test_clean_html_multibyte_bullets() {
        assert_eq!(
            clean_html("<p>\u{2022} café</p>\n<p>&bull; thé</p>"),
            "<ul>\n<li> café</li>\n<li> thé</li>\n</ul>"
        );
    }

    #[test]
    fn test_bullets_need_a_letter() {
        assert_eq!(
            CleanStage::BulletsToList.apply("<p>* 123</p>"),
            "<p>* 123</p>"
        );
    }

    #[test]
    fn test_trailing_empty_only_at_end() {
        let text = "<p>&nbsp;</p><p>body</p><p> <br /> </p>\n";
        assert_eq!(
            CleanStage::TrimTrailingEmpty.apply(text),
            "<p>&nbsp;</p><p>body</p>"
        );
    }

    #[test]
    fn test_gunk_removes_font_tags() {
        assert_eq!(
            CleanStage::RemoveGunk.apply("<FONT face=\"x\">a</font><br/>b<b></b>"),
            "ab"
        );
    }

    #[test]
    fn test_cleaner_with_subset_of_stages() {
        let cleaner = HtmlCleaner::with_stages([CleanStage::SemanticEmphasis]);
        assert_eq!(cleaner.stages(), &[CleanStage::SemanticEmphasis]);
        assert_eq!(cleaner.clean("<b>&</b>"), "<strong>&</strong>");
    }

    proptest! {
        #[test]
        fn prop_clean_html_never_panics(text in "\\PC{0,120}") {
            let _ = clean_html(&text);
        }

        #[test]
        fn prop_plain_text_without_markup_only_fixes_ampersands(text in "[a-zA-Z0-9 .,]{0,80}") {
            prop_assert_eq!(clean_html(&text), text);
        }
    }
}
