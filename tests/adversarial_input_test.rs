//! Integration tests for worst-case inputs
//!
//! Every transform must finish quickly on inputs built to trigger
//! backtracking or quadratic rescans in naive implementations.

use markup_sanitizer::{
    clean_html, fix_ampersands, linebreaks, strip_spaces_between_tags, strip_tags, urlize,
};
use proptest::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const BUDGET: Duration = Duration::from_secs(1);

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

/// Real page with comments, quoted `>` in attributes and a doctype
#[test]
fn test_strip_tags_page_fixture() {
    let html = fixture("strip_tags1.html");
    let (stripped, elapsed) = timed(|| strip_tags(&html));

    assert!(elapsed < BUDGET, "strip_tags took {elapsed:?}");
    assert!(stripped.contains("Please try again."));
    assert!(stripped.contains("Item 119 &amp; details"));
    assert!(!stripped.contains('<'), "tag left behind");
    assert!(!stripped.contains("row-"), "attribute text left behind");
}

/// Malformed markup: nested openers, unclosed quotes and comments
#[test]
fn test_strip_tags_malformed_fixture() {
    let text = fixture("strip_tags2.txt");
    let (stripped, elapsed) = timed(|| strip_tags(&text));

    assert!(elapsed < BUDGET, "strip_tags took {elapsed:?}");
    assert!(stripped.contains("Please try again."));
    assert!(stripped.contains("tail end"));
    assert!(!stripped.contains('<'), "tag left behind");
}

#[test]
fn test_strip_tags_many_ampersands() {
    let value = format!("><!{}D", "&".repeat(16000));
    let (stripped, elapsed) = timed(|| strip_tags(&value));
    assert_eq!(stripped, value);
    assert!(elapsed < BUDGET);
}

#[test]
fn test_strip_tags_deep_nesting() {
    let value = format!("X{}{}X", "<".repeat(50_000), "br>".repeat(50_000));
    let (stripped, elapsed) = timed(|| strip_tags(&value));
    assert!(elapsed < BUDGET, "strip_tags took {elapsed:?}");
    assert_eq!(stripped, "XX");
}

#[test]
fn test_strip_tags_unclosed_openers() {
    let value = "<a".repeat(100_000);
    let (stripped, elapsed) = timed(|| strip_tags(&value));
    assert_eq!(stripped, value);
    assert!(elapsed < BUDGET);
}

#[test]
fn test_urlize_catastrophic_inputs() {
    let emails = format!("a{}a", "@a".repeat(50_000));
    let dots = format!("a{}a", ".".repeat(1_000_000));

    let (out, elapsed) = timed(|| urlize(&emails));
    assert_eq!(out, emails);
    assert!(elapsed < BUDGET, "urlize(emails) took {elapsed:?}");

    let (out, elapsed) = timed(|| urlize(&dots));
    assert_eq!(out, dots);
    assert!(elapsed < BUDGET, "urlize(dots) took {elapsed:?}");
}

#[test]
fn test_regex_stages_on_large_inputs() {
    let paragraphs = "para\n\n".repeat(20_000);
    let (_, elapsed) = timed(|| linebreaks(&paragraphs));
    assert!(elapsed < BUDGET);

    let bullets = "<p>* item</p>".repeat(2_000);
    let (cleaned, elapsed) = timed(|| clean_html(&bullets));
    assert!(cleaned.starts_with("<ul>\n<li> item</li>"));
    assert!(elapsed < BUDGET, "clean_html took {elapsed:?}");

    let spaces = format!(">{}<", " ".repeat(100_000));
    assert_eq!(strip_spaces_between_tags(&spaces), "><");

    let amps = "&#".repeat(50_000);
    let (fixed, elapsed) = timed(|| fix_ampersands(&amps));
    assert_eq!(fixed, "&amp;#".repeat(50_000));
    assert!(elapsed < BUDGET);
}

proptest! {
    #[test]
    fn prop_repeated_fragments_stay_linear(fragment in "[<>a-z!/\"-]{1,6}", n in 1usize..2000) {
        let text = fragment.repeat(n);
        let (stripped, elapsed) = timed(|| strip_tags(&text));
        prop_assert!(stripped.len() <= text.len());
        prop_assert!(elapsed < BUDGET);
    }

    #[test]
    fn prop_urlize_repeated_punctuation(fragment in "[.@:a/()<>&;]{1,4}", n in 1usize..5000) {
        let text = fragment.repeat(n);
        let (_, elapsed) = timed(|| urlize(&text));
        prop_assert!(elapsed < BUDGET);
    }
}
