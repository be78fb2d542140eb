//! URL and email linkification
//!
//! The scanner splits text into whitespace and non-whitespace runs and
//! classifies each word with hand-written prefix/suffix checks. Every check
//! is a bounded number of linear passes over the word, so inputs such as a
//! million dots or fifty thousand `@` signs cost no more than their length.
//!
//! # Examples
//!
//! ```rust
//! use markup_sanitizer::urlize::urlize;
//!
//! assert_eq!(
//!     urlize("see www.example.com."),
//!     "see <a href=\"http://www.example.com\">www.example.com</a>."
//! );
//! assert_eq!(urlize("no links here"), "no links here");
//! ```

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode};

use crate::escape::escape;

/// Punctuation stripped from the end of a word, checked once each in order
const TRAILING_PUNCTUATION: &[&str] = &[".", ",", ":", ";", ".)", "\"", "'"];

/// Opening/closing pairs peeled off around a word
const WRAPPING_PUNCTUATION: &[(&str, &str)] = &[
    ("(", ")"),
    ("<", ">"),
    ("[", "]"),
    ("&lt;", "&gt;"),
    ("\"", "\""),
    ("'", "'"),
];

/// Top-level domains recognised on bare hostnames without `www.`
const BARE_DOMAIN_TLDS: &[&str] = &["com", "edu", "gov", "int", "mil", "net", "org"];

/// Bytes escaped when normalizing link targets: everything except
/// `[A-Za-z0-9_.-]` and `!*'();:@&=+$,/?#[]~`
const URL_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'~');

/// Linkification options
#[derive(Debug, Clone, Default)]
pub struct UrlizeOptions {
    /// Truncate link text to this many characters, ending in `...`
    pub trim_url_limit: Option<usize>,
    /// Add `rel="nofollow"` to web links (never to `mailto:`)
    pub nofollow: bool,
    /// HTML-escape words and link parts
    pub autoescape: bool,
}

/// Wrap URLs and email addresses in anchors using default options
pub fn urlize(text: &str) -> String {
    urlize_with(text, &UrlizeOptions::default())
}

/// Wrap URLs and email addresses in anchors
///
/// Whitespace runs are copied unchanged. Words without a link are copied
/// unchanged unless `autoescape` is set.
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::urlize::{urlize_with, UrlizeOptions};
///
/// let options = UrlizeOptions { nofollow: true, ..Default::default() };
/// assert_eq!(
///     urlize_with("http://a.io", &options),
///     "<a href=\"http://a.io\" rel=\"nofollow\">http://a.io</a>"
/// );
/// ```
pub fn urlize_with(text: &str, options: &UrlizeOptions) -> String {
    let mut out = String::with_capacity(text.len());
    for (is_space, piece) in split_words(text) {
        if is_space {
            out.push_str(piece);
        } else {
            push_word(&mut out, piece, options);
        }
    }
    out
}

/// Alternating runs of whitespace and non-whitespace
fn split_words(text: &str) -> Vec<(bool, &str)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (idx, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if current.is_some_and(|c| c != space) {
            pieces.push((!space, &text[start..idx]));
            start = idx;
        }
        current = Some(space);
    }
    if let Some(space) = current {
        pieces.push((space, &text[start..]));
    }
    pieces
}

fn push_plain(out: &mut String, word: &str, options: &UrlizeOptions) {
    if options.autoescape {
        out.push_str(&escape(word));
    } else {
        out.push_str(word);
    }
}

fn push_word(out: &mut String, word: &str, options: &UrlizeOptions) {
    if !word.contains(['.', '@', ':']) {
        push_plain(out, word, options);
        return;
    }

    let (lead, middle, trail) = split_punctuation(word);
    let Some(link) = link_target(middle) else {
        push_plain(out, word, options);
        return;
    };

    let trimmed = trim_url(middle, options.trim_url_limit);
    let rel = if options.nofollow && !link.is_mailto {
        " rel=\"nofollow\""
    } else {
        ""
    };

    let (lead, href, trimmed, trail) = if options.autoescape {
        (escape(lead), escape(&link.href), escape(&trimmed), escape(trail))
    } else {
        (lead.to_string(), link.href, trimmed, trail.to_string())
    };
    out.push_str(&lead);
    out.push_str("<a href=\"");
    out.push_str(&href);
    out.push('"');
    out.push_str(rel);
    out.push('>');
    out.push_str(&trimmed);
    out.push_str("</a>");
    out.push_str(&trail);
}

/// Split `word` into leading punctuation, the candidate link and trailing punctuation
fn split_punctuation(word: &str) -> (&str, &str, &str) {
    let mut start = 0;
    let mut end = word.len();

    for punctuation in TRAILING_PUNCTUATION {
        if word[start..end].ends_with(punctuation) {
            end -= punctuation.len();
        }
    }

    for (opening, closing) in WRAPPING_PUNCTUATION {
        if word[start..end].starts_with(opening) {
            start += opening.len();
        }
        // Keep a closing bracket only when it balances an opening one.
        let middle = &word[start..end];
        if middle.ends_with(closing)
            && middle.matches(closing).count() == middle.matches(opening).count() + 1
        {
            end -= closing.len();
        }
    }

    (&word[..start], &word[start..end], &word[end..])
}

struct Link {
    href: String,
    is_mailto: bool,
}

fn link_target(middle: &str) -> Option<Link> {
    if is_simple_url(middle) {
        return Some(Link {
            href: smart_urlquote(middle),
            is_mailto: false,
        });
    }
    if is_bare_domain_url(middle) {
        return Some(Link {
            href: smart_urlquote(&format!("http://{middle}")),
            is_mailto: false,
        });
    }
    if !middle.contains(':') && is_simple_email(middle) {
        let (local, domain) = middle.rsplit_once('@')?;
        let domain = ascii_domain(domain)?;
        return Some(Link {
            href: format!("mailto:{local}@{domain}"),
            is_mailto: true,
        });
    }
    None
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// `http://` or `https://`, an optional `[`, then a word character
fn is_simple_url(text: &str) -> bool {
    let rest = if starts_with_ignore_case(text, "http://") {
        &text[7..]
    } else if starts_with_ignore_case(text, "https://") {
        &text[8..]
    } else {
        return false;
    };
    let rest = rest.strip_prefix('[').unwrap_or(rest);
    rest.chars().next().is_some_and(is_word_char)
}

/// `www.` prefix, or a hostname ending in a well-known TLD
fn is_bare_domain_url(text: &str) -> bool {
    if starts_with_ignore_case(text, "www.") {
        return true;
    }
    if starts_with_ignore_case(text, "http") {
        return false;
    }

    let Some(first) = text.chars().next() else {
        return false;
    };
    if !is_word_char(first) {
        return false;
    }
    let body_start = first.len_utf8();

    BARE_DOMAIN_TLDS.iter().any(|tld| {
        let suffix_len = tld.len() + 1;
        if text.len() < body_start + 1 + suffix_len {
            return false;
        }
        let split = text.len() - suffix_len;
        if !text.is_char_boundary(split) {
            return false;
        }
        let (body, suffix) = text.split_at(split);
        suffix.as_bytes()[0] == b'.'
            && suffix[1..].eq_ignore_ascii_case(tld)
            && !body[body_start..].contains('@')
    })
}

/// `local@domain.tld` with no whitespace, checked in two linear passes
///
/// The domain needs at least one character before some `.` and at least
/// one after it; a final `.` does not hide an earlier valid one.
fn is_simple_email(text: &str) -> bool {
    if text.contains(char::is_whitespace) {
        return false;
    }
    let Some(at) = text.char_indices().skip(1).find(|&(_, c)| c == '@').map(|(i, _)| i) else {
        return false;
    };
    let domain = &text[at + 1..];
    let Some(first) = domain.chars().next() else {
        return false;
    };
    let rest = &domain[first.len_utf8()..];
    rest.char_indices().any(|(i, c)| c == '.' && i + 1 < rest.len())
}

/// Punycode form of a hostname; ASCII names pass through untouched
fn ascii_domain(domain: &str) -> Option<String> {
    if domain.is_ascii() {
        return Some(domain.to_string());
    }
    match idna::domain_to_ascii(domain) {
        Ok(ascii) => Some(ascii),
        Err(err) => {
            tracing::debug!(domain, error = ?err, "domain is not IDNA-encodable");
            None
        }
    }
}

fn trim_url(text: &str, limit: Option<usize>) -> String {
    match limit {
        Some(limit) if text.chars().count() > limit => {
            let keep: String = text.chars().take(limit.saturating_sub(3)).collect();
            format!("{keep}...")
        }
        _ => text.to_string(),
    }
}

/// Quote a URL unless it is already quoted
///
/// Existing escapes are decoded first so they are not encoded twice. A
/// non-ASCII host is converted to its IDNA (punycode) form; if conversion
/// fails the host is quoted like the rest of the URL.
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::urlize::smart_urlquote;
///
/// assert_eq!(smart_urlquote("http://a.io/a b"), "http://a.io/a%20b");
/// assert_eq!(smart_urlquote("http://a.io/a%20b"), "http://a.io/a%20b");
/// assert_eq!(smart_urlquote("http://a.io/ü"), "http://a.io/%C3%BC");
/// assert_eq!(smart_urlquote("http://bücher.de/"), "http://xn--bcher-kva.de/");
/// ```
pub fn smart_urlquote(url: &str) -> String {
    let url = match split_host(url) {
        Some((scheme, host, rest)) if !host.is_ascii() => match ascii_domain(host) {
            Some(host) => format!("{scheme}{host}{rest}"),
            None => url.to_string(),
        },
        _ => url.to_string(),
    };
    let bytes: Vec<u8> = percent_decode_str(&url).collect();
    percent_encode(&bytes, URL_ESCAPE).to_string()
}

/// Split `scheme://host...` into `("scheme://", host, rest)`
///
/// Userinfo and port stay outside the host.
fn split_host(url: &str) -> Option<(&str, &str, &str)> {
    let authority_start = url.find("://")? + 3;
    let authority_len = url[authority_start..]
        .find(['/', '?', '#'])
        .unwrap_or(url.len() - authority_start);
    let authority = &url[authority_start..authority_start + authority_len];
    let host_start = authority.rfind('@').map_or(0, |i| i + 1);
    let host_len = authority[host_start..]
        .rfind(':')
        .unwrap_or(authority.len() - host_start);
    let start = authority_start + host_start;
    let end = start + host_len;
    Some((&url[..start], &url[start..end], &url[end..]))
}
