//! Lexical tag stripping
//!
//! This is not a markup parser. The stripper walks the input once, keeping a
//! stack of *pending* `<` positions in the output buffer, each with a small
//! lexical state. Characters are appended to the output tentatively; when
//! the innermost pending span reaches its closing `>` the output is
//! truncated back to that span's `<`.
//!
//! # Rules
//!
//! 1. `<` opens a candidate only when followed by an ASCII letter, `/` plus
//!    a letter, `!` or `?`. Otherwise it is plain text (`<>`, `a < b`, `<2`).
//! 2. An unquoted `<` inside a candidate starts a nested candidate. Removing
//!    the nested span resumes the outer one, so `X<<<<br>br>br>br>X` strips
//!    down to `XX` and `<sc<!-- -->ript>` is removed as a whole.
//! 3. Attribute values quoted after `=` hide `<` and `>`. Inside `<!-- -->`
//!    only `-->` closes. A quote or comment whose closer never appears
//!    later in the input hides nothing: the candidate ends at the next `>`,
//!    so `<img alt='x>hello` strips to `hello`.
//! 4. Candidates still open at end of input are kept verbatim.
//!
//! # Complexity
//!
//! Every input character is fed to exactly one state machine. When a
//! nested candidate turns out to be plain text, its characters (at most a
//! `<`, a `/` and the character that disqualified it, plus any equally dead
//! ancestors) are replayed once into the nearest enclosing candidate that
//! can absorb them. Replayed characters are never replayed again, so the
//! total work is linear in the input length.
//!
//! # Examples
//!
//! ```rust
//! use markup_sanitizer::strip::strip_tags;
//!
//! assert_eq!(strip_tags("<p>Hello <b>World</b></p>"), "Hello World");
//! assert_eq!(strip_tags("234<235, right?"), "234<235, right?");
//! assert_eq!(strip_tags("X<<<<br>br>br>br>X"), "XX");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Lexical position inside a pending `<...>` candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagState {
    /// Just read `<`
    Open,
    /// Read `</`
    EndOpen,
    /// Inside `</name ...`
    EndTag,
    /// Inside a start tag name or its unquoted attributes
    StartTag,
    /// After `=` in a start tag, before the value begins
    AttrValue,
    /// Inside a quoted attribute value
    Quoted(char),
    /// Read `<!`
    Bang,
    /// Read `<!-`
    BangDash,
    /// Inside `<!--`, counting the dashes just seen
    Comment { dashes: u8 },
    /// `<!DOCTYPE ...>`, `<?...>` and other declarations
    Declaration,
    /// Quoted value or comment with no closer anywhere later in the input;
    /// the next `>` ends the candidate
    Unterminated,
}

/// Outcome of feeding one character to a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    /// Unquoted `<`: start a nested candidate, leaving this state untouched
    Nested,
    /// Candidate is complete and must be removed
    Close,
    /// Candidate is plain text after all
    Abandon,
}

impl TagState {
    /// Feed `ch`. A `literal` character is never treated as a nested `<`.
    fn advance(&mut self, ch: char, literal: bool) -> Step {
        use TagState::*;

        let nested = ch == '<' && !literal;
        match *self {
            Open => {
                if nested {
                    return Step::Nested;
                }
                *self = match ch {
                    c if c.is_ascii_alphabetic() => StartTag,
                    '/' => EndOpen,
                    '!' => Bang,
                    '?' => Declaration,
                    _ => return Step::Abandon,
                };
                Step::Continue
            }
            EndOpen => {
                if nested {
                    Step::Nested
                } else if ch.is_ascii_alphabetic() {
                    *self = EndTag;
                    Step::Continue
                } else {
                    Step::Abandon
                }
            }
            EndTag | Declaration => match ch {
                _ if nested => Step::Nested,
                '>' => Step::Close,
                _ => Step::Continue,
            },
            StartTag => match ch {
                _ if nested => Step::Nested,
                '>' => Step::Close,
                '=' => {
                    *self = AttrValue;
                    Step::Continue
                }
                _ => Step::Continue,
            },
            AttrValue => match ch {
                _ if nested => Step::Nested,
                '>' => Step::Close,
                '"' | '\'' => {
                    *self = Quoted(ch);
                    Step::Continue
                }
                c if c.is_whitespace() => Step::Continue,
                _ => {
                    *self = StartTag;
                    Step::Continue
                }
            },
            Quoted(quote) => {
                if ch == quote {
                    *self = StartTag;
                }
                Step::Continue
            }
            Bang | BangDash => match ch {
                _ if nested => Step::Nested,
                '>' => Step::Close,
                '-' if *self == Bang => {
                    *self = BangDash;
                    Step::Continue
                }
                '-' => {
                    *self = Comment { dashes: 0 };
                    Step::Continue
                }
                _ => {
                    *self = Declaration;
                    Step::Continue
                }
            },
            Unterminated => match ch {
                '>' => Step::Close,
                _ => Step::Continue,
            },
            Comment { dashes } => match ch {
                '-' => {
                    *self = Comment {
                        dashes: dashes.saturating_add(1),
                    };
                    Step::Continue
                }
                '>' if dashes >= 2 => Step::Close,
                _ => {
                    *self = Comment { dashes: 0 };
                    Step::Continue
                }
            },
        }
    }

    /// States that become plain text when the next character is a literal `<`
    fn dies_on_literal(self) -> bool {
        matches!(self, TagState::Open | TagState::EndOpen)
    }

    /// States in which `<` and `>` are hidden until a specific closer
    fn hides_markup(self) -> bool {
        matches!(self, TagState::Quoted(_) | TagState::Comment { .. })
    }
}

/// Byte offsets of the last closer of each kind in the input
///
/// Entering a quoted value or comment consults these once to decide whether
/// it can ever close.
#[derive(Debug)]
struct Closers {
    single_quote: Option<usize>,
    double_quote: Option<usize>,
    comment_end: Option<usize>,
}

impl Closers {
    fn new(text: &str) -> Self {
        Self {
            single_quote: text.rfind('\''),
            double_quote: text.rfind('"'),
            comment_end: text.rfind("-->"),
        }
    }

    /// Whether `state`, entered at byte offset `at`, meets its closer later on
    fn closes_after(&self, state: TagState, at: usize) -> bool {
        let last = match state {
            TagState::Quoted('\'') => self.single_quote,
            TagState::Quoted(_) => self.double_quote,
            TagState::Comment { .. } => self.comment_end,
            _ => return true,
        };
        last.is_some_and(|pos| pos > at)
    }
}

/// A `<` in the output buffer that may still turn out to start a tag
#[derive(Debug)]
struct Pending {
    start: usize,
    state: TagState,
}

/// Remove everything that lexically looks like a tag
///
/// Entities, unmatched `<` or `>` and unterminated candidates are preserved.
/// Runs in time linear in the input length regardless of nesting or
/// repetition.
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::strip::strip_tags;
///
/// assert_eq!(strip_tags("a<p onclick=\"alert('<test>')\">b</p>c"), "abc");
/// assert_eq!(strip_tags("hi, <f x"), "hi, <f x");
/// assert_eq!(strip_tags("&gotcha&#;<>"), "&gotcha&#;<>");
/// ```
pub fn strip_tags(text: &str) -> String {
    if !text.contains('<') {
        return text.to_string();
    }

    let closers = Closers::new(text);
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<Pending> = Vec::new();

    for (at, ch) in text.char_indices() {
        let start = out.len();
        out.push(ch);

        let step = match stack.last_mut() {
            Some(top) => {
                let before = top.state;
                let step = top.state.advance(ch, false);
                if !before.hides_markup()
                    && top.state.hides_markup()
                    && !closers.closes_after(top.state, at)
                {
                    top.state = TagState::Unterminated;
                }
                step
            }
            None if ch == '<' => Step::Nested,
            None => Step::Continue,
        };

        match step {
            Step::Continue => {}
            Step::Nested => stack.push(Pending {
                start,
                state: TagState::Open,
            }),
            Step::Close => {
                if let Some(done) = stack.pop() {
                    out.truncate(done.start);
                }
            }
            Step::Abandon => abandon(&mut out, &mut stack),
        }
    }

    out
}

/// Drop the innermost candidate as plain text and hand its characters to
/// the nearest enclosing candidate that can absorb a literal `<`
fn abandon(out: &mut String, stack: &mut Vec<Pending>) {
    let Some(mut dead) = stack.pop() else {
        return;
    };
    while stack.last().is_some_and(|parent| parent.state.dies_on_literal()) {
        if let Some(parent) = stack.pop() {
            dead = parent;
        }
    }

    let Some(parent) = stack.last_mut() else {
        return;
    };

    let replay = out[dead.start..].to_string();
    let mut closed = false;
    for ch in replay.chars() {
        if parent.state.advance(ch, true) == Step::Close {
            closed = true;
            break;
        }
    }

    if closed && let Some(done) = stack.pop() {
        out.truncate(done.start);
    }
}

/// Remove whitespace between a `>` and the following `<`
///
/// # Examples
///
/// ```rust
/// use markup_sanitizer::strip::strip_spaces_between_tags;
///
/// assert_eq!(strip_spaces_between_tags("<d> </d>"), "<d></d>");
/// assert_eq!(strip_spaces_between_tags(" <f> x</f>"), " <f> x</f>");
/// ```
pub fn strip_spaces_between_tags(text: &str) -> String {
    static BETWEEN_TAGS_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = BETWEEN_TAGS_REGEX.get_or_init(|| Regex::new(r">\s+<").ok());
    match regex {
        Some(regex) => regex.replace_all(text, "><").into_owned(),
        None => text.to_string(),
    }
}
