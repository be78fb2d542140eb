//! Markup Sanitizer - HTML text utilities for untrusted input
//!
//! This library provides the escaping, tag stripping and linkification
//! routines a web framework applies to user-supplied text, written so that
//! no input can drive them into superlinear work.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `escape`: HTML and JavaScript string escaping
//! - `entities`: ampersand repair and entity stripping
//! - `strip`: bounded lexical tag stripping
//! - `linebreaks`: newline normalization and paragraph markup
//! - `clean`: presentational HTML cleanup pipeline
//! - `urlize`: linear-time URL and email linkification
//! - `path`: request-path decoding with percent-escape fallback
//! - `guard`: one-time initialization under a scoped lock
//! - `handler`: minimal request entry point tying `path` and `guard` together
//!
//! # Errors
//!
//! Text transforms are total: malformed markup is kept or removed, never
//! reported. Only path decoding and handler setup return
//! [`SanitizerError`].

// Module declarations
pub mod clean;
pub mod entities;
pub mod error;
pub mod escape;
pub mod guard;
pub mod handler;
pub mod linebreaks;
pub mod path;
pub mod strip;
pub mod urlize;

// Re-export main types for convenience
pub use clean::{CleanStage, HtmlCleaner, clean_html};
pub use entities::{fix_ampersands, strip_entities};
pub use error::SanitizerError;
pub use escape::{escape, escapejs};
pub use guard::InitGuard;
pub use handler::{Handler, HandlerSettings, Middleware, MiddlewareRegistry, Request, Response};
pub use linebreaks::{linebreaks, linebreaks_escaped, normalize_newlines};
pub use path::{decode_path, escape_uri_path, try_decode_path};
pub use strip::{strip_spaces_between_tags, strip_tags};
pub use urlize::{UrlizeOptions, smart_urlquote, urlize, urlize_with};
