//! Error types for decoding and request handling
//!
//! Text transforms never fail; only path decoding and handler setup report
//! errors.

use thiserror::Error;

/// Errors raised by path decoding and guarded handler setup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizerError {
    /// Raw request path is not valid under the declared encoding
    #[error("Invalid request path: byte {position} is not valid {encoding}")]
    InvalidPath {
        /// Offset of the first byte that failed to decode
        position: usize,
        /// Canonical name of the encoding that was applied
        encoding: &'static str,
    },
    /// Charset label not known to the encoding registry
    #[error("Unknown encoding label '{0}'")]
    UnknownEncoding(String),
    /// Handler settings cannot be turned into a middleware chain
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),
}

impl SanitizerError {
    /// Get numeric error code
    pub fn code(&self) -> u32 {
        match self {
            SanitizerError::InvalidPath { .. } => 2,
            SanitizerError::UnknownEncoding(_) => 3,
            SanitizerError::ImproperlyConfigured(_) => 4,
        }
    }

    /// HTTP status a caller should answer with when surfacing this error
    pub fn status_code(&self) -> u16 {
        match self {
            SanitizerError::InvalidPath { .. } => 400,
            SanitizerError::UnknownEncoding(_) | SanitizerError::ImproperlyConfigured(_) => 500,
        }
    }
}
