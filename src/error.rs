//! Parser error types.

use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors surfaced by the load sequence.
///
/// Everything past a successful load degrades locally instead: value
/// accessors return `None` or empty bytes so that partially damaged files
/// stay partially readable.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No `startxref … %%EOF` anchor was found in the file tail.
    #[error("no startxref anchor in the file tail")]
    NotAPdf,

    /// The cross-reference chain or a trailer in it could not be parsed.
    #[error("malformed xref: {0}")]
    MalformedXref(String),
}
