//! Error types for contact payload parsing

use thiserror::Error;

/// Errors that can occur during contact payload parsing
#[derive(Error, Debug)]
pub enum ParseError {
    /// Input does not match any supported contact grammar
    ///
    /// This is a negative classification result, not a fault: a dispatcher
    /// trying several payload parsers should fall through to the next one.
    #[error("input does not match any supported contact grammar")]
    UnrecognizedFormat,

    /// Failed to decode a quoted-printable or charset-encoded value
    ///
    /// The vCard extractor recovers from this locally by keeping the raw
    /// text of the affected value, so it never aborts a parse.
    #[error("failed to decode content: {0}")]
    Decode(String),
}

/// Result type for contact parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;
