// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Contact Payload Parser
//!
//! Extracts a structured address-book record from raw text payloads in the
//! loosely-standardized, barcode-friendly contact grammars: MECARD, the AU
//! memory-dial variant, BIZCARD, and vCard 2.1/3.0.
//!
//! # Features
//!
//! - Grammar detection by wrapper markers, with an explicit "not recognized"
//!   signal for dispatchers trying many payload types
//! - Per-grammar escape handling, vCard line unfolding, and quoted-printable
//!   decoding with declared-charset support
//! - One unified record shape across all grammars, with phone numbers and
//!   their type annotations kept structurally paired
//! - Best-effort parsing: truncated terminators and undecodable values
//!   degrade to partial records, never hard failures
//!
//! # Example
//!
//! ```rust
//! use contact_extract::parse_contact;
//!
//! let record = parse_contact("MECARD:N:Sean Owen;TEL:+12125551212;;").unwrap();
//!
//! println!("Names: {:?}", record.names);
//! println!("Phones: {:?}", record.phone_numbers());
//! ```

mod codec;
mod error;
mod parser;
mod types;

pub use codec::{
    decode_quoted_printable, escape_value, split_unescaped, unescape_value, unfold_lines,
};
pub use error::{ParseError, Result};
pub use parser::{detect_grammar, parse_contact};
pub use types::*;
