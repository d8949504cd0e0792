//! Escape handling, line unfolding and quoted-printable decoding
//!
//! Pure functions over strings and byte sequences. The vCard extractor
//! composes them in a fixed order: unfold, then quoted-printable decode,
//! then backslash unescape.

use crate::error::{ParseError, Result};

/// Split `input` on `delimiter`, ignoring escaped occurrences
///
/// A delimiter preceded by an odd number of backslashes is escaped and does
/// not split. Escape sequences are left intact in the returned tokens; run
/// [`unescape_value`] on each token afterwards.
#[must_use]
pub fn split_unescaped(input: &str, delimiter: char) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut backslashes = 0usize;

    for (i, c) in input.char_indices() {
        if c == delimiter && backslashes % 2 == 0 {
            tokens.push(&input[start..i]);
            start = i + c.len_utf8();
        }
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
    }
    tokens.push(&input[start..]);
    tokens
}

/// Resolve backslash escapes in a single left-to-right pass
///
/// `\X` yields `X` for any character, so `\;`, `\,` and `\\` come out as the
/// literal delimiter or backslash. With `decode_newlines` (the vCard escape
/// set), `\n` and `\N` yield a newline instead of the letter. Substituted
/// output is never re-scanned, so nothing double-unescapes.
#[must_use]
pub fn unescape_value(input: &str, decode_newlines: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') if decode_newlines => out.push('\n'),
            Some(escaped) => out.push(escaped),
            // dangling trailing backslash, keep it
            None => out.push('\\'),
        }
    }
    out
}

/// Escape a literal value so [`unescape_value`] reproduces it
///
/// Backslash-prefixes `;`, `,` and `\`; with `escape_newlines` (vCard),
/// newlines become `\n`.
#[must_use]
pub fn escape_value(input: &str, escape_newlines: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            ';' | ',' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' if escape_newlines => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Join folded vCard physical lines into logical lines
///
/// A continuation line starts with a space or tab; the line break and that
/// one whitespace character are removed. This runs before any other vCard
/// processing. Quoted-printable soft breaks are a separate mechanism and are
/// left for [`decode_quoted_printable`].
#[must_use]
pub fn unfold_lines(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        // fold markers are ASCII, so slicing at these offsets stays on
        // char boundaries
        let fold_len = if bytes[i] == b'\r'
            && bytes.get(i + 1) == Some(&b'\n')
            && matches!(bytes.get(i + 2).copied(), Some(b' ' | b'\t'))
        {
            3
        } else if bytes[i] == b'\n' && matches!(bytes.get(i + 1).copied(), Some(b' ' | b'\t')) {
            2
        } else {
            0
        };

        if fold_len > 0 {
            out.push_str(&input[start..i]);
            i += fold_len;
            start = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&input[start..]);
    out
}

/// Decode a quoted-printable value under the declared character set
///
/// A `=` immediately followed by a line break is a soft break and is
/// removed, letting one logical value span several raw lines. `=XX` decodes
/// to the byte the hex digits encode. The resulting bytes are interpreted
/// under `charset`, defaulting to UTF-8 when unspecified.
///
/// Invalid hex after `=`, an unsupported charset, or bytes that do not form
/// valid text under the charset are reported as [`ParseError::Decode`];
/// callers are expected to fall back to the raw undecoded text rather than
/// abort.
pub fn decode_quoted_printable(value: &str, charset: Option<&str>) -> Result<String> {
    let raw = value.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        let b = raw[i];
        if b != b'=' {
            bytes.push(b);
            i += 1;
            continue;
        }
        match (raw.get(i + 1).copied(), raw.get(i + 2).copied()) {
            // soft line break: drop the = and the line break
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(b'\n'), _) => i += 2,
            (Some(h1), Some(h2)) => {
                let (Some(hi), Some(lo)) = (hex_digit(h1), hex_digit(h2)) else {
                    return Err(ParseError::Decode(format!(
                        "invalid quoted-printable escape at byte {i}"
                    )));
                };
                bytes.push((hi << 4) | lo);
                i += 3;
            }
            _ => {
                return Err(ParseError::Decode(
                    "truncated quoted-printable escape".into(),
                ));
            }
        }
    }

    bytes_to_string(bytes, charset)
}

const fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

/// Interpret raw bytes under a declared charset label
fn bytes_to_string(bytes: Vec<u8>, charset: Option<&str>) -> Result<String> {
    let label = charset.unwrap_or("utf-8").trim().to_ascii_lowercase();
    match label.as_str() {
        "utf-8" | "utf8" | "us-ascii" | "ascii" => {
            String::from_utf8(bytes).map_err(|e| ParseError::Decode(e.to_string()))
        }
        "iso-8859-1" | "iso_8859-1" | "latin1" => {
            Ok(bytes.iter().map(|&b| char::from(b)).collect())
        }
        other => Err(ParseError::Decode(format!("unsupported charset: {other}"))),
    }
}
