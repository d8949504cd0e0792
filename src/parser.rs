//! Contact payload parsing: grammar detection and per-grammar extraction

use crate::codec::{decode_quoted_printable, split_unescaped, unescape_value, unfold_lines};
use crate::error::{ParseError, Result};
use crate::types::{ContactBuilder, ContactRecord, Grammar};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

// Detection and shape patterns
static VCARD_BEGIN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?im)^BEGIN:VCARD").unwrap());

static AU_MEMORY_LINE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?m)^MEMORY").unwrap());

static AU_INDEXED_LINE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?m)^(?:NAME|TEL)[0-9]+:").unwrap());

static AU_FIELD_KEY: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^(NAME|TEL|MAIL)([0-9]+)$").unwrap());

static VCARD_DATE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^\d{4}-?\d{2}-?\d{2}$").unwrap());

/// Classify a raw payload as one of the supported contact grammars
///
/// `None` is the expected negative signal for unrecognized input; detection
/// never fails. Callers dispatching over many payload types should fall
/// through to their next parser on `None`.
#[must_use]
pub fn detect_grammar(text: &str) -> Option<Grammar> {
    let text = strip_bom(text);
    if text.starts_with("MECARD:") {
        return Some(Grammar::Mecard);
    }
    if text.contains("\r\n") && AU_MEMORY_LINE.is_match(text) && AU_INDEXED_LINE.is_match(text) {
        return Some(Grammar::AuMemory);
    }
    if text.starts_with("BIZCARD:") {
        return Some(Grammar::BizCard);
    }
    if VCARD_BEGIN.is_match(text) {
        return Some(Grammar::VCard);
    }
    None
}

/// Parse a raw text payload into a structured [`ContactRecord`]
///
/// Returns [`ParseError::UnrecognizedFormat`] when the payload matches none
/// of the supported grammar wrappers. A payload that matches a wrapper but
/// carries no fields parses to an empty record, not an error; truncated or
/// partially malformed payloads parse best-effort.
pub fn parse_contact(text: &str) -> Result<ContactRecord> {
    let text = strip_bom(text);
    let grammar = detect_grammar(text).ok_or(ParseError::UnrecognizedFormat)?;
    debug!(%grammar, "detected contact grammar");

    let record = match grammar {
        Grammar::Mecard => parse_mecard(text),
        Grammar::AuMemory => parse_au_memory(text),
        Grammar::BizCard => parse_bizcard(text),
        Grammar::VCard => parse_vcard(text),
    };
    Ok(record)
}

/// Some barcode decoders hand over text with a leading byte order mark
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

fn parse_mecard(text: &str) -> ContactRecord {
    let body = text.strip_prefix("MECARD:").unwrap_or(text);
    let mut builder = ContactBuilder::default();
    let mut name_seen = false;

    for field in split_unescaped(body, ';') {
        let Some((key, raw_value)) = field.split_once(':') else {
            continue;
        };
        let value = unescape_value(raw_value, false);
        match key {
            "N" => {
                if !name_seen {
                    builder.push_name(format_docomo_name(value.trim()));
                    name_seen = true;
                }
            }
            "SOUND" => builder.set_pronunciation(value.trim().to_string()),
            "TEL" => builder.push_phone(value.trim().to_string(), None),
            "EMAIL" => builder.push_email(value.trim().to_string()),
            "NOTE" => builder.set_note(value),
            "ADR" => builder.push_address(value.trim().to_string()),
            "URL" => builder.push_url(value.trim().to_string()),
            "ORG" => builder.set_org(value.trim().to_string()),
            "BDAY" => {
                let value = value.trim();
                if is_digits(value, 8) {
                    builder.set_birthday(value.to_string());
                }
            }
            _ => {}
        }
    }
    builder.build()
}

/// DoCoMo N values may be `family,given`; present them as `given family`
fn format_docomo_name(name: &str) -> String {
    name.split_once(',').map_or_else(
        || name.to_string(),
        |(family, given)| format!("{given} {family}"),
    )
}

fn is_digits(value: &str, count: usize) -> bool {
    value.len() == count && value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_au_memory(text: &str) -> ContactRecord {
    let mut builder = ContactBuilder::default();
    let mut names = BTreeMap::new();
    let mut tels = BTreeMap::new();
    let mut mails = BTreeMap::new();

    for line in text.split("\r\n") {
        let Some((key, raw_value)) = line.split_once(':') else {
            continue;
        };
        if key == "MEMORY" {
            builder.set_note(unescape_value(raw_value, false));
            continue;
        }
        if key == "ADD" {
            builder.push_address(unescape_value(raw_value, false).trim().to_string());
            continue;
        }
        let Some(caps) = AU_FIELD_KEY.captures(key) else {
            continue;
        };
        let Ok(index) = caps[2].parse::<u32>() else {
            continue;
        };
        let value = unescape_value(raw_value, false).trim().to_string();
        let slot = match &caps[1] {
            "NAME" => &mut names,
            "TEL" => &mut tels,
            _ => &mut mails,
        };
        // pairing is by numeric suffix; the first value per slot wins
        slot.entry(index).or_insert(value);
    }

    for name in names.into_values() {
        builder.push_name(name);
    }
    for number in tels.into_values() {
        builder.push_phone(number, None);
    }
    for email in mails.into_values() {
        builder.push_email(email);
    }
    builder.build()
}

fn parse_bizcard(text: &str) -> ContactRecord {
    let body = text.strip_prefix("BIZCARD:").unwrap_or(text);
    let mut builder = ContactBuilder::default();
    let mut given: Option<String> = None;
    let mut family: Option<String> = None;
    let mut mobile: Option<String> = None;
    let mut work: Option<String> = None;
    let mut home: Option<String> = None;

    for field in split_unescaped(body, ';') {
        let Some((key, raw_value)) = field.split_once(':') else {
            continue;
        };
        let value = unescape_value(raw_value, false).trim().to_string();
        match key {
            "N" => {
                given.get_or_insert(value);
            }
            "X" => {
                family.get_or_insert(value);
            }
            "T" => builder.set_title(value),
            "C" => builder.set_org(value),
            "A" => builder.push_address(value),
            "M" => {
                mobile.get_or_insert(value);
            }
            "W" => {
                work.get_or_insert(value);
            }
            "B" => {
                home.get_or_insert(value);
            }
            "E" => builder.push_email(value),
            _ => {}
        }
    }

    if let Some(name) = build_bizcard_name(given, family) {
        builder.push_name(name);
    }
    for number in [mobile, work, home].into_iter().flatten() {
        builder.push_phone(number, None);
    }
    builder.build()
}

/// Given name before surname, matching vCard display ordering
fn build_bizcard_name(given: Option<String>, family: Option<String>) -> Option<String> {
    match (given, family) {
        (Some(given), Some(family)) => Some(format!("{given} {family}")),
        (given, family) => given.or(family),
    }
}

fn parse_vcard(text: &str) -> ContactRecord {
    let unfolded = unfold_lines(text);
    let mut builder = ContactBuilder::default();
    let mut display_names: Vec<String> = Vec::new();
    let mut structured_name: Option<String> = None;

    for field in extract_vcard_fields(&unfolded) {
        match field.key.to_ascii_uppercase().as_str() {
            "BEGIN" | "END" | "VERSION" => {}
            "FN" => display_names.push(decode_text(&field, true)),
            "N" => {
                if structured_name.is_none() {
                    structured_name = Some(format_structured_name(&decode_raw(&field, true)));
                }
            }
            "TEL" => {
                let mut number = decode_text(&field, true);
                if field
                    .param("VALUE")
                    .is_some_and(|v| v.eq_ignore_ascii_case("uri"))
                {
                    number = strip_uri_scheme(&number);
                }
                builder.push_phone(number, field.phone_type().map(str::to_string));
            }
            "EMAIL" => builder.push_email(decode_text(&field, true)),
            "NOTE" => builder.set_note(decode_text(&field, false)),
            "ADR" => builder.push_address(decode_components(&field, true)),
            "ORG" => builder.set_org(decode_components(&field, true)),
            "URL" => builder.push_url(decode_text(&field, true)),
            "TITLE" => builder.set_title(decode_text(&field, true)),
            "BDAY" => {
                let birthday = decode_text(&field, true);
                if VCARD_DATE.is_match(&birthday) {
                    builder.set_birthday(birthday);
                }
            }
            _ => {}
        }
    }

    // FN carries ready-made display names and wins over the structured N
    if display_names.is_empty() {
        if let Some(name) = structured_name {
            builder.push_name(name);
        }
    } else {
        for name in display_names {
            builder.push_name(name);
        }
    }
    builder.build()
}

/// A single vCard property line split into key, parameters and raw value
///
/// Ephemeral: owned by the extraction pass and discarded after assembly.
struct ParsedField<'a> {
    key: &'a str,
    params: Vec<(&'a str, &'a str)>,
    raw_value: String,
}

impl ParsedField<'_> {
    /// Case-insensitive parameter lookup; first occurrence wins
    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|&(_, value)| value)
    }

    fn is_quoted_printable(&self) -> bool {
        self.param("ENCODING")
            .is_some_and(|v| v.eq_ignore_ascii_case("QUOTED-PRINTABLE"))
    }

    /// Phone type: an explicit `TYPE=` parameter, or a bare HOME/WORK/CELL
    /// token
    fn phone_type(&self) -> Option<&str> {
        if let Some(explicit) = self.param("TYPE") {
            return Some(explicit);
        }
        self.params
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|&(key, _)| key)
            .find(|key| {
                key.eq_ignore_ascii_case("HOME")
                    || key.eq_ignore_ascii_case("WORK")
                    || key.eq_ignore_ascii_case("CELL")
            })
    }
}

fn extract_vcard_fields(unfolded: &str) -> Vec<ParsedField<'_>> {
    let mut fields = Vec::new();
    let mut lines = unfolded.lines();

    while let Some(line) = lines.next() {
        let Some(mut field) = parse_property_line(line) else {
            continue;
        };
        // A quoted-printable value ending in = spans the following physical
        // lines; the soft-break sequence stays in place for the decoder.
        if field.is_quoted_printable() {
            while field.raw_value.ends_with('=') {
                let Some(next) = lines.next() else { break };
                field.raw_value.push_str("\r\n");
                field.raw_value.push_str(next);
            }
        }
        fields.push(field);
    }
    fields
}

fn parse_property_line(line: &str) -> Option<ParsedField<'_>> {
    let (head, value) = line.split_once(':')?;
    let mut parts = split_unescaped(head, ';').into_iter();
    let key = parts.next().unwrap_or_default();
    if key.is_empty() {
        return None;
    }
    let params = parts
        .map(|part| part.split_once('=').unwrap_or((part, "")))
        .collect();
    Some(ParsedField {
        key,
        params,
        raw_value: value.to_string(),
    })
}

/// Quoted-printable decode when marked, keeping the raw text on failure
fn decode_raw(field: &ParsedField<'_>, trim: bool) -> String {
    let raw = if trim {
        field.raw_value.trim()
    } else {
        field.raw_value.as_str()
    };
    if !field.is_quoted_printable() {
        return raw.to_string();
    }
    match decode_quoted_printable(raw, field.param("CHARSET")) {
        Ok(decoded) => decoded,
        Err(err) => {
            debug!(key = field.key, %err, "keeping raw value after decode failure");
            raw.to_string()
        }
    }
}

fn decode_text(field: &ParsedField<'_>, trim: bool) -> String {
    unescape_value(&decode_raw(field, trim), true)
}

/// ADR and ORG values: collapse unescaped `;` component dividers to spaces
fn decode_components(field: &ParsedField<'_>, trim: bool) -> String {
    let value = decode_raw(field, trim);
    let flattened = split_unescaped(&value, ';')
        .into_iter()
        .filter(|component| !component.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    unescape_value(flattened.trim(), true)
}

/// `VALUE=uri` phone values carry a URI; keep the scheme-specific part
fn strip_uri_scheme(value: &str) -> String {
    if let Some((scheme, rest)) = value.split_once(':')
        && scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return rest.to_string();
    }
    value.to_string()
}

/// Assemble one display name from the structured `N` components
///
/// Components arrive as `family;given;middle;prefix;suffix` and are joined
/// in prefix, given, middle, family, suffix order with single spaces; empty
/// components are skipped. Anything past the fifth component folds into the
/// suffix.
fn format_structured_name(value: &str) -> String {
    let mut parts = split_unescaped(value, ';');
    let tail = (parts.len() > 5).then(|| parts.split_off(4).join(";"));

    let mut components = [const { String::new() }; 5];
    for (slot, part) in components.iter_mut().zip(&parts) {
        *slot = unescape_value(part, true);
    }
    if let Some(tail) = tail {
        components[4] = unescape_value(&tail, true);
    }

    let mut name = String::new();
    for index in [3, 1, 2, 0, 4] {
        let component = components[index].trim();
        if component.is_empty() {
            continue;
        }
        if !name.is_empty() {
            name.push(' ');
        }
        name.push_str(component);
    }
    name
}
