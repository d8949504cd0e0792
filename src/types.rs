//! Core types for parsed contact records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Contact grammar recognized in a raw payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// DoCoMo `MECARD:` payload
    Mecard,
    /// KDDI AU memory-dial payload (`MEMORY:`/`NAMEn:`/`TELn:` lines)
    AuMemory,
    /// `BIZCARD:` payload with single-letter keys
    BizCard,
    /// vCard 2.1/3.0 (`BEGIN:VCARD` wrapper)
    VCard,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mecard => "MECARD",
            Self::AuMemory => "AU-MEMORY",
            Self::BizCard => "BIZCARD",
            Self::VCard => "VCARD",
        };
        write!(f, "{name}")
    }
}

/// A phone number with its optional type annotation
///
/// Pairing the type with the number makes mismatched number/type sequences
/// unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Phone {
    /// The number as it appeared in the payload (may be empty)
    pub number: String,

    /// Type annotation (e.g. "HOME", "WORK", "CELL") when one was present
    pub phone_type: Option<String>,
}

impl Phone {
    pub fn new(number: impl Into<String>, phone_type: Option<String>) -> Self {
        Self {
            number: number.into(),
            phone_type,
        }
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.phone_type {
            Some(phone_type) => write!(f, "{} ({phone_type})", self.number),
            None => write!(f, "{}", self.number),
        }
    }
}

/// A unified contact record extracted from a raw payload
///
/// Repeatable fields are `Option<Vec<_>>`: `None` means the field never
/// occurred in the source, while `Some(vec![String::new()])` is a field that
/// occurred with an empty value. Values are stored as the grammar provided
/// them; nothing is validated for plausibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactRecord {
    /// Job title
    pub title: Option<String>,

    /// Display names, in source order
    pub names: Option<Vec<String>>,

    /// Phonetic reading of the name
    pub pronunciation: Option<String>,

    /// Phone numbers with their paired type annotations
    pub phones: Option<Vec<Phone>>,

    /// Email addresses
    pub emails: Option<Vec<String>>,

    /// Postal addresses, one entry per address field occurrence
    pub addresses: Option<Vec<String>>,

    /// Organization name
    pub org: Option<String>,

    /// URLs
    pub urls: Option<Vec<String>>,

    /// Birthday as the grammar-native literal (not date-parsed)
    pub birthday: Option<String>,

    /// Free-form note or memo
    pub note: Option<String>,
}

impl ContactRecord {
    /// Phone numbers as a parallel sequence, in source order
    #[must_use]
    pub fn phone_numbers(&self) -> Option<Vec<&str>> {
        self.phones
            .as_ref()
            .map(|phones| phones.iter().map(|p| p.number.as_str()).collect())
    }

    /// Phone types as a parallel sequence, index-aligned with
    /// [`phone_numbers`](Self::phone_numbers)
    #[must_use]
    pub fn phone_types(&self) -> Option<Vec<Option<&str>>> {
        self.phones
            .as_ref()
            .map(|phones| phones.iter().map(|p| p.phone_type.as_deref()).collect())
    }

    /// Check if no field at all was populated
    ///
    /// A payload that matches a grammar wrapper but carries zero fields
    /// parses to an empty record, which is distinct from a parse failure.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.names.is_none()
            && self.pronunciation.is_none()
            && self.phones.is_none()
            && self.emails.is_none()
            && self.addresses.is_none()
            && self.org.is_none()
            && self.urls.is_none()
            && self.birthday.is_none()
            && self.note.is_none()
    }
}

/// Accumulates extracted fields and assembles the final record
///
/// Scalar setters apply the uniform first-occurrence-wins policy; sequence
/// fields accumulate in source order. `build` maps sequences that never
/// received a value to `None`.
#[derive(Debug, Default)]
pub(crate) struct ContactBuilder {
    title: Option<String>,
    names: Vec<String>,
    pronunciation: Option<String>,
    phones: Vec<Phone>,
    emails: Vec<String>,
    addresses: Vec<String>,
    org: Option<String>,
    urls: Vec<String>,
    birthday: Option<String>,
    note: Option<String>,
}

impl ContactBuilder {
    pub fn set_title(&mut self, title: String) {
        self.title.get_or_insert(title);
    }

    pub fn push_name(&mut self, name: String) {
        self.names.push(name);
    }

    pub fn set_pronunciation(&mut self, pronunciation: String) {
        self.pronunciation.get_or_insert(pronunciation);
    }

    pub fn push_phone(&mut self, number: String, phone_type: Option<String>) {
        self.phones.push(Phone { number, phone_type });
    }

    pub fn push_email(&mut self, email: String) {
        self.emails.push(email);
    }

    pub fn push_address(&mut self, address: String) {
        self.addresses.push(address);
    }

    pub fn set_org(&mut self, org: String) {
        self.org.get_or_insert(org);
    }

    pub fn push_url(&mut self, url: String) {
        self.urls.push(url);
    }

    pub fn set_birthday(&mut self, birthday: String) {
        self.birthday.get_or_insert(birthday);
    }

    pub fn set_note(&mut self, note: String) {
        self.note.get_or_insert(note);
    }

    pub fn build(self) -> ContactRecord {
        fn seq<T>(values: Vec<T>) -> Option<Vec<T>> {
            if values.is_empty() { None } else { Some(values) }
        }

        ContactRecord {
            title: self.title,
            names: seq(self.names),
            pronunciation: self.pronunciation,
            phones: seq(self.phones),
            emails: seq(self.emails),
            addresses: seq(self.addresses),
            org: self.org,
            urls: seq(self.urls),
            birthday: self.birthday,
            note: self.note,
        }
    }
}
