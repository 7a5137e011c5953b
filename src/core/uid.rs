//! EU VAT identifier (UID) format validation.
//!
//! A UID is a 2-letter country prefix followed by a country-specific
//! pattern, e.g. `ATU12345678`. Validation is offline; confirming that a
//! UID is actually issued requires the portal query in the `fon` module.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

type UidPattern = fn(&str) -> bool;

/// Per-country format rules, keyed by VAT prefix. Sorted for binary search.
/// `EL` is Greece; `XI` (Northern Ireland) keeps the GB layout.
static PATTERNS: &[(&str, UidPattern)] = &[
    ("AT", |n| {
        n.len() == 9 && n.starts_with('U') && n[1..].bytes().all(|b| b.is_ascii_digit())
    }),
    ("BE", |n| n.len() == 10 && n.bytes().all(|b| b.is_ascii_digit())),
    ("BG", |n| {
        (n.len() == 9 || n.len() == 10) && n.bytes().all(|b| b.is_ascii_digit())
    }),
    ("CY", |n| {
        n.len() == 9
            && n[..8].bytes().all(|b| b.is_ascii_digit())
            && n.as_bytes()[8].is_ascii_alphabetic()
    }),
    ("CZ", |n| {
        (8..=10).contains(&n.len()) && n.bytes().all(|b| b.is_ascii_digit())
    }),
    ("DE", |n| {
        n.len() == 9 && n.bytes().all(|b| b.is_ascii_digit()) && n.as_bytes()[0] != b'0'
    }),
    ("DK", |n| n.len() == 8 && n.bytes().all(|b| b.is_ascii_digit())),
    ("EE", |n| n.len() == 9 && n.bytes().all(|b| b.is_ascii_digit())),
    ("EL", |n| n.len() == 9 && n.bytes().all(|b| b.is_ascii_digit())),
    ("ES", |n| n.len() == 9 && n.bytes().all(|b| b.is_ascii_alphanumeric())),
    ("FI", |n| n.len() == 8 && n.bytes().all(|b| b.is_ascii_digit())),
    ("FR", |n| {
        n.len() == 11
            && n[..2].bytes().all(|b| b.is_ascii_alphanumeric())
            && n[2..].bytes().all(|b| b.is_ascii_digit())
    }),
    ("HR", |n| n.len() == 11 && n.bytes().all(|b| b.is_ascii_digit())),
    ("HU", |n| n.len() == 8 && n.bytes().all(|b| b.is_ascii_digit())),
    ("IE", |n| {
        (n.len() == 8 || n.len() == 9) && n.bytes().all(|b| b.is_ascii_alphanumeric())
    }),
    ("IT", |n| n.len() == 11 && n.bytes().all(|b| b.is_ascii_digit())),
    ("LT", |n| {
        (n.len() == 9 || n.len() == 12) && n.bytes().all(|b| b.is_ascii_digit())
    }),
    ("LU", |n| n.len() == 8 && n.bytes().all(|b| b.is_ascii_digit())),
    ("LV", |n| n.len() == 11 && n.bytes().all(|b| b.is_ascii_digit())),
    ("MT", |n| n.len() == 8 && n.bytes().all(|b| b.is_ascii_digit())),
    ("NL", |n| {
        n.len() == 12
            && n[..9].bytes().all(|b| b.is_ascii_digit())
            && n.as_bytes()[9] == b'B'
            && n[10..].bytes().all(|b| b.is_ascii_digit())
    }),
    ("PL", |n| n.len() == 10 && n.bytes().all(|b| b.is_ascii_digit())),
    ("PT", |n| n.len() == 9 && n.bytes().all(|b| b.is_ascii_digit())),
    ("RO", |n| {
        (2..=10).contains(&n.len()) && n.bytes().all(|b| b.is_ascii_digit())
    }),
    ("SE", |n| n.len() == 12 && n.bytes().all(|b| b.is_ascii_digit())),
    ("SI", |n| n.len() == 8 && n.bytes().all(|b| b.is_ascii_digit())),
    ("SK", |n| n.len() == 10 && n.bytes().all(|b| b.is_ascii_digit())),
    ("XI", |n| n.len() == 9 && n.bytes().all(|b| b.is_ascii_digit())),
];

/// A format-validated VAT identifier, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid {
    value: String,
}

impl Uid {
    /// Parse and validate a VAT identifier including its country prefix.
    ///
    /// An unknown prefix is a hard failure; there is no pass-through for
    /// unrecognized countries.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = input.trim().to_ascii_uppercase();
        if value.len() < 4 || !value.is_ascii() {
            return Err(ValidationError::with_rule(
                "uid",
                format!("'{input}' is not a plausible VAT identifier"),
                "uid_length",
            ));
        }
        let (country, number) = value.split_at(2);
        match PATTERNS.binary_search_by_key(&country, |&(code, _)| code) {
            Ok(idx) if (PATTERNS[idx].1)(number) => Ok(Uid { value }),
            Ok(_) => Err(ValidationError::with_rule(
                "uid",
                format!("'{input}' does not match the {country} format"),
                "uid_format",
            )),
            Err(_) => Err(ValidationError::with_rule(
                "uid",
                format!("unknown country prefix '{country}'"),
                "uid_country",
            )),
        }
    }

    /// The 2-letter country prefix.
    pub fn country_code(&self) -> &str {
        &self.value[..2]
    }

    /// The national part after the prefix.
    pub fn number(&self) -> &str {
        &self.value[2..]
    }

    /// The full identifier.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the identifier carries the Austrian prefix.
    pub fn is_austrian(&self) -> bool {
        self.country_code() == "AT"
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl TryFrom<String> for Uid {
    type Error = ValidationError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Uid::parse(&value)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> String {
        uid.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_austrian_uid() {
        let uid = Uid::parse("ATU12345678").unwrap();
        assert_eq!(uid.country_code(), "AT");
        assert_eq!(uid.number(), "U12345678");
        assert!(uid.is_austrian());
    }

    #[test]
    fn valid_foreign_uids() {
        for id in [
            "DE123456789",
            "FR12345678901",
            "NL123456789B01",
            "IT12345678901",
            "ESX1234567X",
            "PL1234567890",
            "EL123456789",
            "XI123456789",
        ] {
            assert!(Uid::parse(id).is_ok(), "{id} should validate");
        }
    }

    #[test]
    fn format_violations() {
        let err = Uid::parse("ATU1234567").unwrap_err();
        assert_eq!(err.rule.as_deref(), Some("uid_format"));
        assert!(Uid::parse("AT12345678").is_err());
        assert!(Uid::parse("DE012345678").is_err());
        assert!(Uid::parse("DE12345678").is_err());
    }

    #[test]
    fn unknown_prefix_is_hard_failure() {
        let err = Uid::parse("XX12345678").unwrap_err();
        assert_eq!(err.rule.as_deref(), Some("uid_country"));
    }

    #[test]
    fn too_short() {
        let err = Uid::parse("DE1").unwrap_err();
        assert_eq!(err.rule.as_deref(), Some("uid_length"));
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let uid = Uid::parse("  atu12345678 ").unwrap();
        assert_eq!(uid.as_str(), "ATU12345678");
    }

    #[test]
    fn pattern_table_is_sorted() {
        for window in PATTERNS.windows(2) {
            assert!(window[0].0 < window[1].0);
        }
    }
}
