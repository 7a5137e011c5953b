//! IBAN and BIC validation (ISO 13616 / ISO 9362).
//!
//! The IBAN check applies ISO 7064 mod-97 to the rearranged account
//! number: BBAN, then country code, then check digits, with letters
//! expanded to two-digit values (A=10 .. Z=35). A valid IBAN leaves
//! remainder 1.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// IBAN length per country, including prefix and check digits.
/// Sorted for binary search.
static IBAN_LENGTHS: &[(&str, usize)] = &[
    ("AT", 20),
    ("BE", 16),
    ("BG", 22),
    ("CH", 21),
    ("CY", 28),
    ("CZ", 24),
    ("DE", 22),
    ("DK", 18),
    ("EE", 20),
    ("ES", 24),
    ("FI", 18),
    ("FR", 27),
    ("GB", 22),
    ("GR", 27),
    ("HR", 21),
    ("HU", 28),
    ("IE", 22),
    ("IS", 26),
    ("IT", 27),
    ("LI", 21),
    ("LT", 20),
    ("LU", 20),
    ("LV", 21),
    ("MC", 27),
    ("MT", 31),
    ("NL", 18),
    ("NO", 15),
    ("PL", 28),
    ("PT", 25),
    ("RO", 24),
    ("SE", 24),
    ("SI", 19),
    ("SK", 24),
    ("SM", 27),
];

/// A validated IBAN, stored in electronic form (uppercase, no spaces).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iban {
    value: String,
}

impl Iban {
    /// Parse and validate an IBAN. Spaces are ignored, case is folded.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if value.len() < 4
            || !value.bytes().all(|b| b.is_ascii_alphanumeric())
            || !value[..2].bytes().all(|b| b.is_ascii_uppercase())
            || !value[2..4].bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ValidationError::with_rule(
                "iban",
                format!("'{input}' is not structured as an IBAN"),
                "iban_format",
            ));
        }

        let country = &value[..2];
        let expected = expected_length(country).ok_or_else(|| {
            ValidationError::with_rule(
                "iban",
                format!("unsupported IBAN country '{country}'"),
                "iban_country",
            )
        })?;
        if value.len() != expected {
            return Err(ValidationError::with_rule(
                "iban",
                format!(
                    "'{input}' has length {}, {country} requires {expected}",
                    value.len()
                ),
                "iban_length",
            ));
        }

        if mod97(&value[4..], country, &value[2..4]) != 1 {
            return Err(ValidationError::with_rule(
                "iban",
                format!("'{input}' fails the mod-97 check"),
                "iban_checksum",
            ));
        }

        Ok(Iban { value })
    }

    /// Build an IBAN from country code and BBAN by computing the check
    /// digits. The BBAN must already have the country's exact length.
    pub fn synthesize(country: &str, bban: &str) -> Result<Self, ValidationError> {
        let country = country.to_ascii_uppercase();
        let bban = bban.to_ascii_uppercase();
        let expected = expected_length(&country).ok_or_else(|| {
            ValidationError::with_rule(
                "iban",
                format!("unsupported IBAN country '{country}'"),
                "iban_country",
            )
        })?;
        if bban.len() + 4 != expected || !bban.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ValidationError::with_rule(
                "iban",
                format!("BBAN '{bban}' does not fit the {country} layout"),
                "iban_length",
            ));
        }

        let check = 98 - mod97(&bban, &country, "00");
        Ok(Iban {
            value: format!("{country}{check:02}{bban}"),
        })
    }

    /// The 2-letter country code.
    pub fn country_code(&self) -> &str {
        &self.value[..2]
    }

    /// The national account part after country and check digits.
    pub fn bban(&self) -> &str {
        &self.value[4..]
    }

    /// Electronic form: uppercase, no separators.
    pub fn electronic(&self) -> &str {
        &self.value
    }
}

fn expected_length(country: &str) -> Option<usize> {
    IBAN_LENGTHS
        .binary_search_by_key(&country, |&(code, _)| code)
        .ok()
        .map(|idx| IBAN_LENGTHS[idx].1)
}

/// Remainder of the rearranged, letter-expanded number modulo 97.
/// Streams digit by digit so arbitrary lengths need no big integers.
fn mod97(bban: &str, country: &str, check: &str) -> u32 {
    let mut rem: u32 = 0;
    for b in bban.bytes().chain(country.bytes()).chain(check.bytes()) {
        if b.is_ascii_digit() {
            rem = (rem * 10 + u32::from(b - b'0')) % 97;
        } else {
            rem = (rem * 100 + u32::from(b - b'A') + 10) % 97;
        }
    }
    rem
}

impl fmt::Display for Iban {
    /// Paper form: groups of four separated by spaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.value.chars().enumerate() {
            if i > 0 && i % 4 == 0 {
                f.write_str(" ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Iban {
    type Error = ValidationError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Iban::parse(&value)
    }
}

impl From<Iban> for String {
    fn from(iban: Iban) -> String {
        iban.value
    }
}

/// A validated BIC: 4-letter bank code, 2-letter country, 2-alphanumeric
/// location, optional 3-alphanumeric branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bic {
    value: String,
}

impl Bic {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = input.trim().to_ascii_uppercase();
        let bytes = value.as_bytes();
        let well_formed = matches!(bytes.len(), 8 | 11)
            && bytes[..6].iter().all(|b| b.is_ascii_uppercase())
            && bytes[6..].iter().all(|b| b.is_ascii_alphanumeric());
        if !well_formed {
            return Err(ValidationError::with_rule(
                "bic",
                format!("'{input}' is not an 8- or 11-character BIC"),
                "bic_format",
            ));
        }
        Ok(Bic { value })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Bic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl TryFrom<String> for Bic {
    type Error = ValidationError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Bic::parse(&value)
    }
}

impl From<Bic> for String {
    fn from(bic: Bic) -> String {
        bic.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_austrian_iban() {
        let iban = Iban::parse("AT611904300234573201").unwrap();
        assert_eq!(iban.country_code(), "AT");
        assert_eq!(iban.bban(), "1904300234573201");
        assert_eq!(iban.electronic(), "AT611904300234573201");
    }

    #[test]
    fn checksum_failure() {
        let err = Iban::parse("AT611904300234573202").unwrap_err();
        assert_eq!(err.rule.as_deref(), Some("iban_checksum"));
    }

    #[test]
    fn paper_form_accepted() {
        let iban = Iban::parse("AT61 1904 3002 3457 3201").unwrap();
        assert_eq!(iban.electronic(), "AT611904300234573201");
        assert_eq!(iban.to_string(), "AT61 1904 3002 3457 3201");
    }

    #[test]
    fn foreign_ibans() {
        assert!(Iban::parse("DE89370400440532013000").is_ok());
        assert!(Iban::parse("GB29NWBK60161331926819").is_ok());
    }

    #[test]
    fn length_mismatch() {
        let err = Iban::parse("AT61190430023457320").unwrap_err();
        assert_eq!(err.rule.as_deref(), Some("iban_length"));
    }

    #[test]
    fn unknown_country() {
        let err = Iban::parse("XX611904300234573201").unwrap_err();
        assert_eq!(err.rule.as_deref(), Some("iban_country"));
    }

    #[test]
    fn malformed_inputs() {
        assert!(Iban::parse("").is_err());
        assert!(Iban::parse("AT6!1904300234573201").is_err());
        assert!(Iban::parse("A1611904300234573201").is_err());
        assert!(Iban::parse("ATAA1904300234573201").is_err());
    }

    #[test]
    fn synthesis_matches_known_check_digits() {
        let iban = Iban::synthesize("AT", "1904300234573201").unwrap();
        assert_eq!(iban.electronic(), "AT611904300234573201");
        assert!(Iban::parse(iban.electronic()).is_ok());
    }

    #[test]
    fn synthesis_rejects_wrong_bban_length() {
        assert!(Iban::synthesize("AT", "190430023457320").is_err());
    }

    #[test]
    fn single_digit_mutation_detected() {
        let valid = "AT611904300234573201";
        for pos in 4..valid.len() {
            let mut bytes = valid.as_bytes().to_vec();
            bytes[pos] = if bytes[pos] == b'9' { b'0' } else { bytes[pos] + 1 };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(Iban::parse(&mutated).is_err(), "mutation at {pos} undetected");
        }
    }

    #[test]
    fn length_table_is_sorted() {
        for window in IBAN_LENGTHS.windows(2) {
            assert!(window[0].0 < window[1].0);
        }
    }

    // --- BIC ---

    #[test]
    fn valid_bics() {
        assert!(Bic::parse("GIBAATWW").is_ok());
        assert!(Bic::parse("GIBAATWWXXX").is_ok());
        assert_eq!(Bic::parse("gibaatww").unwrap().as_str(), "GIBAATWW");
    }

    #[test]
    fn invalid_bics() {
        assert!(Bic::parse("GIBAATW").is_err());
        assert!(Bic::parse("GIBAATWWXX").is_err());
        assert!(Bic::parse("G1BAATWW").is_err());
        assert!(Bic::parse("GIBA12WW").is_err());
    }
}
