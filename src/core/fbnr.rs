//! Austrian companies-register numbers (Firmenbuchnummer).
//!
//! Canonical form is the uppercase `FN` prefix, one to nine digits, and a
//! single lowercase check letter, e.g. `FN123456a`. Input is accepted with
//! or without the prefix and in any letter case.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// A validated companies-register number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FnNr {
    digits: String,
    suffix: char,
}

impl FnNr {
    /// Parse and normalize a register number.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let rest = trimmed
            .strip_prefix("FN")
            .or_else(|| trimmed.strip_prefix("fn"))
            .or_else(|| trimmed.strip_prefix("Fn"))
            .unwrap_or(trimmed)
            .trim_start();

        let malformed = || {
            ValidationError::with_rule(
                "fn",
                format!("'{input}' is not a register number (FN + 1-9 digits + letter)"),
                "fn_format",
            )
        };

        let mut chars = rest.chars();
        let suffix = chars.next_back().ok_or_else(malformed)?;
        if !suffix.is_ascii_alphabetic() {
            return Err(malformed());
        }
        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        Ok(FnNr {
            digits: digits.to_string(),
            suffix: suffix.to_ascii_lowercase(),
        })
    }

    /// The numeric part without prefix or suffix.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// The lowercase check letter.
    pub fn suffix(&self) -> char {
        self.suffix
    }
}

impl fmt::Display for FnNr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FN{}{}", self.digits, self.suffix)
    }
}

impl TryFrom<String> for FnNr {
    type Error = ValidationError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        FnNr::parse(&value)
    }
}

impl From<FnNr> for String {
    fn from(nr: FnNr) -> String {
        nr.to_string()
    }
}
