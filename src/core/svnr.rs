//! Austrian social-security numbers (Versicherungsnummer).
//!
//! A Versicherungsnummer is ten digits: a four-digit serial followed by the
//! holder's birth date as DDMMYY. The tenth digit doubles as check digit:
//! the weighted sum of the first nine digits (weights 3,7,9,5,8,4,2,1,6)
//! modulo 11 must equal it. A remainder of 10 cannot match any digit, so
//! such serial/date combinations are never issued.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Check-digit weights over the first nine digits.
const WEIGHTS: [u32; 9] = [3, 7, 9, 5, 8, 4, 2, 1, 6];

/// A validated Austrian social-security number.
///
/// Canonical display groups serial and birth date: `1234 150189`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Svnr {
    digits: [u8; 10],
}

impl Svnr {
    /// Parse and validate a social-security number.
    ///
    /// Accepts the compact form (`1234150189`) and the canonical grouped
    /// form (`1234 150189`).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.len() != 10 || !compact.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::with_rule(
                "svnr",
                format!("'{input}' is not a 10-digit social-security number"),
                "svnr_format",
            ));
        }

        let mut digits = [0u8; 10];
        for (i, b) in compact.bytes().enumerate() {
            digits[i] = b - b'0';
        }

        match check_digit(&digits) {
            Some(expected) if expected == digits[9] => {}
            _ => {
                return Err(ValidationError::with_rule(
                    "svnr",
                    format!("'{input}' fails the check-digit test"),
                    "svnr_check_digit",
                ));
            }
        }

        let svnr = Svnr { digits };
        let birth = svnr.birth_date();
        if birth.day == 0 || birth.day > 31 || birth.month == 0 || birth.month > 12 {
            return Err(ValidationError::with_rule(
                "svnr",
                format!("'{input}' embeds an implausible birth date"),
                "svnr_birth_date",
            ));
        }

        Ok(svnr)
    }

    /// Construct from a four-digit serial and a birth date.
    ///
    /// Fails when the resulting check digit does not come out: the tenth
    /// digit is fixed by the birth year, so only some serials are issuable
    /// for a given date.
    pub fn from_parts(serial: u16, birth: BirthDate) -> Result<Self, ValidationError> {
        if serial > 9999 {
            return Err(ValidationError::with_rule(
                "svnr.serial",
                format!("serial {serial} exceeds four digits"),
                "svnr_format",
            ));
        }
        let mut digits = [0u8; 10];
        digits[0] = (serial / 1000) as u8;
        digits[1] = (serial / 100 % 10) as u8;
        digits[2] = (serial / 10 % 10) as u8;
        digits[3] = (serial % 10) as u8;
        digits[4] = birth.day / 10;
        digits[5] = birth.day % 10;
        digits[6] = birth.month / 10;
        digits[7] = birth.month % 10;
        digits[8] = birth.year / 10;
        digits[9] = birth.year % 10;

        match check_digit(&digits) {
            Some(expected) if expected == digits[9] => Ok(Svnr { digits }),
            _ => Err(ValidationError::with_rule(
                "svnr",
                format!("serial {serial:04} is not issuable for birth date {birth}"),
                "svnr_check_digit",
            )),
        }
    }

    /// The four-digit serial.
    pub fn serial(&self) -> u16 {
        self.digits[..4]
            .iter()
            .fold(0u16, |acc, &d| acc * 10 + u16::from(d))
    }

    /// The embedded birth date (two-digit year, century unknown).
    pub fn birth_date(&self) -> BirthDate {
        BirthDate {
            day: self.digits[4] * 10 + self.digits[5],
            month: self.digits[6] * 10 + self.digits[7],
            year: self.digits[8] * 10 + self.digits[9],
        }
    }

    /// Whether the embedded birth date matches the given calendar date.
    /// The century is not encoded, so only day, month, and year mod 100
    /// are compared.
    pub fn matches_birth_date(&self, date: NaiveDate) -> bool {
        let embedded = self.birth_date();
        u32::from(embedded.day) == date.day()
            && u32::from(embedded.month) == date.month()
            && i32::from(embedded.year) == date.year().rem_euclid(100)
    }

    /// Compact ten-digit form without grouping.
    pub fn compact(&self) -> String {
        self.digits.iter().map(|d| (d + b'0') as char).collect()
    }
}

/// Weighted digit sum of the first nine digits mod 11; `None` when the
/// remainder is 10 (no digit can satisfy it).
fn check_digit(digits: &[u8; 10]) -> Option<u8> {
    let sum: u32 = digits[..9]
        .iter()
        .zip(WEIGHTS)
        .map(|(&d, w)| u32::from(d) * w)
        .sum();
    let rem = sum % 11;
    (rem < 10).then_some(rem as u8)
}

impl fmt::Display for Svnr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compact = self.compact();
        write!(f, "{} {}", &compact[..4], &compact[4..])
    }
}

impl TryFrom<String> for Svnr {
    type Error = ValidationError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Svnr::parse(&value)
    }
}

impl From<Svnr> for String {
    fn from(svnr: Svnr) -> String {
        svnr.compact()
    }
}

/// A birth date as embedded in a social-security number: day, month, and
/// two-digit year. Displays as `DD.MM.YY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BirthDate {
    pub day: u8,
    pub month: u8,
    pub year: u8,
}

impl BirthDate {
    /// Birth date parts of a calendar date (year truncated to two digits).
    pub fn from_date(date: NaiveDate) -> Self {
        BirthDate {
            day: date.day() as u8,
            month: date.month() as u8,
            year: date.year().rem_euclid(100) as u8,
        }
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}.{:02}", self.day, self.month, self.year)
    }
}
