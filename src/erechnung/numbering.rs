use chrono::{Datelike, NaiveDate};

use crate::core::FiskalError;

/// Gapless invoice number sequence.
///
/// Issues numbers of the form `{prefix}{year}-{counter}`, e.g. "R2025-001".
/// § 11 Abs 1 Z 2 UStG 1994 requires consecutive numbering; the sequence
/// only ever moves forward and resets the counter when the year rolls over.
#[derive(Debug, Clone)]
pub struct NumberSequence {
    prefix: String,
    year: i32,
    next: u64,
    width: usize,
}

impl NumberSequence {
    /// Start a fresh sequence at 1.
    pub fn new(prefix: impl Into<String>, year: i32) -> Self {
        Self {
            prefix: prefix.into(),
            year,
            next: 1,
            width: 3,
        }
    }

    /// Resume a sequence, e.g. after loading the last issued number
    /// from persistent storage.
    pub fn resuming_at(prefix: impl Into<String>, year: i32, next: u64) -> Self {
        Self {
            prefix: prefix.into(),
            year,
            next,
            width: 3,
        }
    }

    /// Set the zero-padding width of the counter (default 3, "001").
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Issue the next number, consuming it.
    pub fn issue(&mut self) -> String {
        let number = self.format(self.next);
        self.next += 1;
        number
    }

    /// Preview the next number without consuming it.
    pub fn peek(&self) -> String {
        self.format(self.next)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The raw counter value the next call to [`issue`](Self::issue) uses.
    pub fn upcoming(&self) -> u64 {
        self.next
    }

    /// Move the sequence to a later year, resetting the counter to 1.
    pub fn advance_year(&mut self, year: i32) -> Result<(), FiskalError> {
        if year <= self.year {
            return Err(FiskalError::Numbering(format!(
                "year {year} is not after current sequence year {}",
                self.year
            )));
        }
        self.year = year;
        self.next = 1;
        Ok(())
    }

    /// Roll the sequence over if `date` falls into a later year.
    /// Returns whether a rollover happened.
    pub fn roll_over(&mut self, date: NaiveDate) -> bool {
        if date.year() > self.year {
            self.year = date.year();
            self.next = 1;
            true
        } else {
            false
        }
    }

    fn format(&self, counter: u64) -> String {
        format!(
            "{}{}-{:0>width$}",
            self.prefix,
            self.year,
            counter,
            width = self.width
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_consecutive_numbers() {
        let mut seq = NumberSequence::new("R", 2025);
        assert_eq!(seq.issue(), "R2025-001");
        assert_eq!(seq.issue(), "R2025-002");
        assert_eq!(seq.issue(), "R2025-003");
    }

    #[test]
    fn peek_does_not_consume() {
        let mut seq = NumberSequence::new("R", 2025);
        assert_eq!(seq.peek(), "R2025-001");
        assert_eq!(seq.peek(), "R2025-001");
        assert_eq!(seq.issue(), "R2025-001");
        assert_eq!(seq.peek(), "R2025-002");
    }

    #[test]
    fn resumes_from_stored_counter() {
        let mut seq = NumberSequence::resuming_at("RE-", 2025, 57);
        assert_eq!(seq.issue(), "RE-2025-057");
        assert_eq!(seq.issue(), "RE-2025-058");
    }

    #[test]
    fn counter_width_is_configurable() {
        let mut seq = NumberSequence::new("R", 2025).with_width(5);
        assert_eq!(seq.issue(), "R2025-00001");
    }

    #[test]
    fn year_rollover_resets_counter() {
        let mut seq = NumberSequence::new("R", 2025);
        seq.issue();
        seq.issue();

        assert!(seq.roll_over(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()));
        assert_eq!(seq.issue(), "R2026-001");

        assert!(!seq.roll_over(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
        assert_eq!(seq.issue(), "R2026-002");
    }

    #[test]
    fn advance_rejects_same_or_earlier_year() {
        let mut seq = NumberSequence::new("R", 2025);
        assert!(seq.advance_year(2024).is_err());
        assert!(seq.advance_year(2025).is_err());
        assert!(seq.advance_year(2026).is_ok());
        assert_eq!(seq.issue(), "R2026-001");
    }
}
