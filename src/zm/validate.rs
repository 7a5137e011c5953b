//! Business-rule validation for recapitulative statements.

use crate::core::{ValidationError, is_eu_member};

use super::types::Zm;

/// Validate a recapitulative statement. Returns all violations.
pub fn validate_zm(zm: &Zm) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !(2000..=2100).contains(&zm.year) {
        errors.push(ValidationError::with_rule(
            "year",
            format!("year {} is outside the accepted range 2000..=2100", zm.year),
            "year",
        ));
    }
    if !(1..=4).contains(&zm.quarter) {
        errors.push(ValidationError::with_rule(
            "quarter",
            format!("quarter {} is not in 1..=4", zm.quarter),
            "quarter",
        ));
    }
    if zm.entries.is_empty() {
        errors.push(ValidationError::with_rule(
            "entries",
            "a statement needs at least one position",
            "entries_empty",
        ));
    }

    for (i, entry) in zm.entries.iter().enumerate() {
        let field = |name: &str| format!("entries[{i}].{name}");

        if entry.country_code == "AT" {
            errors.push(ValidationError::with_rule(
                field("country_code"),
                "intra-Community positions cannot target AT",
                "country_code",
            ));
        } else if !is_eu_member(&entry.country_code) {
            errors.push(ValidationError::with_rule(
                field("country_code"),
                format!("'{}' is not an EU member state", entry.country_code),
                "country_code",
            ));
        }

        if entry.partner_uid.is_austrian() {
            errors.push(ValidationError::with_rule(
                field("partner_uid"),
                "partner UID must not carry the AT prefix",
                "country_code",
            ));
        }

        if entry.amount.cents() <= 0 {
            errors.push(ValidationError::with_rule(
                field("amount"),
                format!("amount must be positive, got {}", entry.amount),
                "amount_positive",
            ));
        }
    }

    errors
}
