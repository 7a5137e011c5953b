//! Business-rule validation for ELDA declarations.

use crate::core::ValidationError;

use super::types::{Abmeldung, Anmeldung};

/// Validate an on-boarding declaration. Returns all violations.
pub fn validate_anmeldung(a: &Anmeldung) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !a.svnr.matches_birth_date(a.birth_date) {
        errors.push(ValidationError::with_rule(
            "birth_date",
            format!(
                "birth date {} does not match the one embedded in svnr {}",
                a.birth_date, a.svnr
            ),
            "svnr_birth_date_mismatch",
        ));
    }
    check_person(&mut errors, &a.last_name, &a.first_name);
    check_employer_account(&mut errors, &a.employer_account);

    if a.hours_per_week.is_sign_negative() {
        errors.push(ValidationError::with_rule(
            "hours_per_week",
            format!("weekly hours must not be negative, got {}", a.hours_per_week),
            "hours_negative",
        ));
    }
    if a.gross_pay.is_negative() {
        errors.push(ValidationError::with_rule(
            "gross_pay",
            format!("gross pay must not be negative, got {}", a.gross_pay),
            "gross_pay_negative",
        ));
    }

    errors
}

/// Validate an off-boarding declaration. Returns all violations.
pub fn validate_abmeldung(a: &Abmeldung) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_person(&mut errors, &a.last_name, &a.first_name);
    check_employer_account(&mut errors, &a.employer_account);

    for (field, amount) in [
        ("severance", a.severance),
        ("vacation_compensation", a.vacation_compensation),
    ] {
        if let Some(amount) = amount
            && amount.is_negative()
        {
            errors.push(ValidationError::with_rule(
                field,
                format!("{field} must not be negative, got {amount}"),
                "payment_negative",
            ));
        }
    }

    errors
}

fn check_person(errors: &mut Vec<ValidationError>, last_name: &str, first_name: &str) {
    if last_name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "last_name",
            "last name is required",
            "name_missing",
        ));
    }
    if first_name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "first_name",
            "first name is required",
            "name_missing",
        ));
    }
}

fn check_employer_account(errors: &mut Vec<ValidationError>, account: &str) {
    if account.is_empty() || !account.bytes().all(|b| b.is_ascii_digit()) {
        errors.push(ValidationError::with_rule(
            "employer_account",
            format!("'{account}' is not a numeric contribution-account number"),
            "employer_account",
        ));
    }
}
