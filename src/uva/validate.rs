//! Business-rule validation for advance VAT returns.

use crate::core::{Amount, ValidationError};

use super::types::{Period, Uva};

/// Validate an advance VAT return. Returns all violations, not just the first.
pub fn validate_uva(uva: &Uva) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let year = uva.period.year();
    if !(2000..=2100).contains(&year) {
        errors.push(ValidationError::with_rule(
            "period.year",
            format!("year {year} is outside the accepted range 2000..=2100"),
            "period_year",
        ));
    }
    match uva.period {
        Period::Month { month, .. } => {
            if !(1..=12).contains(&month) {
                errors.push(ValidationError::with_rule(
                    "period.month",
                    format!("month {month} is not in 1..=12"),
                    "period_month",
                ));
            }
        }
        Period::Quarter { quarter, .. } => {
            if !(1..=4).contains(&quarter) {
                errors.push(ValidationError::with_rule(
                    "period.quarter",
                    format!("quarter {quarter} is not in 1..=4"),
                    "period_quarter",
                ));
            }
        }
    }

    let boxes: [(&str, Amount); 10] = [
        ("kz000", uva.total_turnover),
        ("kz022", uva.standard_base),
        ("kz029", uva.reduced_base_10),
        ("kz006", uva.reduced_base_13),
        ("kz061", uva.import_vat),
        ("kz072", uva.ic_acquisitions),
        ("kz060", uva.input_tax),
        ("kz062", uva.import_vat_deducted),
        ("kz065", uva.ic_input_tax),
        ("kz090", uva.adjustments),
    ];
    for (field, amount) in boxes {
        if amount.is_negative() {
            errors.push(ValidationError::with_rule(
                field,
                format!("line item must not be negative, got {amount}"),
                "kz_negative",
            ));
        }
    }

    // KZ083 may be negative (refund) but must match the other line items
    let expected = uva.expected_payable();
    if uva.payable != expected {
        errors.push(ValidationError::with_rule(
            "kz083",
            format!("stored payable {} does not match computed {expected}", uva.payable),
            "kz083_identity",
        ));
    }

    errors
}
