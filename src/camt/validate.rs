//! Consistency checks for ingested statements.

use crate::core::ValidationError;

use super::types::BankStatement;

/// Check that the closing balance equals the opening balance plus the
/// signed sum of all booked entries. Skipped when either balance is
/// absent from the statement.
pub fn validate_statement(statement: &BankStatement) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let (Some(opening), Some(closing)) =
        (&statement.opening_balance, &statement.closing_balance)
    {
        let expected = opening.signed() + statement.booked_total();
        if closing.signed() != expected {
            errors.push(ValidationError::with_rule(
                "closing_balance",
                format!(
                    "closing balance {} does not match opening {} plus booked total {}",
                    closing.signed(),
                    opening.signed(),
                    statement.booked_total()
                ),
                "balance_consistency",
            ));
        }
    }

    errors
}
