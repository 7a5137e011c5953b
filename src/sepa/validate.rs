//! Business-rule validation for SEPA batches.

use std::collections::HashSet;

use crate::core::ValidationError;

use super::types::{CreditTransferBatch, DirectDebitBatch};

/// Validate a credit-transfer batch. Returns all violations.
pub fn validate_credit_transfer(batch: &CreditTransferBatch) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_header(&mut errors, &batch.message_id, &batch.debtor_name, "debtor_name");
    if batch.transactions.is_empty() {
        errors.push(ValidationError::with_rule(
            "transactions",
            "a batch needs at least one transaction",
            "transactions_empty",
        ));
    }

    let mut seen = HashSet::new();
    for (i, tx) in batch.transactions.iter().enumerate() {
        let field = |name: &str| format!("transactions[{i}].{name}");
        if tx.amount.cents() <= 0 {
            errors.push(ValidationError::with_rule(
                field("amount"),
                format!("amount must be positive, got {}", tx.amount),
                "amount_positive",
            ));
        }
        if tx.creditor_name.trim().is_empty() {
            errors.push(ValidationError::with_rule(
                field("creditor_name"),
                "creditor name is required",
                "name_missing",
            ));
        }
        if !seen.insert(tx.end_to_end_id.as_str()) {
            errors.push(ValidationError::with_rule(
                field("end_to_end_id"),
                format!("end-to-end id '{}' is not unique", tx.end_to_end_id),
                "end_to_end_unique",
            ));
        }
    }
    errors
}

/// Validate a direct-debit batch. Returns all violations.
pub fn validate_direct_debit(batch: &DirectDebitBatch) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_header(&mut errors, &batch.message_id, &batch.creditor_name, "creditor_name");
    if batch.creditor_id.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "creditor_id",
            "SEPA creditor identifier is required",
            "creditor_id_missing",
        ));
    }
    if batch.transactions.is_empty() {
        errors.push(ValidationError::with_rule(
            "transactions",
            "a batch needs at least one transaction",
            "transactions_empty",
        ));
    }

    let mut seen = HashSet::new();
    for (i, tx) in batch.transactions.iter().enumerate() {
        let field = |name: &str| format!("transactions[{i}].{name}");
        if tx.amount.cents() <= 0 {
            errors.push(ValidationError::with_rule(
                field("amount"),
                format!("amount must be positive, got {}", tx.amount),
                "amount_positive",
            ));
        }
        if tx.debtor_name.trim().is_empty() {
            errors.push(ValidationError::with_rule(
                field("debtor_name"),
                "debtor name is required",
                "name_missing",
            ));
        }
        if tx.mandate_id.trim().is_empty() {
            errors.push(ValidationError::with_rule(
                field("mandate_id"),
                "mandate id is required",
                "mandate_missing",
            ));
        }
        if !seen.insert(tx.end_to_end_id.as_str()) {
            errors.push(ValidationError::with_rule(
                field("end_to_end_id"),
                format!("end-to-end id '{}' is not unique", tx.end_to_end_id),
                "end_to_end_unique",
            ));
        }
    }
    errors
}

fn check_header(
    errors: &mut Vec<ValidationError>,
    message_id: &str,
    party_name: &str,
    party_field: &str,
) {
    if message_id.trim().is_empty() || message_id.len() > 35 {
        errors.push(ValidationError::with_rule(
            "message_id",
            "message id must be 1..=35 characters",
            "message_id",
        ));
    }
    if party_name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            party_field,
            "initiating party name is required",
            "name_missing",
        ));
    }
}
