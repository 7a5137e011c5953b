//! Invoice business-rule validation.
//!
//! The ruleset follows the EN 16931 semantic model as applied to Austrian
//! invoices (§ 11 UStG 1994 content requirements). Every violation carries
//! a stable rule code; an empty result is the ok verdict.

use rust_decimal::Decimal;

use crate::core::{
    is_known_country_code, is_known_currency_code, is_known_unit_code, Uid, ValidationError,
};

use super::totals::calc_totals;
use super::types::{Invoice, Party, TaxCategory};

/// Validate an invoice against the full ruleset. Pure; does not mutate.
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if invoice.number.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "number",
            "invoice number is required",
            "invoice_number",
        ));
    }

    if !is_known_currency_code(&invoice.currency_code) {
        errors.push(ValidationError::with_rule(
            "currency_code",
            format!("'{}' is not a known ISO 4217 code", invoice.currency_code),
            "currency_code",
        ));
    }

    validate_party(&invoice.seller, "seller", &mut errors);
    validate_party(&invoice.buyer, "buyer", &mut errors);

    if invoice.lines.is_empty() {
        errors.push(ValidationError::with_rule(
            "lines",
            "at least one invoice line is required",
            "lines_empty",
        ));
    }

    for (i, line) in invoice.lines.iter().enumerate() {
        let field = |name: &str| format!("lines[{i}].{name}");

        if line.id.trim().is_empty() {
            errors.push(ValidationError::with_rule(
                field("id"),
                "line id is required",
                "line_id",
            ));
        }
        if line.description.trim().is_empty() {
            errors.push(ValidationError::with_rule(
                field("description"),
                "line description is required",
                "line_description",
            ));
        }
        if line.quantity.is_zero() {
            errors.push(ValidationError::with_rule(
                field("quantity"),
                "quantity must not be zero",
                "line_quantity",
            ));
        }
        if !is_known_unit_code(&line.unit) {
            errors.push(ValidationError::with_rule(
                field("unit"),
                format!("'{}' is not a known Rec 20 unit code", line.unit),
                "line_unit",
            ));
        }
        if line.unit_price.cents() <= 0 {
            errors.push(ValidationError::with_rule(
                field("unit_price"),
                "unit price must be positive",
                "line_unit_price",
            ));
        }

        let rate_ok = if line.tax_category.requires_positive_rate() {
            line.tax_rate > Decimal::ZERO
        } else {
            line.tax_rate == Decimal::ZERO
        };
        if !rate_ok {
            errors.push(ValidationError::with_rule(
                field("tax_rate"),
                format!(
                    "rate {} conflicts with category {}",
                    line.tax_rate,
                    line.tax_category.code()
                ),
                "tax_rate",
            ));
        }
    }

    // Totals, when present, must agree with a fresh derivation.
    if invoice.totals.is_some() {
        let mut fresh = invoice.clone();
        calc_totals(&mut fresh);
        if fresh.totals != invoice.totals {
            errors.push(ValidationError::with_rule(
                "totals",
                "stored totals disagree with the derived values",
                "totals_consistent",
            ));
        }
    }

    errors
}

fn validate_party(party: &Party, role: &str, errors: &mut Vec<ValidationError>) {
    if party.name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{role}.name"),
            format!("{role} name is required"),
            "party_name",
        ));
    }
    if party.address.city.trim().is_empty() || party.address.postal_code.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{role}.address"),
            format!("{role} address needs city and postal code"),
            "party_address",
        ));
    }
    if !is_known_country_code(&party.address.country_code) {
        errors.push(ValidationError::with_rule(
            format!("{role}.address.country_code"),
            format!(
                "'{}' is not a known country code",
                party.address.country_code
            ),
            "country_code",
        ));
    }
    if let Some(vat_id) = &party.vat_id {
        if let Err(e) = Uid::parse(vat_id) {
            errors.push(ValidationError::with_rule(
                format!("{role}.vat_id"),
                e.message,
                e.rule.unwrap_or_else(|| "uid_format".into()),
            ));
        }
    }
}
