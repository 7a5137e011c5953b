//! Invoice totalling.
//!
//! Line total = round_half_even(unit_price · quantity). Lines group by
//! (category, rate) preserving first-seen order; per group the tax is
//! round_half_even(taxable · rate / 100). Gross = net + tax; nothing in
//! scope adds document-level charges, so payable = gross.

use rust_decimal::Decimal;

use crate::core::Amount;

use super::types::{Invoice, TaxCategory, TaxSubtotal, Totals};

/// Compute line totals, the per-(category, rate) tax breakdown, and the
/// document totals. Running it again on its own output changes nothing.
pub fn calc_totals(invoice: &mut Invoice) {
    let mut groups: Vec<(TaxCategory, Decimal, Amount)> = Vec::new();

    for line in &mut invoice.lines {
        let total = Amount::round_from_decimal(line.unit_price.to_decimal() * line.quantity);
        line.total = Some(total);

        match groups
            .iter_mut()
            .find(|(cat, rate, _)| *cat == line.tax_category && *rate == line.tax_rate)
        {
            Some((_, _, taxable)) => *taxable += total,
            None => groups.push((line.tax_category, line.tax_rate, total)),
        }
    }

    let subtotals: Vec<TaxSubtotal> = groups
        .into_iter()
        .map(|(category, rate, taxable)| TaxSubtotal {
            category,
            rate,
            taxable,
            tax: taxable.percent(rate),
        })
        .collect();

    let net: Amount = subtotals.iter().map(|s| s.taxable).sum();
    let tax: Amount = subtotals.iter().map(|s| s.tax).sum();
    let gross = net + tax;

    invoice.totals = Some(Totals {
        net,
        tax,
        gross,
        payable: gross,
        subtotals,
    });
}
