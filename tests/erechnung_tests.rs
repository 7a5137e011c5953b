#![cfg(feature = "erechnung")]

use chrono::NaiveDate;
use fiskal::core::Amount;
use fiskal::erechnung::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seller() -> Party {
    PartyBuilder::new(
        "Muster GmbH",
        AddressBuilder::new("Wien", "1010", "AT")
            .street("Opernring 1")
            .build(),
    )
    .vat_id("ATU12345678")
    .email("office@muster.at")
    .build()
}

fn buyer() -> Party {
    PartyBuilder::new("Kunde AG", AddressBuilder::new("Graz", "8010", "AT").build())
        .vat_id("ATU87654321")
        .build()
}

fn invoice() -> Invoice {
    InvoiceBuilder::new("R2025-042", date(2025, 3, 1))
        .due_date(date(2025, 3, 31))
        .seller(seller())
        .buyer(buyer())
        .add_line(
            LineBuilder::new("1", "Beratung", dec!(8), "HUR", Amount::from_cents(12_000))
                .tax(TaxCategory::Standard, dec!(20))
                .build(),
        )
        .add_line(
            LineBuilder::new("2", "Fachbuch", dec!(3), "H87", Amount::from_cents(4_990))
                .tax(TaxCategory::Reduced, dec!(10))
                .build(),
        )
        .build()
        .unwrap()
}

#[test]
fn build_derives_totals() {
    let invoice = invoice();
    let totals = invoice.totals.as_ref().unwrap();
    // 8 * 120.00 + 3 * 49.90 = 960.00 + 149.70
    assert_eq!(totals.net, Amount::from_cents(110_970));
    // 20% of 960.00 + 10% of 149.70 = 192.00 + 14.97
    assert_eq!(totals.tax, Amount::from_cents(20_697));
    assert_eq!(totals.gross, Amount::from_cents(131_667));
    assert_eq!(totals.payable, totals.gross);
    assert!(validate_invoice(&invoice).is_empty());
}

#[test]
fn subtotals_group_by_category_and_rate_in_first_seen_order() {
    let invoice = invoice();
    let subtotals = &invoice.totals.as_ref().unwrap().subtotals;
    assert_eq!(subtotals.len(), 2);
    assert_eq!(subtotals[0].rate, dec!(20));
    assert_eq!(subtotals[0].taxable, Amount::from_cents(96_000));
    assert_eq!(subtotals[1].rate, dec!(10));
    assert_eq!(subtotals[1].tax, Amount::from_cents(1_497));
}

#[test]
fn calc_totals_is_idempotent() {
    let mut invoice = invoice();
    let first = invoice.totals.clone();
    calc_totals(&mut invoice);
    calc_totals(&mut invoice);
    assert_eq!(invoice.totals, first);
}

#[test]
fn zero_rated_categories_require_zero_rate() {
    let invoice = InvoiceBuilder::new("R2025-043", date(2025, 3, 1))
        .seller(seller())
        .buyer(buyer())
        .add_line(
            LineBuilder::new("1", "Export", dec!(1), "H87", Amount::from_cents(10_000))
                .tax(TaxCategory::ReverseCharge, dec!(20))
                .build(),
        )
        .build_unchecked()
        .unwrap();
    assert!(
        validate_invoice(&invoice)
            .iter()
            .any(|e| e.rule.as_deref() == Some("tax_rate"))
    );
}

#[test]
fn empty_lines_fail_validation() {
    let result = InvoiceBuilder::new("R2025-044", date(2025, 3, 1))
        .seller(seller())
        .buyer(buyer())
        .build();
    assert!(result.is_err());
}

#[test]
fn ubl_rendering_carries_the_xrechnung_profile() {
    let xml = to_ubl_xml(&invoice()).unwrap();
    assert!(xml.contains(CUSTOMIZATION_ID));
    assert!(xml.contains(PROFILE_ID));
    assert!(xml.contains("<cbc:ID>R2025-042</cbc:ID>"));
    assert!(xml.contains("<cbc:InvoiceTypeCode>380</cbc:InvoiceTypeCode>"));
    assert!(xml.contains("currencyID=\"EUR\""));
}

#[test]
fn ubl_round_trip_preserves_semantic_fields() {
    let original = invoice();
    let decoded = from_ubl_xml(&to_ubl_xml(&original).unwrap()).unwrap();

    assert_eq!(decoded.number, original.number);
    assert_eq!(decoded.type_code, original.type_code);
    assert_eq!(decoded.issue_date, original.issue_date);
    assert_eq!(decoded.due_date, original.due_date);
    assert_eq!(decoded.currency_code, original.currency_code);
    assert_eq!(decoded.seller.name, original.seller.name);
    assert_eq!(decoded.seller.vat_id, original.seller.vat_id);
    assert_eq!(decoded.buyer.name, original.buyer.name);
    assert_eq!(decoded.lines.len(), original.lines.len());
    for (d, o) in decoded.lines.iter().zip(&original.lines) {
        assert_eq!(d.quantity, o.quantity);
        assert_eq!(d.unit_price, o.unit_price);
        assert_eq!(d.tax_category, o.tax_category);
        assert_eq!(d.tax_rate, o.tax_rate);
    }
    assert_eq!(decoded.totals, original.totals);
}

#[test]
fn cii_round_trip_preserves_semantic_fields() {
    let original = invoice();
    let xml = to_cii_xml(&original).unwrap();
    assert!(xml.contains("CrossIndustryInvoice"));
    assert!(xml.contains("<udt:DateTimeString format=\"102\">20250301</udt:DateTimeString>"));

    let decoded = from_cii_xml(&xml).unwrap();
    assert_eq!(decoded.number, original.number);
    assert_eq!(decoded.lines.len(), 2);
    assert_eq!(decoded.totals, original.totals);
}

#[test]
fn credit_note_type_code() {
    let credit = InvoiceBuilder::new("G2025-001", date(2025, 4, 1))
        .type_code(InvoiceTypeCode::CreditNote)
        .seller(seller())
        .buyer(buyer())
        .add_line(
            LineBuilder::new("1", "Gutschrift", dec!(1), "H87", Amount::from_cents(5_000))
                .tax(TaxCategory::Standard, dec!(20))
                .build(),
        )
        .build()
        .unwrap();
    let xml = to_ubl_xml(&credit).unwrap();
    assert!(xml.contains("381"));
}

#[test]
fn parser_rejects_malformed_documents() {
    assert!(from_ubl_xml("<Invoice").is_err());
    assert!(from_cii_xml("").is_err());
}

#[test]
fn number_sequence_is_gapless_with_year_rollover() {
    let mut seq = NumberSequence::new("R", 2025).with_width(4);
    assert_eq!(seq.issue(), "R2025-0001");
    assert_eq!(seq.issue(), "R2025-0002");
    assert!(seq.roll_over(date(2026, 1, 1)));
    assert_eq!(seq.issue(), "R2026-0001");
    assert!(seq.advance_year(2025).is_err());
}
