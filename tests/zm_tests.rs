#![cfg(feature = "zm")]

use fiskal::core::Amount;
use fiskal::zm::*;

/// Seed scenario: 2025 Q1, goods to DE and services to FR, 7 500 EUR total.
fn quarterly() -> Zm {
    ZmBuilder::new(2025, 1)
        .add_entry("DE123456789", "DE", DeliveryType::Goods, Amount::from_euro(5_000))
        .unwrap()
        .add_entry("FR12345678901", "FR", DeliveryType::Services, Amount::from_euro(2_500))
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn totals_and_validation() {
    let zm = quarterly();
    assert_eq!(zm.total_amount(), Amount::from_euro(7_500));
    assert_eq!(zm.entries.len(), 2);
    assert!(validate_zm(&zm).is_empty());
}

#[test]
fn austrian_destination_fails_country_code() {
    let zm = ZmBuilder::new(2025, 1)
        .add_entry("DE123456789", "AT", DeliveryType::Goods, Amount::from_euro(100))
        .unwrap()
        .build_unchecked();
    let errors = validate_zm(&zm);
    assert!(errors.iter().any(|e| e.rule.as_deref() == Some("country_code")));
}

#[test]
fn build_rejects_invalid_statements() {
    assert!(ZmBuilder::new(2025, 1).build().is_err());
    assert!(
        ZmBuilder::new(2025, 5)
            .add_entry("DE123456789", "DE", DeliveryType::Goods, Amount::from_euro(1))
            .unwrap()
            .build()
            .is_err()
    );
}

#[test]
fn status_machine_is_monotone() {
    let mut zm = quarterly();
    assert_eq!(zm.status, ZmStatus::Draft);

    zm.mark_submitted("2025-000777").unwrap();
    assert!(matches!(&zm.status, ZmStatus::Submitted { reference } if reference == "2025-000777"));

    // accepted is terminal
    zm.mark_accepted().unwrap();
    assert!(matches!(&zm.status, ZmStatus::Accepted { reference } if reference == "2025-000777"));
    assert!(zm.mark_submitted("again").is_err());
    assert!(zm.mark_rejected().is_err());
}

#[test]
fn draft_cannot_be_accepted_directly() {
    let mut zm = quarterly();
    assert!(zm.mark_accepted().is_err());
    assert!(zm.mark_rejected().is_err());
}

#[test]
fn rejected_statement_reopens_as_a_new_draft() {
    let mut zm = quarterly();
    zm.mark_submitted("R-1").unwrap();
    zm.mark_rejected().unwrap();
    assert!(matches!(&zm.status, ZmStatus::Rejected { reference } if reference == "R-1"));

    let copy = zm.reopen_rejected().unwrap();
    assert_eq!(copy.status, ZmStatus::Draft);
    assert_eq!(copy.entries, zm.entries);
    // original stays rejected
    assert!(matches!(&zm.status, ZmStatus::Rejected { .. }));

    assert!(quarterly().reopen_rejected().is_err());
}

#[test]
fn xml_round_trip() {
    let zm = quarterly();
    let xml = to_zm_xml(&zm).unwrap();
    assert!(xml.contains("<Jahr>2025</Jahr>"));
    assert!(xml.contains("<Quartal>1</Quartal>"));
    assert!(xml.contains("<PartnerUid>DE123456789</PartnerUid>"));
    assert!(xml.contains("<Art>L</Art>"));
    assert!(xml.contains("<Betrag>5000.00</Betrag>"));

    let decoded = from_zm_xml(&xml).unwrap();
    assert_eq!(decoded.year, zm.year);
    assert_eq!(decoded.quarter, zm.quarter);
    assert_eq!(decoded.entries, zm.entries);
    // submission status never travels on the wire
    assert_eq!(decoded.status, ZmStatus::Draft);
}

#[test]
fn csv_ingest_minor_units() {
    let csv = "partner_uid,country_code,delivery_type,amount\n\
               DE123456789,DE,L,500000\n\
               FR12345678901,FR,S,250000\n";
    let entries = entries_from_csv(csv).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].amount, Amount::from_euro(5_000));
    assert_eq!(entries[1].delivery_type, DeliveryType::Services);

    let zm = entries
        .into_iter()
        .fold(ZmBuilder::new(2025, 1), ZmBuilder::push_entry)
        .build()
        .unwrap();
    assert_eq!(zm.total_amount(), Amount::from_euro(7_500));
}

#[test]
fn csv_errors_name_the_row() {
    let err = entries_from_csv(
        "partner_uid,country_code,delivery_type,amount\nDE123456789,DE,X,100\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("row 2"), "{err}");
}
