#![cfg(feature = "elda")]

use chrono::NaiveDate;
use fiskal::core::Amount;
use fiskal::elda::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn anmeldung() -> Anmeldung {
    AnmeldungBuilder::new("1234150189", "Huber", "Anna")
        .unwrap()
        .birth_date(date(1989, 1, 15))
        .employer_account("1234567890")
        .start_date(date(2025, 9, 1))
        .employment_type(EmploymentType::Angestellt)
        .hours_per_week(dec!(38.5))
        .gross_pay(Amount::from_cents(320_000))
        .build()
        .unwrap()
}

fn abmeldung() -> Abmeldung {
    AbmeldungBuilder::new("1234150189", "Huber", "Anna")
        .unwrap()
        .employer_account("1234567890")
        .exit_date(date(2026, 2, 28))
        .reason(AbmeldungReason::KuendigungDienstnehmer)
        .vacation_compensation(Amount::from_cents(95_000))
        .build()
        .unwrap()
}

#[test]
fn valid_declarations_pass() {
    assert!(validate_anmeldung(&anmeldung()).is_empty());
    assert!(validate_abmeldung(&abmeldung()).is_empty());
}

#[test]
fn svnr_must_embed_the_birth_date() {
    let mut declaration = anmeldung();
    declaration.birth_date = date(1990, 6, 1);
    let errors = validate_anmeldung(&declaration);
    assert!(
        errors
            .iter()
            .any(|e| e.rule.as_deref() == Some("svnr_birth_date_mismatch"))
    );
}

#[test]
fn builder_rejects_bad_svnr() {
    assert!(AnmeldungBuilder::new("1234150180", "Huber", "Anna").is_err());
    assert!(AbmeldungBuilder::new("123", "Huber", "Anna").is_err());
}

#[test]
fn employer_account_must_be_numeric() {
    let mut declaration = anmeldung();
    declaration.employer_account = "12A4".into();
    assert!(!validate_anmeldung(&declaration).is_empty());
}

#[test]
fn anmeldung_xml_round_trip() {
    let original = anmeldung();
    let xml = to_anmeldung_xml(&original).unwrap();
    assert!(xml.contains("<EldaMeldung art=\"anmeldung\">"));
    assert!(xml.contains("<Svnr>1234150189</Svnr>"));
    assert!(xml.contains("<Familienname>Huber</Familienname>"));
    assert!(xml.contains("<Beschaeftigungsart>AN</Beschaeftigungsart>"));

    match from_elda_xml(&xml).unwrap() {
        EldaMeldung::Anmeldung(decoded) => assert_eq!(decoded, original),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn abmeldung_xml_round_trip() {
    let original = abmeldung();
    let xml = to_abmeldung_xml(&original).unwrap();
    assert!(xml.contains("<EldaMeldung art=\"abmeldung\">"));
    assert!(xml.contains("<Grund>KDN</Grund>"));

    match from_elda_xml(&xml).unwrap() {
        EldaMeldung::Abmeldung(decoded) => {
            assert_eq!(decoded, original);
            assert_eq!(decoded.severance, None);
            assert_eq!(decoded.vacation_compensation, Some(Amount::from_cents(95_000)));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn fractional_hours_survive_the_wire() {
    let mut declaration = anmeldung();
    declaration.hours_per_week = dec!(20.25);
    let xml = to_anmeldung_xml(&declaration).unwrap();
    match from_elda_xml(&xml).unwrap() {
        EldaMeldung::Anmeldung(decoded) => assert_eq!(decoded.hours_per_week, dec!(20.25)),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn unknown_art_fails_to_decode() {
    assert!(from_elda_xml("<EldaMeldung art=\"storno\"></EldaMeldung>").is_err());
}

#[test]
fn reason_codes_are_stable() {
    assert_eq!(AbmeldungReason::KuendigungDienstgeber.code(), "KDG");
    assert_eq!(AbmeldungReason::Pensionierung.code(), "PEN");
    assert_eq!(AbmeldungReason::from_code("TOD"), Some(AbmeldungReason::Tod));
    assert_eq!(AbmeldungReason::from_code("XYZ"), None);
}
