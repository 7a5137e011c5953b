//! ELDA packet rendering and parsing.
//!
//! Both declaration kinds travel as an `<EldaMeldung>` element whose `art`
//! attribute selects the variant.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::{FiskalError, Svnr};
use crate::xml::{XmlResult, XmlWriter, format_decimal, parse_amount, parse_decimal, parse_iso_date};

use super::types::{Abmeldung, AbmeldungReason, Anmeldung, EmploymentType};

/// A decoded ELDA packet.
#[derive(Debug, Clone, PartialEq)]
pub enum EldaMeldung {
    Anmeldung(Anmeldung),
    Abmeldung(Abmeldung),
}

/// Render an on-boarding declaration.
pub fn to_anmeldung_xml(a: &Anmeldung) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("EldaMeldung", &[("art", "anmeldung")])?;
    write_person(&mut w, &a.svnr, &a.last_name, &a.first_name, &a.employer_account)?;
    w.text_element("Geburtsdatum", &a.birth_date.to_string())?;
    w.text_element("Eintritt", &a.start_date.to_string())?;
    w.text_element("Beschaeftigungsart", a.employment_type.code())?;
    w.text_element("Wochenstunden", &format_decimal(a.hours_per_week))?;
    w.text_element("Entgelt", &a.gross_pay.to_string())?;
    w.end_element("EldaMeldung")?;
    w.into_string()
}

/// Render an off-boarding declaration.
pub fn to_abmeldung_xml(a: &Abmeldung) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("EldaMeldung", &[("art", "abmeldung")])?;
    write_person(&mut w, &a.svnr, &a.last_name, &a.first_name, &a.employer_account)?;
    w.text_element("Austritt", &a.exit_date.to_string())?;
    w.text_element("Grund", a.reason.code())?;
    if let Some(severance) = a.severance {
        w.text_element("Abfertigung", &severance.to_string())?;
    }
    if let Some(vacation) = a.vacation_compensation {
        w.text_element("Urlaubsersatzleistung", &vacation.to_string())?;
    }
    w.end_element("EldaMeldung")?;
    w.into_string()
}

fn write_person(
    w: &mut XmlWriter,
    svnr: &Svnr,
    last_name: &str,
    first_name: &str,
    employer_account: &str,
) -> Result<(), FiskalError> {
    w.text_element("Svnr", &svnr.compact())?;
    w.text_element("Familienname", last_name)?;
    w.text_element("Vorname", first_name)?;
    w.text_element("Beitragskontonummer", employer_account)?;
    Ok(())
}

#[derive(Default)]
struct Fields {
    art: Option<String>,
    values: Vec<(String, String)>,
}

impl Fields {
    fn take(&mut self, name: &str) -> Option<String> {
        self.values
            .iter()
            .position(|(k, _)| k == name)
            .map(|idx| self.values.remove(idx).1)
    }

    fn require(&mut self, name: &str) -> Result<String, FiskalError> {
        self.take(name)
            .ok_or_else(|| FiskalError::Codec(format!("missing element '{name}'")))
    }
}

/// Parse an ELDA packet of either kind.
pub fn from_elda_xml(xml: &str) -> Result<EldaMeldung, FiskalError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut fields = Fields::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "EldaMeldung" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"art" {
                            fields.art = Some(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                    }
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if let Some(leaf) = path.last()
                    && !text.is_empty()
                {
                    fields.values.push((leaf.clone(), text));
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FiskalError::Codec(format!("elda parse error: {e}"))),
            _ => {}
        }
    }

    let svnr = Svnr::parse(&fields.require("Svnr")?)
        .map_err(|e| FiskalError::Codec(e.to_string()))?;
    let last_name = fields.require("Familienname")?;
    let first_name = fields.require("Vorname")?;
    let employer_account = fields.require("Beitragskontonummer")?;

    match fields.art.as_deref() {
        Some("anmeldung") => {
            let art = fields.require("Beschaeftigungsart")?;
            Ok(EldaMeldung::Anmeldung(Anmeldung {
                svnr,
                last_name,
                first_name,
                birth_date: parse_iso_date(&fields.require("Geburtsdatum")?)?,
                employer_account,
                start_date: parse_iso_date(&fields.require("Eintritt")?)?,
                employment_type: EmploymentType::from_code(&art).ok_or_else(|| {
                    FiskalError::Codec(format!("unknown Beschaeftigungsart '{art}'"))
                })?,
                hours_per_week: parse_decimal(&fields.require("Wochenstunden")?)?,
                gross_pay: parse_amount(&fields.require("Entgelt")?)?,
            }))
        }
        Some("abmeldung") => {
            let grund = fields.require("Grund")?;
            Ok(EldaMeldung::Abmeldung(Abmeldung {
                svnr,
                last_name,
                first_name,
                employer_account,
                exit_date: parse_iso_date(&fields.require("Austritt")?)?,
                reason: AbmeldungReason::from_code(&grund)
                    .ok_or_else(|| FiskalError::Codec(format!("unknown Grund '{grund}'")))?,
                severance: fields.take("Abfertigung").as_deref().map(parse_amount).transpose()?,
                vacation_compensation: fields
                    .take("Urlaubsersatzleistung")
                    .as_deref()
                    .map(parse_amount)
                    .transpose()?,
            }))
        }
        Some(other) => Err(FiskalError::Codec(format!("unknown Meldung art '{other}'"))),
        None => Err(FiskalError::Codec("missing art attribute".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Amount;
    use crate::elda::{AbmeldungBuilder, AnmeldungBuilder};
    use chrono::NaiveDate;
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
            .exit_date(date(2025, 12, 31))
            .reason(AbmeldungReason::EinvernehmlicheLoesung)
            .severance(Amount::from_cents(500_000))
            .build()
            .unwrap()
    }

    #[test]
    fn anmeldung_encode_structure() {
        let xml = to_anmeldung_xml(&anmeldung()).unwrap();
        assert!(xml.contains("<EldaMeldung art=\"anmeldung\">"));
        assert!(xml.contains("<Svnr>1234150189</Svnr>"));
        assert!(xml.contains("<Geburtsdatum>1989-01-15</Geburtsdatum>"));
        assert!(xml.contains("<Beschaeftigungsart>AN</Beschaeftigungsart>"));
        assert!(xml.contains("<Wochenstunden>38.50</Wochenstunden>"));
        assert!(xml.contains("<Entgelt>3200.00</Entgelt>"));
    }

    #[test]
    fn anmeldung_round_trip() {
        let a = anmeldung();
        let decoded = from_elda_xml(&to_anmeldung_xml(&a).unwrap()).unwrap();
        assert_eq!(decoded, EldaMeldung::Anmeldung(a));
    }

    #[test]
    fn abmeldung_round_trip() {
        let a = abmeldung();
        let xml = to_abmeldung_xml(&a).unwrap();
        assert!(xml.contains("art=\"abmeldung\""));
        assert!(xml.contains("<Grund>EVL</Grund>"));
        assert!(xml.contains("<Abfertigung>5000.00</Abfertigung>"));
        assert!(!xml.contains("Urlaubsersatzleistung"));
        assert_eq!(from_elda_xml(&xml).unwrap(), EldaMeldung::Abmeldung(a));
    }

    #[test]
    fn unknown_art_is_rejected() {
        let xml = to_anmeldung_xml(&anmeldung())
            .unwrap()
            .replace("anmeldung", "ummeldung");
        assert!(from_elda_xml(&xml).is_err());
    }

    #[test]
    fn missing_required_field_is_codec_error() {
        let xml = "<EldaMeldung art=\"anmeldung\"><Svnr>1234150189</Svnr></EldaMeldung>";
        assert!(matches!(from_elda_xml(xml), Err(FiskalError::Codec(_))));
    }

    #[test]
    fn invalid_svnr_on_the_wire_is_rejected() {
        let xml = to_anmeldung_xml(&anmeldung())
            .unwrap()
            .replace("1234150189", "1234150180");
        assert!(from_elda_xml(&xml).is_err());
    }

    #[test]
    fn malformed_xml_is_codec_error() {
        assert!(from_elda_xml("<EldaMeldung><unclosed>").is_err());
    }
}
