//! U30 XML rendering and parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::{Amount, FiskalError};
use crate::xml::{XmlResult, XmlWriter, parse_amount};

use super::U30_NS;
use super::types::{Period, Uva};

/// Render an advance VAT return as a U30 document.
///
/// Every Kennzahl of the closed set is written, zero or not, so a decoded
/// document compares equal field for field.
pub fn to_u30_xml(uva: &Uva) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("Umsatzsteuervoranmeldung", &[("xmlns", U30_NS)])?;

    w.start_element("Zeitraum")?;
    w.text_element("Jahr", &uva.period.year().to_string())?;
    match uva.period {
        Period::Month { month, .. } => {
            w.text_element("Monat", &format!("{month:02}"))?;
        }
        Period::Quarter { quarter, .. } => {
            w.text_element("Quartal", &quarter.to_string())?;
        }
    }
    w.end_element("Zeitraum")?;

    w.start_element("Kennzahlen")?;
    for (tag, amount) in kennzahlen(uva) {
        w.text_element(tag, &amount.to_string())?;
    }
    w.end_element("Kennzahlen")?;

    w.end_element("Umsatzsteuervoranmeldung")?;
    w.into_string()
}

fn kennzahlen(uva: &Uva) -> [(&'static str, Amount); 11] {
    [
        ("KZ000", uva.total_turnover),
        ("KZ022", uva.standard_base),
        ("KZ029", uva.reduced_base_10),
        ("KZ006", uva.reduced_base_13),
        ("KZ061", uva.import_vat),
        ("KZ072", uva.ic_acquisitions),
        ("KZ060", uva.input_tax),
        ("KZ062", uva.import_vat_deducted),
        ("KZ065", uva.ic_input_tax),
        ("KZ090", uva.adjustments),
        ("KZ083", uva.payable),
    ]
}

/// Parse a U30 document. Kennzahlen absent from the input stay zero;
/// KZ083 is taken from the wire, not recomputed.
pub fn from_u30_xml(xml: &str) -> Result<Uva, FiskalError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut jahr: Option<String> = None;
    let mut monat: Option<String> = None;
    let mut quartal: Option<String> = None;
    let mut boxes: Vec<(String, String)> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if text.is_empty() {
                    continue;
                }
                let leaf = path.last().map(|s| s.as_str()).unwrap_or("");
                let parent = if path.len() >= 2 { path[path.len() - 2].as_str() } else { "" };
                match (parent, leaf) {
                    ("Zeitraum", "Jahr") => jahr = Some(text),
                    ("Zeitraum", "Monat") => monat = Some(text),
                    ("Zeitraum", "Quartal") => quartal = Some(text),
                    ("Kennzahlen", kz) if kz.starts_with("KZ") => {
                        boxes.push((kz.to_string(), text));
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FiskalError::Codec(format!("u30 parse error: {e}"))),
            _ => {}
        }
    }

    let year: i32 = jahr
        .ok_or_else(|| FiskalError::Codec("missing Zeitraum/Jahr".into()))?
        .parse()
        .map_err(|_| FiskalError::Codec("invalid Jahr".into()))?;
    let period = match (monat, quartal) {
        (Some(m), None) => Period::month(
            year,
            m.parse()
                .map_err(|_| FiskalError::Codec(format!("invalid Monat '{m}'")))?,
        ),
        (None, Some(q)) => Period::quarter(
            year,
            q.parse()
                .map_err(|_| FiskalError::Codec(format!("invalid Quartal '{q}'")))?,
        ),
        (Some(_), Some(_)) => {
            return Err(FiskalError::Codec(
                "Zeitraum carries both Monat and Quartal".into(),
            ));
        }
        (None, None) => {
            return Err(FiskalError::Codec(
                "Zeitraum carries neither Monat nor Quartal".into(),
            ));
        }
    };

    let mut uva = Uva {
        period,
        total_turnover: Amount::ZERO,
        standard_base: Amount::ZERO,
        reduced_base_10: Amount::ZERO,
        reduced_base_13: Amount::ZERO,
        import_vat: Amount::ZERO,
        ic_acquisitions: Amount::ZERO,
        input_tax: Amount::ZERO,
        import_vat_deducted: Amount::ZERO,
        ic_input_tax: Amount::ZERO,
        adjustments: Amount::ZERO,
        payable: Amount::ZERO,
    };
    for (kz, raw) in boxes {
        let amount = parse_amount(&raw)?;
        match kz.as_str() {
            "KZ000" => uva.total_turnover = amount,
            "KZ022" => uva.standard_base = amount,
            "KZ029" => uva.reduced_base_10 = amount,
            "KZ006" => uva.reduced_base_13 = amount,
            "KZ061" => uva.import_vat = amount,
            "KZ072" => uva.ic_acquisitions = amount,
            "KZ060" => uva.input_tax = amount,
            "KZ062" => uva.import_vat_deducted = amount,
            "KZ065" => uva.ic_input_tax = amount,
            "KZ090" => uva.adjustments = amount,
            "KZ083" => uva.payable = amount,
            other => {
                return Err(FiskalError::Codec(format!("unknown Kennzahl '{other}'")));
            }
        }
    }

    Ok(uva)
}
