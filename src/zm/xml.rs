//! ZM XML rendering and parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::{FiskalError, Uid};
use crate::xml::{XmlResult, XmlWriter, parse_amount};

use super::types::{DeliveryType, Zm, ZmEntry, ZmStatus};

/// Render a recapitulative statement for the FinanzOnline upload channel.
/// The submission status is not part of the wire format.
pub fn to_zm_xml(zm: &Zm) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element("ZM")?;
    w.text_element("Jahr", &zm.year.to_string())?;
    w.text_element("Quartal", &zm.quarter.to_string())?;
    for entry in &zm.entries {
        w.start_element("Position")?;
        w.text_element("PartnerUid", entry.partner_uid.as_str())?;
        w.text_element("Land", &entry.country_code)?;
        w.text_element("Art", entry.delivery_type.code())?;
        w.text_element("Betrag", &entry.amount.to_string())?;
        w.end_element("Position")?;
    }
    w.end_element("ZM")?;
    w.into_string()
}

#[derive(Default)]
struct RawPosition {
    partner_uid: Option<String>,
    country: Option<String>,
    art: Option<String>,
    betrag: Option<String>,
}

impl RawPosition {
    fn into_entry(self, index: usize) -> Result<ZmEntry, FiskalError> {
        let missing = |what: &str| FiskalError::Codec(format!("Position {index}: missing {what}"));
        let uid_raw = self.partner_uid.ok_or_else(|| missing("PartnerUid"))?;
        let art = self.art.ok_or_else(|| missing("Art"))?;
        Ok(ZmEntry {
            partner_uid: Uid::parse(&uid_raw)
                .map_err(|e| FiskalError::Codec(format!("Position {index}: {e}")))?,
            country_code: self.country.ok_or_else(|| missing("Land"))?,
            delivery_type: DeliveryType::from_code(&art)
                .ok_or_else(|| FiskalError::Codec(format!("Position {index}: unknown Art '{art}'")))?,
            amount: parse_amount(&self.betrag.ok_or_else(|| missing("Betrag"))?)?,
        })
    }
}

/// Parse a ZM document. The result is always a draft.
pub fn from_zm_xml(xml: &str) -> Result<Zm, FiskalError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut jahr: Option<String> = None;
    let mut quartal: Option<String> = None;
    let mut entries: Vec<ZmEntry> = Vec::new();
    let mut current: Option<RawPosition> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "Position" {
                    current = Some(RawPosition::default());
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if text.is_empty() {
                    continue;
                }
                let leaf = path.last().map(|s| s.as_str()).unwrap_or("");
                match (&mut current, leaf) {
                    (Some(pos), "PartnerUid") => pos.partner_uid = Some(text),
                    (Some(pos), "Land") => pos.country = Some(text),
                    (Some(pos), "Art") => pos.art = Some(text),
                    (Some(pos), "Betrag") => pos.betrag = Some(text),
                    (None, "Jahr") => jahr = Some(text),
                    (None, "Quartal") => quartal = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some("Position")
                    && let Some(pos) = current.take()
                {
                    entries.push(pos.into_entry(entries.len())?);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FiskalError::Codec(format!("zm parse error: {e}"))),
            _ => {}
        }
    }

    Ok(Zm {
        year: jahr
            .ok_or_else(|| FiskalError::Codec("missing Jahr".into()))?
            .parse()
            .map_err(|_| FiskalError::Codec("invalid Jahr".into()))?,
        quarter: quartal
            .ok_or_else(|| FiskalError::Codec("missing Quartal".into()))?
            .parse()
            .map_err(|_| FiskalError::Codec("invalid Quartal".into()))?,
        entries,
        status: ZmStatus::Draft,
    })
}
