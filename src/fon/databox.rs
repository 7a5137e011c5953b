//! Databox (mailbox) service: listing and document fetch.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

use super::error::FonError;
use super::session::Session;
use super::soap::{self, SoapTransport, check_rc, field, flat_fields, xml_escape};

/// Databox service endpoint and request namespace.
pub const DATABOX_NS: &str = "https://finanzonline.bmf.gv.at/fon/ws/databox";

/// One mailbox delivery. The application key is unique per mailbox and is
/// what the download operations address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataboxEntry {
    pub applkey: String,
    pub description: String,
    pub delivered_at: NaiveDateTime,
    /// Classification code: B, E, M, V, or any future code.
    pub classification: String,
    /// File kind reported by the portal, e.g. "PDF".
    pub file_kind: String,
}

impl DataboxEntry {
    /// Whether the delivery demands a reply from the taxpayer.
    pub fn action_required(&self) -> bool {
        matches!(self.classification.as_str(), "E" | "V")
    }

    /// Human-readable delivery type. Total: unknown codes map to themselves.
    pub fn type_name(&self) -> &str {
        match self.classification.as_str() {
            "B" => "Bescheid",
            "E" => "Ergänzungsersuchen",
            "M" => "Mitteilung",
            "V" => "Vorhalt",
            other => other,
        }
    }
}

/// List mailbox entries, optionally restricted to a delivery-date window.
/// The order of the returned snapshot is whatever the portal sent.
pub async fn list(
    transport: &impl SoapTransport,
    session: &Session,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<DataboxEntry>, FonError> {
    session.ensure_valid()?;

    let mut body = format!(
        "<databoxRequest xmlns=\"{DATABOX_NS}\">\
         <tid>{}</tid><benid>{}</benid><id>{}</id>",
        xml_escape(session.tid()),
        xml_escape(session.benid()),
        xml_escape(session.id()),
    );
    if let Some(from) = from {
        body.push_str(&format!("<ts_zust_von>{}</ts_zust_von>", from.format("%Y-%m-%d")));
    }
    if let Some(to) = to {
        body.push_str(&format!("<ts_zust_bis>{}</ts_zust_bis>", to.format("%Y-%m-%d")));
    }
    body.push_str("</databoxRequest>");

    let response = transport
        .call(DATABOX_NS, &soap::envelope(&body))
        .await
        .map_err(|e| session.absorb(e))?;
    let content = soap::body_content(&response)?;

    let fields = flat_fields(&content)?;
    check_rc(&fields).map_err(|e| session.absorb(e))?;

    let entries = parse_entries(&content)?;
    tracing::debug!(tid = %session.tid(), count = entries.len(), "databox listed");
    Ok(entries)
}

/// Fetch a document into memory. Returns the reported filename and the
/// decoded bytes.
pub async fn download_bytes(
    transport: &impl SoapTransport,
    session: &Session,
    applkey: &str,
) -> Result<(String, Vec<u8>), FonError> {
    session.ensure_valid()?;

    let body = format!(
        "<getDataboxRequest xmlns=\"{DATABOX_NS}\">\
         <tid>{}</tid><benid>{}</benid><id>{}</id>\
         <applkey>{}</applkey>\
         </getDataboxRequest>",
        xml_escape(session.tid()),
        xml_escape(session.benid()),
        xml_escape(session.id()),
        xml_escape(applkey),
    );
    let response = transport
        .call(DATABOX_NS, &soap::envelope(&body))
        .await
        .map_err(|e| session.absorb(e))?;
    let fields = flat_fields(&soap::body_content(&response)?)?;
    check_rc(&fields).map_err(|e| session.absorb(e))?;

    let payload = field(&fields, "result")
        .ok_or_else(|| FonError::Codec("download response is missing the document".into()))?;
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| FonError::Codec(format!("invalid base64 payload: {e}")))?;
    let filename = field(&fields, "filename")
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{applkey}.pdf"));
    Ok((filename, bytes))
}

/// Fetch a document and write it under `dir`. The payload is decoded fully
/// before the single write, so a decode failure leaves no file behind.
pub async fn download(
    transport: &impl SoapTransport,
    session: &Session,
    applkey: &str,
    dir: &Path,
) -> Result<PathBuf, FonError> {
    let (filename, bytes) = download_bytes(transport, session, applkey).await?;
    // keep only the final component of whatever name the portal sent
    let safe_name = Path::new(&filename)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| format!("{applkey}.pdf").into());
    let path = dir.join(safe_name);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| FonError::Transport(format!("writing {}: {e}", path.display())))?;
    tracing::info!(applkey, path = %path.display(), size = bytes.len(), "document downloaded");
    Ok(path)
}

fn parse_entries(xml: &str) -> Result<Vec<DataboxEntry>, FonError> {
    #[derive(Default)]
    struct Raw {
        applkey: Option<String>,
        description: Option<String>,
        delivered_at: Option<String>,
        classification: Option<String>,
        file_kind: Option<String>,
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut entries = Vec::new();
    let mut current: Option<Raw> = None;
    let mut leaf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                leaf = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if leaf == "result" {
                    current = Some(Raw::default());
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(raw) = current.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| FonError::Codec(format!("bad listing text: {err}")))?
                        .into_owned();
                    match leaf.as_str() {
                        "applkey" => raw.applkey = Some(text),
                        "filebez" => raw.description = Some(text),
                        "ts_zust" => raw.delivered_at = Some(text),
                        "erltyp" => raw.classification = Some(text),
                        "filetyp" => raw.file_kind = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                leaf.clear();
                if e.local_name().as_ref() == b"result" {
                    if let Some(raw) = current.take() {
                        let missing = |what: &str| {
                            FonError::Codec(format!("databox entry is missing {what}"))
                        };
                        let ts = raw.delivered_at.ok_or_else(|| missing("ts_zust"))?;
                        entries.push(DataboxEntry {
                            applkey: raw.applkey.ok_or_else(|| missing("applkey"))?,
                            description: raw.description.unwrap_or_default(),
                            delivered_at: parse_timestamp(&ts)?,
                            classification: raw.classification.ok_or_else(|| missing("erltyp"))?,
                            file_kind: raw.file_kind.unwrap_or_default(),
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FonError::Codec(format!("malformed listing: {e}"))),
            _ => {}
        }
    }
    Ok(entries)
}

// The portal reports second precision; fractional digits and offsets are cut.
fn parse_timestamp(s: &str) -> Result<NaiveDateTime, FonError> {
    let head = if s.len() > 19 { &s[..19] } else { s };
    NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| FonError::Codec(format!("invalid timestamp '{s}'")))
}
