//! VAT identifier query service.

use serde::{Deserialize, Serialize};

use crate::core::Uid;

use super::error::FonError;
use super::session::Session;
use super::soap::{self, SoapTransport, field, flat_fields, xml_escape};

/// UID query service endpoint and request namespace.
pub const UID_NS: &str = "https://finanzonline.bmf.gv.at/fon/ws/uid";

// Service-specific return codes, below the shared range.
const RC_UID_NOT_FOUND: i32 = -10;
const RC_DAILY_LIMIT: i32 = -11;

/// Result of a UID confirmation query.
///
/// Level 1 confirms validity only; level 2 adds the registered name and
/// address lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UidCheck {
    pub uid: Uid,
    pub valid: bool,
    pub name: Option<String>,
    pub address: Vec<String>,
}

/// Query a partner UID at confirmation level 1 or 2. The caller's own UID
/// is part of the request; the portal logs it against the daily quota.
pub async fn check(
    transport: &impl SoapTransport,
    session: &Session,
    own_uid: &Uid,
    partner_uid: &Uid,
    level: u8,
) -> Result<UidCheck, FonError> {
    session.ensure_valid()?;
    if !(1..=2).contains(&level) {
        return Err(FonError::Validation(format!(
            "confirmation level must be 1 or 2, got {level}"
        )));
    }

    let body = format!(
        "<uidAbfrageRequest xmlns=\"{UID_NS}\">\
         <tid>{}</tid><benid>{}</benid><id>{}</id>\
         <uid_tn>{}</uid_tn><uid>{}</uid><stufe>{level}</stufe>\
         </uidAbfrageRequest>",
        xml_escape(session.tid()),
        xml_escape(session.benid()),
        xml_escape(session.id()),
        xml_escape(own_uid.as_str()),
        xml_escape(partner_uid.as_str()),
    );
    let response = transport
        .call(UID_NS, &soap::envelope(&body))
        .await
        .map_err(|e| session.absorb(e))?;
    let fields = flat_fields(&soap::body_content(&response)?)?;

    let rc: i32 = field(&fields, "rc")
        .ok_or_else(|| FonError::Codec("uid response is missing rc".into()))?
        .trim()
        .parse()
        .map_err(|_| FonError::Codec("non-numeric rc".into()))?;
    let msg = field(&fields, "msg").unwrap_or_default().to_string();
    match rc {
        0 => {}
        RC_UID_NOT_FOUND => return Err(FonError::UidNotFound(partner_uid.to_string())),
        RC_DAILY_LIMIT => return Err(FonError::UidDailyLimit),
        other => return Err(session.absorb(FonError::protocol(other, msg))),
    }

    let valid = matches!(field(&fields, "gueltig"), Some("J"));
    let name = field(&fields, "name")
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let address = (1..=6)
        .filter_map(|i| field(&fields, &format!("adrz{i}")))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    tracing::debug!(uid = %partner_uid, level, valid, "uid checked");
    Ok(UidCheck {
        uid: partner_uid.clone(),
        valid,
        name,
        address,
    })
}

/// Read partner UIDs from any CSV carrying a `uid` column; other columns
/// are ignored. Row numbers in errors count from 1 below the header.
pub fn uids_from_csv(data: &str) -> Result<Vec<Uid>, FonError> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| FonError::Codec(format!("csv header: {e}")))?;
    let uid_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("uid"))
        .ok_or_else(|| FonError::Validation("csv has no 'uid' column".into()))?;

    let mut uids = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| FonError::Codec(format!("csv row {}: {e}", row + 1)))?;
        let raw = record
            .get(uid_col)
            .map(str::trim)
            .unwrap_or_default();
        if raw.is_empty() {
            continue;
        }
        let uid = Uid::parse(raw)
            .map_err(|e| FonError::Validation(format!("row {}: {e}", row + 1)))?;
        uids.push(uid);
    }
    Ok(uids)
}

/// Check a batch of UIDs sequentially. The daily-limit error aborts the
/// remainder of the batch since every further query would hit it too.
pub async fn check_batch(
    transport: &impl SoapTransport,
    session: &Session,
    own_uid: &Uid,
    partner_uids: &[Uid],
    level: u8,
) -> Vec<(Uid, Result<UidCheck, FonError>)> {
    let mut results = Vec::with_capacity(partner_uids.len());
    for uid in partner_uids {
        let result = check(transport, session, own_uid, uid, level).await;
        let stop = matches!(result, Err(FonError::UidDailyLimit));
        results.push((uid.clone(), result));
        if stop {
            break;
        }
    }
    results
}
