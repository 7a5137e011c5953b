//! Document submission channel.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use super::error::FonError;
use super::session::Session;
use super::soap::{self, SoapTransport, check_rc, field, flat_fields, xml_escape};

/// Upload service endpoint and request namespace.
pub const UPLOAD_NS: &str = "https://finanzonline.bmf.gv.at/fon/ws/upload";

/// Which regulated document a payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadKind {
    /// Advance VAT return, `art` tag "U30".
    Uva,
    /// Recapitulative statement, `art` tag "ZM".
    Zm,
}

impl UploadKind {
    /// Document-kind tag carried in the request.
    pub fn art(self) -> &'static str {
        match self {
            Self::Uva => "U30",
            Self::Zm => "ZM",
        }
    }
}

/// Acknowledgement of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReference {
    pub kind: UploadKind,
    /// Reference number assigned by the portal.
    pub refid: String,
}

/// Submit a document payload. The payload goes base64-encoded on the wire;
/// a zero return code yields the reference number, anything else lifts
/// into the protocol taxonomy with the server message preserved.
pub async fn submit(
    transport: &impl SoapTransport,
    session: &Session,
    kind: UploadKind,
    payload: &[u8],
) -> Result<SubmissionReference, FonError> {
    session.ensure_valid()?;
    if payload.is_empty() {
        return Err(FonError::Validation("submission payload is empty".into()));
    }

    let body = format!(
        "<uploadRequest xmlns=\"{UPLOAD_NS}\">\
         <tid>{}</tid><benid>{}</benid><id>{}</id>\
         <art>{}</art><data>{}</data>\
         </uploadRequest>",
        xml_escape(session.tid()),
        xml_escape(session.benid()),
        xml_escape(session.id()),
        kind.art(),
        BASE64.encode(payload),
    );
    let response = transport
        .call(UPLOAD_NS, &soap::envelope(&body))
        .await
        .map_err(|e| session.absorb(e))?;
    let fields = flat_fields(&soap::body_content(&response)?)?;
    check_rc(&fields).map_err(|e| session.absorb(e))?;

    let refid = field(&fields, "refid")
        .filter(|r| !r.is_empty())
        .ok_or_else(|| FonError::Codec("upload response is missing refid".into()))?;
    tracing::info!(art = kind.art(), refid, size = payload.len(), "document submitted");
    Ok(SubmissionReference {
        kind,
        refid: refid.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fon::testing::FakeTransport;

    #[tokio::test]
    async fn submit_returns_reference() {
        let transport = FakeTransport::new(vec![Ok(FakeTransport::respond(
            "<uploadResponse><rc>0</rc><msg>OK</msg><refid>2025-000123</refid></uploadResponse>",
        ))]);
        let session = Session::for_tests("S", "1", "u");
        let reference = submit(&transport, &session, UploadKind::Uva, b"<Umsatzsteuervoranmeldung/>")
            .await
            .unwrap();
        assert_eq!(reference.refid, "2025-000123");
        assert_eq!(reference.kind, UploadKind::Uva);

        let (endpoint, envelope) = transport.requests.lock().unwrap()[0].clone();
        assert_eq!(endpoint, UPLOAD_NS);
        assert!(envelope.contains("<art>U30</art>"));
        // payload is base64, never raw XML
        assert!(!envelope.contains("<data><Umsatzsteuervoranmeldung"));
    }

    #[tokio::test]
    async fn zm_uses_its_art_tag() {
        let transport = FakeTransport::new(vec![Ok(FakeTransport::respond(
            "<uploadResponse><rc>0</rc><msg>OK</msg><refid>R-1</refid></uploadResponse>",
        ))]);
        let session = Session::for_tests("S", "1", "u");
        submit(&transport, &session, UploadKind::Zm, b"<ZM/>").await.unwrap();
        let (_, envelope) = transport.requests.lock().unwrap()[0].clone();
        assert!(envelope.contains("<art>ZM</art>"));
    }

    #[tokio::test]
    async fn rejection_preserves_server_message() {
        let transport = FakeTransport::new(vec![Ok(FakeTransport::respond(
            "<uploadResponse><rc>-42</rc><msg>Schemafehler in Zeile 3</msg></uploadResponse>",
        ))]);
        let session = Session::for_tests("S", "1", "u");
        match submit(&transport, &session, UploadKind::Uva, b"x").await.unwrap_err() {
            FonError::Protocol { code, message } => {
                assert_eq!(code, -42);
                assert_eq!(message, "Schemafehler in Zeile 3");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_payload_is_rejected_locally() {
        let transport = FakeTransport::new(vec![]);
        let session = Session::for_tests("S", "1", "u");
        assert!(matches!(
            submit(&transport, &session, UploadKind::Uva, b"").await.unwrap_err(),
            FonError::Validation(_)
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn expired_rc_invalidates_the_session() {
        let transport = FakeTransport::new(vec![Ok(FakeTransport::respond(
            "<uploadResponse><rc>-1</rc><msg>abgelaufen</msg></uploadResponse>",
        ))]);
        let session = Session::for_tests("S", "1", "u");
        assert!(matches!(
            submit(&transport, &session, UploadKind::Zm, b"x").await.unwrap_err(),
            FonError::SessionExpired
        ));
        assert!(!session.is_valid());
    }
}
