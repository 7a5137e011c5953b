//! FinanzOnline session lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{NaiveDateTime, Utc};

use super::error::FonError;
use super::soap::{self, SoapTransport, check_rc, field, flat_fields, xml_escape};

/// Session service endpoint and request namespace.
pub const SESSION_NS: &str = "https://finanzonline.bmf.gv.at/fon/ws/session";

/// Software-vendor id carried in every login request.
pub const HERSTELLERID: &str = "fiskal-rs";

/// An authenticated portal session.
///
/// Validity is monotone: it starts true and only `invalidate` (driven by
/// logout or a session-expired return code) clears it. Sessions are
/// task-local and passed by reference; they are deliberately not `Clone`.
#[derive(Debug)]
pub struct Session {
    id: String,
    tid: String,
    benid: String,
    created_at: NaiveDateTime,
    valid: AtomicBool,
}

impl Session {
    /// Session token issued by the portal.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Participant id the session was opened for.
    pub fn tid(&self) -> &str {
        &self.tid
    }

    /// Webservice user id.
    pub fn benid(&self) -> &str {
        &self.benid
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// One-way: once cleared the session never becomes valid again.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }

    /// Guard for authenticated operations. Fails without network traffic
    /// when the session has been invalidated.
    pub(crate) fn ensure_valid(&self) -> Result<(), FonError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(FonError::NoSession)
        }
    }

    /// A session-expired code on the wire flips validity before the error
    /// propagates, so later calls fail locally.
    pub(crate) fn absorb(&self, err: FonError) -> FonError {
        if matches!(err, FonError::SessionExpired) {
            tracing::info!(tid = %self.tid, benid = %self.benid, "session expired on the wire");
            self.invalidate();
        }
        err
    }

    #[cfg(test)]
    pub(crate) fn for_tests(id: &str, tid: &str, benid: &str) -> Self {
        Self {
            id: id.into(),
            tid: tid.into(),
            benid: benid.into(),
            created_at: Utc::now().naive_utc(),
            valid: AtomicBool::new(true),
        }
    }
}

/// Open a session. Credential, lock, and maintenance return codes map to
/// their named error kinds and never yield a session.
pub async fn login(
    transport: &impl SoapTransport,
    tid: &str,
    benid: &str,
    pin: &str,
) -> Result<Session, FonError> {
    let body = format!(
        "<loginRequest xmlns=\"{SESSION_NS}\">\
         <tid>{}</tid><benid>{}</benid><pin>{}</pin>\
         <herstellerid>{HERSTELLERID}</herstellerid>\
         </loginRequest>",
        xml_escape(tid),
        xml_escape(benid),
        xml_escape(pin),
    );
    let response = transport.call(SESSION_NS, &soap::envelope(&body)).await?;
    let fields = flat_fields(&body_of(&response)?)?;
    check_rc(&fields)?;
    let id = field(&fields, "id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FonError::Codec("login response is missing the session id".into()))?;

    tracing::info!(tid, benid, "session opened");
    Ok(Session {
        id: id.to_string(),
        tid: tid.to_string(),
        benid: benid.to_string(),
        created_at: Utc::now().naive_utc(),
        valid: AtomicBool::new(true),
    })
}

/// Close a session. Idempotent: a session-expired return code is absorbed,
/// every other error propagates. Validity is cleared in all cases.
pub async fn logout(transport: &impl SoapTransport, session: &Session) -> Result<(), FonError> {
    if !session.is_valid() {
        return Ok(());
    }
    let body = format!(
        "<logoutRequest xmlns=\"{SESSION_NS}\">\
         <tid>{}</tid><benid>{}</benid><id>{}</id>\
         </logoutRequest>",
        xml_escape(session.tid()),
        xml_escape(session.benid()),
        xml_escape(session.id()),
    );
    let result = async {
        let response = transport.call(SESSION_NS, &soap::envelope(&body)).await?;
        let fields = flat_fields(&body_of(&response)?)?;
        check_rc(&fields).map(drop)
    }
    .await;

    session.invalidate();
    match result {
        Err(FonError::SessionExpired) | Ok(()) => {
            tracing::info!(tid = %session.tid(), "session closed");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn body_of(response: &str) -> Result<String, FonError> {
    soap::body_content(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fon::testing::FakeTransport;

    fn ok_login() -> String {
        FakeTransport::respond(
            "<loginResponse><rc>0</rc><msg>OK</msg><id>SESSION-1</id></loginResponse>",
        )
    }

    #[tokio::test]
    async fn login_yields_valid_session() {
        let transport = FakeTransport::new(vec![Ok(ok_login())]);
        let session = login(&transport, "123456789", "webuser", "pin").await.unwrap();
        assert_eq!(session.id(), "SESSION-1");
        assert_eq!(session.tid(), "123456789");
        assert!(session.is_valid());

        let (endpoint, envelope) = transport.requests.lock().unwrap()[0].clone();
        assert_eq!(endpoint, SESSION_NS);
        assert!(envelope.contains("<tid>123456789</tid>"));
        assert!(envelope.contains(&format!("<herstellerid>{HERSTELLERID}</herstellerid>")));
    }

    #[tokio::test]
    async fn invalid_credentials_never_yield_a_session() {
        let transport = FakeTransport::new(vec![Ok(FakeTransport::respond(
            "<loginResponse><rc>-4</rc><msg>Zugangsdaten</msg></loginResponse>",
        ))]);
        let err = login(&transport, "1", "u", "bad").await.unwrap_err();
        assert!(matches!(err, FonError::InvalidCredentials));
    }

    #[tokio::test]
    async fn maintenance_is_named() {
        let transport = FakeTransport::new(vec![Ok(FakeTransport::respond(
            "<loginResponse><rc>-3</rc><msg>Wartungsfenster</msg></loginResponse>",
        ))]);
        assert!(matches!(
            login(&transport, "1", "u", "p").await.unwrap_err(),
            FonError::Maintenance(_)
        ));
    }

    #[tokio::test]
    async fn missing_session_id_is_codec_error() {
        let transport = FakeTransport::new(vec![Ok(FakeTransport::respond(
            "<loginResponse><rc>0</rc><msg>OK</msg></loginResponse>",
        ))]);
        assert!(matches!(
            login(&transport, "1", "u", "p").await.unwrap_err(),
            FonError::Codec(_)
        ));
    }

    #[tokio::test]
    async fn logout_clears_validity() {
        let transport = FakeTransport::new(vec![Ok(FakeTransport::respond(
            "<logoutResponse><rc>0</rc><msg>OK</msg></logoutResponse>",
        ))]);
        let session = Session::for_tests("S", "1", "u");
        logout(&transport, &session).await.unwrap();
        assert!(!session.is_valid());
    }

    #[tokio::test]
    async fn logout_absorbs_session_expired() {
        let transport = FakeTransport::new(vec![Ok(FakeTransport::respond(
            "<logoutResponse><rc>-1</rc><msg>abgelaufen</msg></logoutResponse>",
        ))]);
        let session = Session::for_tests("S", "1", "u");
        logout(&transport, &session).await.unwrap();
        assert!(!session.is_valid());
    }

    #[tokio::test]
    async fn logout_on_invalid_session_is_local() {
        let transport = FakeTransport::new(vec![]);
        let session = Session::for_tests("S", "1", "u");
        session.invalidate();
        logout(&transport, &session).await.unwrap();
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn invalidation_is_one_way() {
        let session = Session::for_tests("S", "1", "u");
        assert!(session.is_valid());
        session.invalidate();
        session.invalidate();
        assert!(!session.is_valid());
        assert!(matches!(session.ensure_valid(), Err(FonError::NoSession)));
    }
}
