//! FinanzOnline webservice client.
//!
//! Session-bound SOAP services of the Austrian tax portal: login/logout,
//! databox (mailbox) listing and document fetch, document upload (UVA and
//! ZM), UID confirmation queries, and a parallel multi-account dashboard.
//!
//! All services take the transport and the session explicitly; there is no
//! global client state. The transport seam is [`SoapTransport`], with
//! [`HttpTransport`] as the production implementation.
//!
//! ```no_run
//! use fiskal::fon::{self, HttpTransport};
//!
//! # async fn demo() -> Result<(), fon::FonError> {
//! let transport = HttpTransport::new()?;
//! let session = fon::login(&transport, "123456789", "webuser", "pin").await?;
//! let entries = fon::databox::list(&transport, &session, None, None).await?;
//! for entry in entries.iter().filter(|e| e.action_required()) {
//!     println!("{} {}", entry.applkey, entry.type_name());
//! }
//! fon::logout(&transport, &session).await?;
//! # Ok(())
//! # }
//! ```

mod account;
pub mod dashboard;
pub mod databox;
mod error;
mod session;
mod soap;
pub mod uid;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use account::{Account, CredentialSource, StaticCredentials};
pub use dashboard::{DashboardRow, RowStatus, ServiceKind};
pub use databox::DataboxEntry;
pub use error::FonError;
pub use session::{HERSTELLERID, SESSION_NS, Session, login, logout};
pub use soap::{
    HttpTransport, HttpTransportBuilder, PRODUCTION_BASE, SOAP_NS, SoapTransport, body_content,
    envelope,
};
pub use uid::{UID_NS, UidCheck};
pub use upload::{SubmissionReference, UPLOAD_NS, UploadKind, submit};
