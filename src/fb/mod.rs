//! Companies-register (Firmenbuch) watchlist.
//!
//! Watches a set of register numbers for changes: each sweep fetches a
//! fresh extract through a [`RegisterClient`], canonicalizes it to JSON,
//! and byte-compares it against the stored snapshot. The register backend
//! itself lives outside this crate; only the contract is defined here.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::core::FnNr;

mod error;
mod store;
mod watchlist;

pub use error::FbError;
pub use store::{DEFAULT_STORE_FILE, WatchlistStore};
pub use watchlist::{ChangeRecord, CheckReport, WatchEntry, Watchlist, canonicalize};

/// A company extract as observed at one point in time. The serde shape of
/// this struct is the canonical snapshot format; renaming fields changes
/// what counts as a difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyExtract {
    pub number: FnNr,
    pub name: String,
    pub legal_form: String,
    /// Registered seat (political municipality).
    pub seat: String,
    pub address: String,
    /// Register status, e.g. "aktiv", "in Liquidation", "gelöscht".
    pub status: String,
}

/// Contract for the register backend.
pub trait RegisterClient {
    /// Fetch the current extract for one company.
    fn fetch_extract(
        &self,
        number: &FnNr,
    ) -> impl Future<Output = Result<CompanyExtract, FbError>> + Send;
}
