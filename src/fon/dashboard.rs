//! Multi-account status dashboard.
//!
//! Fans one task per account out over a `JoinSet`, probes the selected
//! service read-only, and folds every outcome — including panics and
//! cancellation — into data rows. One failing account never disturbs its
//! siblings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use super::account::{Account, CredentialSource};
use super::databox;
use super::error::FonError;
use super::session::{self, Session};
use super::soap::SoapTransport;

/// Which service a dashboard run probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServiceKind {
    /// Login/logout health only.
    Session,
    /// Mailbox listing; counts entries that require action.
    #[default]
    Databox,
}

/// Outcome of one account probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowStatus {
    Ok,
    /// Error kind string plus the display message.
    Error { kind: String, message: String },
    Cancelled,
}

/// One dashboard row per account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRow {
    pub account: String,
    /// Mailbox entries requiring action (0 for session probes and errors).
    pub pending: usize,
    /// Total mailbox entries seen.
    pub total: usize,
    pub status: RowStatus,
}

impl DashboardRow {
    pub fn has_error(&self) -> bool {
        !matches!(self.status, RowStatus::Ok)
    }

    fn error(account: String, err: &FonError) -> Self {
        Self {
            account,
            pending: 0,
            total: 0,
            status: RowStatus::Error {
                kind: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }

    fn cancelled(account: String) -> Self {
        Self {
            account,
            pending: 0,
            total: 0,
            status: RowStatus::Cancelled,
        }
    }
}

/// Probe every account of the source. See [`run_with_accounts`].
pub async fn run<T>(
    transport: &T,
    source: &impl CredentialSource,
    service: ServiceKind,
) -> Vec<DashboardRow>
where
    T: SoapTransport + Clone + 'static,
{
    run_with_accounts(transport, source.accounts(), service).await
}

/// Probe the given accounts in parallel, one task and one session each.
/// Rows come back sorted: errors first, then by pending count descending,
/// then by account name.
pub async fn run_with_accounts<T>(
    transport: &T,
    accounts: Vec<Account>,
    service: ServiceKind,
) -> Vec<DashboardRow>
where
    T: SoapTransport + Clone + 'static,
{
    let mut set: JoinSet<DashboardRow> = JoinSet::new();
    let mut names: HashMap<tokio::task::Id, String> = HashMap::new();

    for account in accounts {
        let transport = transport.clone();
        let name = account.name.clone();
        let handle = set.spawn(async move { probe(&transport, account, service).await });
        names.insert(handle.id(), name);
    }
    tracing::info!(accounts = names.len(), ?service, "dashboard fan-out");

    let mut rows = Vec::with_capacity(names.len());
    while let Some(joined) = set.join_next_with_id().await {
        match joined {
            Ok((_, row)) => rows.push(row),
            Err(join_err) => {
                let account = names
                    .get(&join_err.id())
                    .cloned()
                    .unwrap_or_else(|| "?".to_string());
                if join_err.is_panic() {
                    tracing::error!(account = %account, "dashboard task panicked");
                    rows.push(DashboardRow::error(
                        account,
                        &FonError::Technical("task panicked".into()),
                    ));
                } else {
                    rows.push(DashboardRow::cancelled(account));
                }
            }
        }
    }

    rows.sort_by(|a, b| {
        b.has_error()
            .cmp(&a.has_error())
            .then(b.pending.cmp(&a.pending))
            .then(a.account.cmp(&b.account))
    });
    rows
}

async fn probe<T: SoapTransport>(transport: &T, account: Account, service: ServiceKind) -> DashboardRow {
    let session = match session::login(transport, &account.tid, &account.benid, &account.pin).await
    {
        Ok(session) => session,
        Err(err) => return DashboardRow::error(account.name, &err),
    };

    let result = probe_service(transport, &session, service).await;
    // best effort; the probe result decides the row
    if let Err(err) = session::logout(transport, &session).await {
        tracing::warn!(account = %account.name, error = %err, "logout failed after probe");
    }

    match result {
        Ok((pending, total)) => DashboardRow {
            account: account.name,
            pending,
            total,
            status: RowStatus::Ok,
        },
        Err(err) => DashboardRow::error(account.name, &err),
    }
}

async fn probe_service(
    transport: &impl SoapTransport,
    session: &Session,
    service: ServiceKind,
) -> Result<(usize, usize), FonError> {
    match service {
        ServiceKind::Session => Ok((0, 0)),
        ServiceKind::Databox => {
            let entries = databox::list(transport, session, None, None).await?;
            let pending = entries.iter().filter(|e| e.action_required()).count();
            Ok((pending, entries.len()))
        }
    }
}
