//! Portal account records and the credential-store contract.

use serde::{Deserialize, Serialize};

/// Webservice credentials for one portal account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Local display name, unique within a credential store.
    pub name: String,
    /// Participant id.
    pub tid: String,
    /// Webservice user id.
    pub benid: String,
    pub pin: String,
}

/// Contract for the out-of-crate credential store. Implementations decrypt
/// however they like; this crate only reads.
pub trait CredentialSource {
    /// Look up one account by its local name.
    fn get(&self, name: &str) -> Option<Account>;

    /// Every stored account, in store order.
    fn accounts(&self) -> Vec<Account>;
}

/// In-memory source, mainly for tests and one-off scripts.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    accounts: Vec<Account>,
}

impl StaticCredentials {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }
}

impl CredentialSource for StaticCredentials {
    fn get(&self, name: &str) -> Option<Account> {
        self.accounts.iter().find(|a| a.name == name).cloned()
    }

    fn accounts(&self) -> Vec<Account> {
        self.accounts.clone()
    }
}
