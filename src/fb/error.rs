use thiserror::Error;

/// Errors from the register watchlist and its JSON store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FbError {
    /// Reading or writing the watchlist file failed.
    #[error("store error: {0}")]
    Store(String),

    /// Watchlist or snapshot (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The register backend reported a failure.
    #[error("register error: {0}")]
    Register(String),

    /// The register has no company under this number.
    #[error("company not found: {0}")]
    NotFound(String),
}

impl FbError {
    /// Stable kind string for machine-readable error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Store(_) => "store",
            Self::Serde(_) => "codec",
            Self::Register(_) => "register",
            Self::NotFound(_) => "not-found",
        }
    }
}
