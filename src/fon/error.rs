//! Error taxonomy for the FinanzOnline portal services.

use thiserror::Error;

/// Errors raised by the SOAP transport and the portal services.
///
/// Transport and transient-HTTP failures are retryable; everything else is
/// terminal for the current call. Protocol sub-kinds carry the meaning of
/// the portal's non-zero return codes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FonError {
    /// Connection, DNS, TLS, or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP 429 or a 5xx status.
    #[error("transient HTTP error: status {status}")]
    HttpTransient { status: u16 },

    /// Any other non-success HTTP status.
    #[error("HTTP error: status {status}")]
    HttpTerminal { status: u16 },

    /// The session id was rejected as expired or unknown.
    #[error("session expired")]
    SessionExpired,

    /// The portal is in a maintenance window.
    #[error("portal maintenance: {0}")]
    Maintenance(String),

    /// Server-side technical failure.
    #[error("technical error: {0}")]
    Technical(String),

    /// tid/benid/pin combination rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Too many failed attempts; the user is locked for a cool-down.
    #[error("user temporarily locked")]
    UserLockedTemporarily,

    /// The user is permanently locked and must be reset by the participant.
    #[error("user permanently locked")]
    UserLockedPermanently,

    /// The user exists but is not flagged as a webservice user.
    #[error("not a webservice user")]
    NotWebserviceUser,

    /// The participant (tid) is locked.
    #[error("participant locked")]
    ParticipantLocked,

    /// Daily quota of UID queries exhausted.
    #[error("UID query daily limit reached")]
    UidDailyLimit,

    /// The queried UID is not registered.
    #[error("UID not found: {0}")]
    UidNotFound(String),

    /// Non-zero return code without a dedicated kind.
    #[error("protocol error rc={code}: {message}")]
    Protocol { code: i32, message: String },

    /// The operation needs an authenticated session and none is valid.
    #[error("no valid session")]
    NoSession,

    /// Request-side validation failed before anything was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The response could not be decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// The task driving the call was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl FonError {
    /// Stable kind string for machine-readable error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::HttpTransient { .. } => "http-transient",
            Self::HttpTerminal { .. } => "http-terminal",
            Self::SessionExpired => "session-expired",
            Self::Maintenance(_) => "maintenance",
            Self::Technical(_) => "technical",
            Self::InvalidCredentials => "invalid-credentials",
            Self::UserLockedTemporarily => "user-locked-temporarily",
            Self::UserLockedPermanently => "user-locked-permanently",
            Self::NotWebserviceUser => "not-webservice-user",
            Self::ParticipantLocked => "participant-locked",
            Self::UidDailyLimit => "uid-daily-limit",
            Self::UidNotFound(_) => "uid-not-found",
            Self::Protocol { .. } => "protocol",
            Self::NoSession => "no-session",
            Self::Validation(_) => "validation",
            Self::Codec(_) => "codec",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the transport may retry the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpTransient { .. })
    }

    /// Lift a portal `(rc, msg)` pair into the taxonomy. Zero never reaches
    /// this function; unknown codes keep the raw code and server message.
    pub fn protocol(code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            -1 => Self::SessionExpired,
            -2 => Self::Technical(message),
            -3 => Self::Maintenance(message),
            -4 => Self::InvalidCredentials,
            -5 => Self::UserLockedTemporarily,
            -6 => Self::NotWebserviceUser,
            -7 => Self::ParticipantLocked,
            -8 => Self::UserLockedPermanently,
            _ => Self::Protocol { code, message },
        }
    }
}
