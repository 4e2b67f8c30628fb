//! Verdicts: the outcome of every authorization check.

use thiserror::Error;

/// Why a request was refused.
///
/// The display text is the reason reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("authorization credential missing")]
    CredentialMissing,

    #[error("invalid authorization credential: {0}")]
    InvalidCredential(String),

    #[error("unauthorized access or no associated event found")]
    NoAssociatedEvent,

    #[error("unauthorized")]
    Unauthorized,

    #[error("file too large")]
    QuotaExceeded,

    #[error("only file metadata events are allowed")]
    KindNotAllowed,

    #[error("unauthorized pubkey")]
    UnauthorizedAuthor,

    /// The event store could not answer; access is refused rather than granted.
    #[error("error querying events: {0}")]
    StoreQueryFailure(String),
}

impl Denial {
    /// Protocol status for this denial.
    ///
    /// Event ingestion denials carry no status: the relay reports them as a
    /// rejected event, not an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Denial::CredentialMissing | Denial::NoAssociatedEvent | Denial::Unauthorized => {
                Some(403)
            }
            Denial::InvalidCredential(_) => Some(401),
            Denial::QuotaExceeded => Some(413),
            Denial::StoreQueryFailure(_) => Some(500),
            Denial::KindNotAllowed | Denial::UnauthorizedAuthor => None,
        }
    }

    /// Human-readable reason.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// The outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(Denial),
}

impl Verdict {
    /// Whether the request may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    /// Protocol status: 200 on allow, the denial's status otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Verdict::Allow => Some(200),
            Verdict::Deny(denial) => denial.status(),
        }
    }

    /// The denial reason, if denied.
    pub fn reason(&self) -> Option<String> {
        self.denial().map(Denial::reason)
    }

    /// The denial, if denied.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Verdict::Allow => None,
            Verdict::Deny(denial) => Some(denial),
        }
    }

    /// Convert into a `Result`, for use with `?`.
    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Verdict::Allow => Ok(()),
            Verdict::Deny(denial) => Err(denial),
        }
    }
}

impl From<Denial> for Verdict {
    fn from(denial: Denial) -> Self {
        Verdict::Deny(denial)
    }
}
