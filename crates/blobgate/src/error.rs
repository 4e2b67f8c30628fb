//! Error types for the Gate.

use blobgate_blobs::BlobError;
use blobgate_core::ValidationError;
use blobgate_policy::Denial;
use blobgate_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Gate operations.
#[derive(Debug, Error)]
pub enum GateError {
    /// A policy rule refused the request.
    #[error("{0}")]
    Denied(#[from] Denial),

    /// The event is malformed.
    #[error("invalid event: {0}")]
    Invalid(#[from] ValidationError),

    /// Event store error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Blob storage or index error.
    #[error("blob error: {0}")]
    Blob(#[from] BlobError),
}

impl GateError {
    /// Protocol status to report for this error.
    pub fn status(&self) -> u16 {
        match self {
            GateError::Denied(denial) => denial.status().unwrap_or(403),
            GateError::Invalid(_) => 400,
            GateError::Blob(BlobError::NotFound(_)) => 404,
            GateError::Store(_) | GateError::Blob(_) => 500,
        }
    }

    /// The denial, if a rule refused the request.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            GateError::Denied(denial) => Some(denial),
            _ => None,
        }
    }
}

/// Result type for Gate operations.
pub type Result<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_core::ContentHash;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GateError::from(Denial::QuotaExceeded).status(), 413);
        assert_eq!(GateError::from(Denial::UnauthorizedAuthor).status(), 403);
        assert_eq!(
            GateError::from(BlobError::NotFound(ContentHash::digest(b"x"))).status(),
            404
        );
        assert_eq!(
            GateError::from(StoreError::InvalidData("bad".into())).status(),
            500
        );
        assert_eq!(
            GateError::from(ValidationError::MissingAction).status(),
            400
        );
    }

    #[test]
    fn test_denied_displays_reason() {
        let err = GateError::from(Denial::CredentialMissing);
        assert_eq!(err.to_string(), "authorization credential missing");
    }
}
