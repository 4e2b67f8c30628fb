//! Error types for the policy module.

use thiserror::Error;

/// Errors that can occur while building policy inputs.
///
/// Authorization outcomes are not errors: they are [`Verdict`](crate::Verdict)s.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// An allow-list entry is not a valid identity.
    #[error("invalid identity {entry:?} in allow-list: {source}")]
    InvalidIdentity {
        entry: String,
        #[source]
        source: blobgate_core::CoreError,
    },
}

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
