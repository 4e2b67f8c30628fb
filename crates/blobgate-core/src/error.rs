//! Error types for blobgate core.

use thiserror::Error;

use crate::event::Kind;
use crate::types::EventId;

/// Core errors that can occur while parsing or encoding primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid {what}: {reason}")]
    InvalidHex { what: &'static str, reason: String },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Validation errors for events and authorization credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("event id mismatch: claimed {claimed}, computed {computed}")]
    IdMismatch { claimed: EventId, computed: EventId },

    #[error("wrong event kind: expected {expected}, got {got}")]
    WrongKind { expected: Kind, got: Kind },

    #[error("created_at {0} is in the future")]
    CreatedInFuture(i64),

    #[error("missing \"t\" tag naming the action")]
    MissingAction,

    #[error("action mismatch: expected {expected}, got {got}")]
    ActionMismatch { expected: String, got: String },

    #[error("missing \"expiration\" tag")]
    MissingExpiration,

    #[error("credential expired at {0}")]
    Expired(i64),

    #[error("structural error: {0}")]
    StructuralError(String),
}
