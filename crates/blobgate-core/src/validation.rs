//! Event validation: id integrity and authorization credential checks.
//!
//! Signature verification is not performed here; it happens before an
//! event reaches this layer.

use std::fmt;

use crate::error::ValidationError;
use crate::event::{Event, Kind};

/// The blob operation a credential authorizes, named by its `"t"` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthAction {
    Get,
    Upload,
    List,
    Delete,
}

impl AuthAction {
    /// The `"t"` tag value for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            AuthAction::Get => "get",
            AuthAction::Upload => "upload",
            AuthAction::List => "list",
            AuthAction::Delete => "delete",
        }
    }
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that an event's id matches its contents.
pub fn validate_event(event: &Event) -> Result<(), ValidationError> {
    let computed = event.compute_id();
    if computed != event.id {
        return Err(ValidationError::IdMismatch {
            claimed: event.id,
            computed,
        });
    }
    Ok(())
}

/// Check that an event is a usable authorization credential for `action`
/// at time `now` (Unix seconds).
///
/// This performs:
/// - Id integrity
/// - Kind check (must be [`Kind::BLOB_AUTH`])
/// - `created_at` not in the future
/// - `"t"` tag naming the action
/// - `"expiration"` tag strictly in the future
pub fn validate_credential(
    event: &Event,
    action: AuthAction,
    now: i64,
) -> Result<(), ValidationError> {
    validate_event(event)?;

    if event.kind != Kind::BLOB_AUTH {
        return Err(ValidationError::WrongKind {
            expected: Kind::BLOB_AUTH,
            got: event.kind,
        });
    }

    if event.created_at > now {
        return Err(ValidationError::CreatedInFuture(event.created_at));
    }

    let verb = event
        .first_tag_value("t")
        .ok_or(ValidationError::MissingAction)?;
    if verb != action.as_str() {
        return Err(ValidationError::ActionMismatch {
            expected: action.as_str().to_string(),
            got: verb.to_string(),
        });
    }

    let expiration = event
        .first_tag_value("expiration")
        .ok_or(ValidationError::MissingExpiration)?
        .parse::<i64>()
        .map_err(|e| ValidationError::StructuralError(format!("bad expiration tag: {}", e)))?;
    if expiration <= now {
        return Err(ValidationError::Expired(expiration));
    }

    Ok(())
}
