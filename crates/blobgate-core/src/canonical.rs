//! Canonical event serialization.
//!
//! The event id commits to the compact JSON array
//! `[0, <pubkey hex>, <created_at>, <kind>, <tags>, <content>]`.
//! Two events with the same fields therefore always share an id, on every
//! platform and in every client.

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::event::{Kind, Tag};
use crate::types::{EventId, PublicKey};

/// Serialize event fields into the canonical id preimage.
pub fn canonical_serialization(
    pubkey: &PublicKey,
    created_at: i64,
    kind: Kind,
    tags: &[Tag],
    content: &str,
) -> String {
    json!([0, pubkey.to_hex(), created_at, kind.as_u16(), tags, content]).to_string()
}

/// Compute an event id from its fields.
pub fn event_id(
    pubkey: &PublicKey,
    created_at: i64,
    kind: Kind,
    tags: &[Tag],
    content: &str,
) -> EventId {
    let preimage = canonical_serialization(pubkey, created_at, kind, tags, content);
    EventId(Sha256::digest(preimage.as_bytes()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_serialization_shape() {
        let pk = PublicKey::from_bytes([0x01; 32]);
        let tags = vec![Tag::new("x", "ab")];
        let s = canonical_serialization(&pk, 7, Kind::FILE_METADATA, &tags, "hi\n");

        let expected = format!(r#"[0,"{}",7,1063,[["x","ab"]],"hi\n"]"#, "01".repeat(32));
        assert_eq!(s, expected);
    }

    #[test]
    fn test_event_id_deterministic() {
        let pk = PublicKey::from_bytes([0x01; 32]);
        let tags = vec![Tag::new("p", "02".repeat(32))];
        let id1 = event_id(&pk, 100, Kind::FILE_METADATA, &tags, "");
        let id2 = event_id(&pk, 100, Kind::FILE_METADATA, &tags, "");
        assert_eq!(id1, id2);

        let id3 = event_id(&pk, 101, Kind::FILE_METADATA, &tags, "");
        assert_ne!(id1, id3);
    }
}
