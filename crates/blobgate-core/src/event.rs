//! Event: the signed record that carries both credentials and file metadata.
//!
//! An event is immutable once received. Its id is the SHA-256 of the
//! canonical serialization (see [`crate::canonical`]); its signature is
//! checked upstream and only carried here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::event_id;
use crate::types::{EventId, PublicKey, Signature};

/// The kind of event, determining how its tags are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(pub u16);

impl Kind {
    /// File metadata: describes a blob by hash and names who may fetch it.
    pub const FILE_METADATA: Self = Self(1063);

    /// Blob authorization. Clients sign these to authorize get, upload, list
    /// and delete requests; the blob index stores its records under the same
    /// kind.
    pub const BLOB_AUTH: Self = Self(24242);

    /// Get the numeric kind.
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for Kind {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// A single tag: an ordered list of strings, conventionally `[key, value, ...]`.
///
/// Tags come from untrusted clients, so nothing here assumes a tag has a key
/// or a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(pub Vec<String>);

impl Tag {
    /// Create a `[key, value]` tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self(vec![key.into(), value.into()])
    }

    /// Create a tag from arbitrary parts.
    pub fn from_parts<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// The tag key (first element), if any.
    pub fn key(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// The tag value (second element), if any.
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    /// All elements.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// A signed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// SHA-256 of the canonical serialization.
    pub id: EventId,

    /// The author's public key.
    pub pubkey: PublicKey,

    /// Author-claimed creation time (Unix seconds). Untrusted.
    pub created_at: i64,

    /// The event kind.
    pub kind: Kind,

    /// Ordered tags; keys are not unique.
    pub tags: Vec<Tag>,

    /// Free-form content.
    pub content: String,

    /// Signature over the id, verified upstream.
    pub sig: Signature,
}

impl Event {
    /// Recompute the id from the event's fields.
    pub fn compute_id(&self) -> EventId {
        event_id(
            &self.pubkey,
            self.created_at,
            self.kind,
            &self.tags,
            &self.content,
        )
    }

    /// Iterate over the values of every tag with the given key.
    ///
    /// Tags with the key but no value are skipped.
    pub fn tag_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |t| t.key() == Some(key))
            .filter_map(Tag::value)
    }

    /// The value of the first tag with the given key.
    ///
    /// Like [`tag_values`](Self::tag_values), tags without a value are skipped.
    /// The result borrows from the event only.
    pub fn first_tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .filter(|t| t.key() == Some(key))
            .find_map(Tag::value)
    }

    /// Check whether the event names `pubkey` in a `"p"` tag.
    pub fn references_pubkey(&self, pubkey: &PublicKey) -> bool {
        let hex = pubkey.to_hex();
        self.tag_values("p").any(|v| v == hex)
    }

    /// Check whether this event has the given kind.
    pub fn is_kind(&self, kind: Kind) -> bool {
        self.kind == kind
    }
}

/// Builder for creating events.
///
/// Events built here are unsigned: their signature is [`Signature::ZERO`].
/// Signing belongs to clients; this layer only builds events for its own
/// bookkeeping and for tests.
pub struct EventBuilder {
    kind: Kind,
    created_at: i64,
    tags: Vec<Tag>,
    content: String,
}

impl EventBuilder {
    /// Start building an event.
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            created_at: 0,
            tags: Vec::new(),
            content: String::new(),
        }
    }

    /// Set the creation time.
    pub fn created_at(mut self, ts: i64) -> Self {
        self.created_at = ts;
        self
    }

    /// Add a tag.
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Add several tags.
    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Set the content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Build the event for the given author, computing its id.
    pub fn build(self, author: PublicKey) -> Event {
        let id = event_id(&author, self.created_at, self.kind, &self.tags, &self.content);
        Event {
            id,
            pubkey: author,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig: Signature::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> PublicKey {
        PublicKey::from_bytes([0x11; 32])
    }

    #[test]
    fn test_event_builder() {
        let viewer = PublicKey::from_bytes([0x22; 32]);
        let event = EventBuilder::new(Kind::FILE_METADATA)
            .created_at(1_700_000_000)
            .tag(Tag::new("x", "ab".repeat(32)))
            .tag(Tag::new("p", viewer.to_hex()))
            .content("holiday photos")
            .build(author());

        assert_eq!(event.kind, Kind::FILE_METADATA);
        assert_eq!(event.pubkey, author());
        assert_eq!(event.id, event.compute_id());
        assert!(event.references_pubkey(&viewer));
        assert!(!event.references_pubkey(&author()));
        assert_eq!(event.first_tag_value("x"), Some("ab".repeat(32).as_str()));
    }

    #[test]
    fn test_malformed_tags_are_skipped() {
        let viewer = PublicKey::from_bytes([0x22; 32]);
        let event = EventBuilder::new(Kind::FILE_METADATA)
            .tag(Tag::from_parts(Vec::<String>::new()))
            .tag(Tag::from_parts(["p"]))
            .tag(Tag::new("p", viewer.to_hex()))
            .build(author());

        assert_eq!(event.tag_values("p").count(), 1);
        assert!(event.references_pubkey(&viewer));
        assert_eq!(event.tags[0].key(), None);
        assert_eq!(event.tags[1].value(), None);
    }

    #[test]
    fn test_tag_value_outlives_key() {
        let event = EventBuilder::new(Kind::FILE_METADATA)
            .tag(Tag::from_parts(["x"]))
            .tag(Tag::new("x", "ef".repeat(32)))
            .build(author());

        let value = {
            let key = String::from("x");
            event.first_tag_value(&key)
        };
        assert_eq!(value, Some("ef".repeat(32).as_str()));
    }

    #[test]
    fn test_json_shape() {
        let event = EventBuilder::new(Kind::FILE_METADATA)
            .created_at(42)
            .tag(Tag::new("x", "cd".repeat(32)))
            .build(author());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], 1063);
        assert_eq!(json["created_at"], 42);
        assert_eq!(json["pubkey"], "11".repeat(32));
        assert_eq!(json["tags"][0][0], "x");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_id_changes_with_content() {
        let a = EventBuilder::new(Kind::FILE_METADATA).content("a").build(author());
        let b = EventBuilder::new(Kind::FILE_METADATA).content("b").build(author());
        assert_ne!(a.id, b.id);
    }
}
