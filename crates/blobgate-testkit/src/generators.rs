//! Proptest generators for property-based testing.

use proptest::prelude::*;

use blobgate_core::{ContentHash, Event, EventBuilder, EventId, Kind, PublicKey, Tag};

/// Generate a random identity.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    any::<[u8; 32]>().prop_map(PublicKey::from_bytes)
}

/// Generate a random EventId.
pub fn event_id() -> impl Strategy<Value = EventId> {
    any::<[u8; 32]>().prop_map(EventId::from_bytes)
}

/// Generate a random ContentHash.
pub fn content_hash() -> impl Strategy<Value = ContentHash> {
    any::<[u8; 32]>().prop_map(ContentHash::from_bytes)
}

/// Generate a reasonable timestamp (Unix seconds).
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=4_000_000_000i64
}

/// Generate blob bytes of specified max length.
pub fn blob_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a tag, including malformed shapes (empty, key only).
pub fn tag() -> impl Strategy<Value = Tag> {
    prop::collection::vec("[a-z]{0,3}", 0..4).prop_map(Tag::from_parts)
}

/// Parameters for generating a file metadata event.
#[derive(Debug, Clone)]
pub struct MetadataParams {
    pub author: PublicKey,
    pub hash: ContentHash,
    pub viewers: Vec<PublicKey>,
    pub created_at: i64,
    pub extra_tags: Vec<Tag>,
    pub content: String,
}

impl Arbitrary for MetadataParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            public_key(),
            content_hash(),
            prop::collection::vec(public_key(), 0..4),
            timestamp(),
            prop::collection::vec(tag(), 0..3),
            ".{0,32}",
        )
            .prop_map(
                |(author, hash, viewers, created_at, extra_tags, content)| MetadataParams {
                    author,
                    hash,
                    viewers,
                    created_at,
                    extra_tags,
                    content,
                },
            )
            .boxed()
    }
}

/// Generate a metadata event from parameters.
pub fn metadata_from_params(params: &MetadataParams) -> Event {
    EventBuilder::new(Kind::FILE_METADATA)
        .created_at(params.created_at)
        .tag(Tag::new("x", params.hash.to_hex()))
        .tags(params.viewers.iter().map(|v| Tag::new("p", v.to_hex())))
        .tags(params.extra_tags.iter().cloned())
        .content(params.content.clone())
        .build(params.author)
}
