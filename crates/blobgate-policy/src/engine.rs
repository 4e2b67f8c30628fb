//! The authorization policy engine.

use blobgate_blobs::BlobIndex;
use blobgate_core::{ContentHash, Event, Kind};
use blobgate_store::EventStore;

use crate::allowlist::AllowList;
use crate::ownership::OwnershipResolver;
use crate::verdict::{Denial, Verdict};

/// Default upload limit: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Decides downloads, uploads, deletes and event ingestion.
///
/// Credentials passed in are assumed to be signature-checked already; the
/// engine only reads their author.
#[derive(Debug)]
pub struct PolicyEngine<S, I> {
    allow_list: AllowList,
    max_file_size: u64,
    resolver: OwnershipResolver<S, I>,
}

impl<S: EventStore, I: BlobIndex> PolicyEngine<S, I> {
    /// Create an engine.
    pub fn new(allow_list: AllowList, max_file_size: u64, resolver: OwnershipResolver<S, I>) -> Self {
        Self {
            allow_list,
            max_file_size,
            resolver,
        }
    }

    /// The injected allow-list.
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Largest accepted upload, in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// The ownership resolver used for downloads.
    pub fn resolver(&self) -> &OwnershipResolver<S, I> {
        &self.resolver
    }

    /// May the credential's author fetch `hash`?
    pub async fn authorize_download(
        &self,
        credential: Option<&Event>,
        hash: &ContentHash,
    ) -> Verdict {
        let Some(credential) = credential else {
            tracing::debug!(%hash, "download refused: no credential");
            return Denial::CredentialMissing.into();
        };

        match self.resolver.resolve(hash, &credential.pubkey).await {
            Ok(true) => Verdict::Allow,
            Ok(false) => {
                tracing::debug!(%hash, requester = %credential.pubkey, "download refused: no associated event");
                Denial::NoAssociatedEvent.into()
            }
            Err(e) => {
                tracing::warn!(%hash, error = %e, "download refused: event query failed");
                Denial::StoreQueryFailure(e.to_string()).into()
            }
        }
    }

    /// May the credential's author upload `size` bytes?
    ///
    /// The size limit applies to everyone and is checked first. `extension`
    /// is not constrained.
    pub fn authorize_upload(
        &self,
        credential: Option<&Event>,
        size: u64,
        extension: Option<&str>,
    ) -> Verdict {
        if size > self.max_file_size {
            tracing::debug!(size, max = self.max_file_size, "upload refused: too large");
            return Denial::QuotaExceeded.into();
        }

        if !self.is_allowed(credential) {
            tracing::debug!(size, ?extension, "upload refused: not allow-listed");
            return Denial::Unauthorized.into();
        }

        Verdict::Allow
    }

    /// May the credential's author delete `hash`?
    ///
    /// Same allow-list gate as uploads. Whether the author actually uploaded
    /// the blob is settled by the blob index when the delete is carried out.
    pub fn authorize_delete(&self, credential: Option<&Event>, hash: &ContentHash) -> Verdict {
        if !self.is_allowed(credential) {
            tracing::debug!(%hash, "delete refused: not allow-listed");
            return Denial::Unauthorized.into();
        }
        Verdict::Allow
    }

    /// May this event be stored at all?
    ///
    /// Only file metadata events from allow-listed authors get in.
    pub fn authorize_event_ingestion(&self, event: &Event) -> Verdict {
        if event.kind != Kind::FILE_METADATA {
            tracing::debug!(event = %event.id, kind = %event.kind, "event refused: kind");
            return Denial::KindNotAllowed.into();
        }
        if !self.allow_list.contains(&event.pubkey) {
            tracing::debug!(event = %event.id, author = %event.pubkey, "event refused: author");
            return Denial::UnauthorizedAuthor.into();
        }
        Verdict::Allow
    }

    fn is_allowed(&self, credential: Option<&Event>) -> bool {
        credential.is_some_and(|c| self.allow_list.contains(&c.pubkey))
    }
}
