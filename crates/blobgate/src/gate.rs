//! The Gate: request pipeline in front of the relay and the blob server.
//!
//! Every operation runs the same way: validate what the client sent, ask
//! the rule chain for a verdict, and only then touch storage.

use std::sync::Arc;

use anyhow::Context;
use futures::TryStreamExt;
use tokio::io::AsyncReadExt;

use blobgate_blobs::{
    BlobDescriptor, BlobError, BlobIndex, BlobReader, BlobStore, EventStoreBlobIndex,
    LocalBlobStore,
};
use blobgate_core::{
    validate_credential, validate_event, AuthAction, ContentHash, Event, EventId, PublicKey,
};
use blobgate_policy::{
    AllowList, DeleteRule, Denial, EventRule, GetRule, OwnershipResolver, PolicyEngine,
    RuleChain, UploadRule,
};
use blobgate_store::{EventStore, SaveResult, SqliteEventStore};

use crate::config::{ConfigError, GateConfig};
use crate::error::Result;
use crate::info::RelayInfo;
use crate::locks::BlobLocks;

/// Blob index used by the gate: records live in the gate's event store.
pub type GateIndex<S> = EventStoreBlobIndex<Arc<S>>;

/// Policy engine used by the gate.
pub type GateEngine<S> = PolicyEngine<Arc<S>, Arc<GateIndex<S>>>;

/// Outcome of offering an event to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestResult {
    /// Stored.
    Accepted(EventId),
    /// Already stored; nothing changed.
    Duplicate(EventId),
    /// Refused by a rule; nothing stored.
    Rejected(Denial),
}

/// The authorization layer and the stores behind it.
pub struct Gate<S: EventStore + 'static, B: BlobStore> {
    events: Arc<S>,
    blobs: B,
    index: Arc<GateIndex<S>>,
    engine: Arc<GateEngine<S>>,
    event_rules: RuleChain<dyn EventRule>,
    get_rules: RuleChain<dyn GetRule>,
    upload_rules: RuleChain<dyn UploadRule>,
    delete_rules: RuleChain<dyn DeleteRule>,
    service_url: String,
    info: RelayInfo,
    clock: fn() -> i64,
    locks: BlobLocks,
}

impl<S: EventStore + 'static, B: BlobStore> Gate<S, B> {
    /// Create a gate. The policy engine heads every rule chain.
    pub fn new(
        events: S,
        blobs: B,
        allow_list: AllowList,
        max_file_size: u64,
        service_url: impl Into<String>,
    ) -> Self {
        let events = Arc::new(events);
        let index = Arc::new(EventStoreBlobIndex::new(events.clone()));
        let engine = Arc::new(PolicyEngine::new(
            allow_list,
            max_file_size,
            OwnershipResolver::new(events.clone(), index.clone()),
        ));

        Self {
            event_rules: RuleChain::<dyn EventRule>::new().with(Box::new(engine.clone())),
            get_rules: RuleChain::<dyn GetRule>::new().with(Box::new(engine.clone())),
            upload_rules: RuleChain::<dyn UploadRule>::new().with(Box::new(engine.clone())),
            delete_rules: RuleChain::<dyn DeleteRule>::new().with(Box::new(engine.clone())),
            events,
            blobs,
            index,
            engine,
            service_url: service_url.into(),
            info: RelayInfo::default(),
            clock: unix_now,
            locks: BlobLocks::default(),
        }
    }

    /// Create a gate from loaded configuration.
    pub fn from_config(
        events: S,
        blobs: B,
        config: &GateConfig,
    ) -> std::result::Result<Self, ConfigError> {
        let gate = Self::new(
            events,
            blobs,
            config.allow_list()?,
            config.max_file_size,
            config.service_url.clone(),
        )
        .with_relay_info(RelayInfo::from_config(config));
        Ok(gate)
    }

    /// Replace the relay information document.
    pub fn with_relay_info(mut self, info: RelayInfo) -> Self {
        self.info = info;
        self
    }

    /// Replace the clock used to check credential times.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Append a rule run on every incoming event after the built-in ones.
    pub fn with_event_rule(mut self, rule: impl EventRule + 'static) -> Self {
        self.event_rules.push(Box::new(rule));
        self
    }

    /// Append a rule run on every download after the built-in ones.
    pub fn with_get_rule(mut self, rule: impl GetRule + 'static) -> Self {
        self.get_rules.push(Box::new(rule));
        self
    }

    /// Append a rule run on every upload after the built-in ones.
    pub fn with_upload_rule(mut self, rule: impl UploadRule + 'static) -> Self {
        self.upload_rules.push(Box::new(rule));
        self
    }

    /// Append a rule run on every delete after the built-in ones.
    pub fn with_delete_rule(mut self, rule: impl DeleteRule + 'static) -> Self {
        self.delete_rules.push(Box::new(rule));
        self
    }

    /// The event store.
    pub fn events(&self) -> &S {
        &self.events
    }

    /// The blob store.
    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// The blob index.
    pub fn index(&self) -> &GateIndex<S> {
        &self.index
    }

    /// The policy engine.
    pub fn engine(&self) -> &GateEngine<S> {
        &self.engine
    }

    /// The relay information document.
    pub fn relay_info(&self) -> &RelayInfo {
        &self.info
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Offer an event to the relay.
    ///
    /// Events whose id does not match their contents are an error; events
    /// refused by a rule come back as [`IngestResult::Rejected`].
    pub async fn ingest_event(&self, event: &Event) -> Result<IngestResult> {
        validate_event(event)?;

        if let Some(denial) = self.event_rules.check_event(event).await.denial() {
            tracing::debug!(event = %event.id, reason = %denial, "event rejected");
            return Ok(IngestResult::Rejected(denial.clone()));
        }

        match self.events.save_event(event).await? {
            SaveResult::Saved => {
                tracing::debug!(event = %event.id, author = %event.pubkey, "event stored");
                Ok(IngestResult::Accepted(event.id))
            }
            SaveResult::AlreadyExists => Ok(IngestResult::Duplicate(event.id)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Blobs
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a blob on behalf of the credential's author.
    pub async fn upload(
        &self,
        auth: Option<&Event>,
        body: &[u8],
        mime_type: Option<&str>,
        extension: Option<&str>,
    ) -> Result<BlobDescriptor> {
        self.check_credential(auth, AuthAction::Upload)?;

        let size = body.len() as u64;
        self.upload_rules
            .check_upload(auth, size, extension)
            .await
            .into_result()?;

        let hash = ContentHash::digest(body);
        let _lock = self.locks.lock(&hash).await;
        self.blobs.store(&hash, body).await?;

        let descriptor = BlobDescriptor::new(
            &self.service_url,
            hash,
            size,
            mime_type.map(str::to_string),
            extension,
            (self.clock)(),
        );
        if let Some(owner) = auth.map(|a| a.pubkey) {
            self.index.keep(&descriptor, &owner).await?;
        }

        tracing::info!(%hash, size, "blob uploaded");
        Ok(descriptor)
    }

    /// Open a blob for the credential's author.
    ///
    /// The descriptor is `None` if the bytes exist but nobody indexed them.
    pub async fn download(
        &self,
        auth: Option<&Event>,
        hash: &ContentHash,
    ) -> Result<(Option<BlobDescriptor>, BlobReader)> {
        self.check_credential(auth, AuthAction::Get)?;

        self.get_rules.check_get(auth, hash).await.into_result()?;

        let reader = self.blobs.load(hash).await?;
        let descriptor = self.index.get(hash).await?;
        tracing::debug!(%hash, "blob served");
        Ok((descriptor, reader))
    }

    /// [`download`](Self::download), read to the end.
    pub async fn download_bytes(&self, auth: Option<&Event>, hash: &ContentHash) -> Result<Vec<u8>> {
        let (_, mut reader) = self.download(auth, hash).await?;
        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .await
            .map_err(BlobError::from)?;
        Ok(body)
    }

    /// Remove the credential author's copy of a blob.
    ///
    /// The author's index entry goes first; the bytes go once no owner is
    /// left. Deleting a blob the author never uploaded is `NotFound`.
    pub async fn delete(&self, auth: Option<&Event>, hash: &ContentHash) -> Result<()> {
        let credential = auth.ok_or(Denial::CredentialMissing)?;
        self.check_credential(auth, AuthAction::Delete)?;

        self.delete_rules.check_delete(auth, hash).await.into_result()?;

        let _lock = self.locks.lock(hash).await;
        if !self.index.delete(hash, &credential.pubkey).await? {
            return Err(BlobError::NotFound(*hash).into());
        }

        if self.index.owners(hash).await?.is_empty() {
            match self.blobs.delete(hash).await {
                Ok(()) => {}
                Err(BlobError::NotFound(_)) => {
                    tracing::warn!(%hash, "indexed blob had no bytes");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(%hash, owner = %credential.pubkey, "blob deleted");
        Ok(())
    }

    /// Everything `owner` has uploaded, newest first.
    pub async fn list(&self, owner: &PublicKey) -> Result<Vec<BlobDescriptor>> {
        Ok(self.index.list(owner).try_collect::<Vec<_>>().await?)
    }

    /// Validate a credential, if one was sent.
    ///
    /// A missing credential is left for the rules to judge.
    fn check_credential(&self, auth: Option<&Event>, action: AuthAction) -> Result<()> {
        if let Some(credential) = auth {
            validate_credential(credential, action, (self.clock)()).map_err(|e| {
                tracing::debug!(%action, author = %credential.pubkey, error = %e, "credential rejected");
                Denial::InvalidCredential(e.to_string())
            })?;
        }
        Ok(())
    }
}

impl Gate<SqliteEventStore, LocalBlobStore> {
    /// Open the SQLite event store and the blob directory named by `config`.
    pub fn open(config: &GateConfig) -> anyhow::Result<Self> {
        let events = SqliteEventStore::open(&config.database_path).with_context(|| {
            format!("failed to open event store at {}", config.database_path.display())
        })?;
        let blobs = LocalBlobStore::new(&config.blob_directory);

        let gate = Self::from_config(events, blobs, config).context("invalid configuration")?;
        tracing::info!(
            database = %config.database_path.display(),
            blobs = %config.blob_directory.display(),
            allowed = gate.engine().allow_list().len(),
            "gate opened"
        );
        Ok(gate)
    }
}

/// Current time in Unix seconds.
fn unix_now() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
