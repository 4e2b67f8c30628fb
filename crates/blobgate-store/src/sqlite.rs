//! SQLite implementation of the EventStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use blobgate_core::{Event, EventId, Filter, Kind, PublicKey, Signature, Tag};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{EventStore, SaveResult};

/// SQLite-based event store.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteEventStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEventStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&conn)?;
            f(&mut guard)
        })
        .await?
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| StoreError::LockPoisoned(e.to_string()))
}

/// Columns as read from the `events` table, before validation.
struct RawEvent {
    id: Vec<u8>,
    pubkey: Vec<u8>,
    created_at: i64,
    kind: i64,
    tags: Vec<u8>,
    content: String,
    sig: Vec<u8>,
}

const SELECT_EVENTS: &str = "SELECT id, pubkey, created_at, kind, tags, content, sig FROM events";

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
    Ok(RawEvent {
        id: row.get("id")?,
        pubkey: row.get("pubkey")?,
        created_at: row.get("created_at")?,
        kind: row.get("kind")?,
        tags: row.get("tags")?,
        content: row.get("content")?,
        sig: row.get("sig")?,
    })
}

fn fixed<const N: usize>(bytes: Vec<u8>, column: &str) -> Result<[u8; N]> {
    bytes.try_into().map_err(|b: Vec<u8>| {
        StoreError::InvalidData(format!(
            "column {} holds {} bytes, expected {}",
            column,
            b.len(),
            N
        ))
    })
}

impl RawEvent {
    fn into_event(self) -> Result<Event> {
        let kind = u16::try_from(self.kind)
            .map_err(|_| StoreError::InvalidData(format!("kind {} out of range", self.kind)))?;
        Ok(Event {
            id: EventId(fixed(self.id, "id")?),
            pubkey: PublicKey(fixed(self.pubkey, "pubkey")?),
            created_at: self.created_at,
            kind: Kind(kind),
            tags: decode_tags(&self.tags)?,
            content: self.content,
            sig: Signature(fixed(self.sig, "sig")?),
        })
    }
}

// Tags keep their original order and shape (including malformed ones) as CBOR.
fn encode_tags(tags: &[Tag]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(tags, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_tags(bytes: &[u8]) -> Result<Vec<Tag>> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Append `AND column IN (?, ...)`; an empty list matches nothing.
fn push_in(sql: &mut String, args: &mut Vec<Value>, column: &str, values: Vec<Value>) {
    if values.is_empty() {
        sql.push_str(" AND 0");
        return;
    }
    let placeholders = vec!["?"; values.len()].join(", ");
    sql.push_str(&format!(" AND {} IN ({})", column, placeholders));
    args.extend(values);
}

/// Translate a filter into a WHERE clause with positional arguments.
fn where_clause(filter: &Filter) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(ref ids) = filter.ids {
        let values = ids.iter().map(|id| Value::Blob(id.0.to_vec())).collect();
        push_in(&mut sql, &mut args, "id", values);
    }
    if let Some(ref authors) = filter.authors {
        let values = authors.iter().map(|pk| Value::Blob(pk.0.to_vec())).collect();
        push_in(&mut sql, &mut args, "pubkey", values);
    }
    if let Some(ref kinds) = filter.kinds {
        let values = kinds
            .iter()
            .map(|k| Value::Integer(i64::from(k.as_u16())))
            .collect();
        push_in(&mut sql, &mut args, "kind", values);
    }
    for (key, values) in &filter.tags {
        sql.push_str(" AND id IN (SELECT event_id FROM event_tags WHERE key = ?");
        args.push(Value::Text(key.clone()));
        let values = values.iter().map(|v| Value::Text(v.clone())).collect();
        push_in(&mut sql, &mut args, "value", values);
        sql.push(')');
    }
    if let Some(since) = filter.since {
        sql.push_str(" AND created_at >= ?");
        args.push(Value::Integer(since));
    }
    if let Some(until) = filter.until {
        sql.push_str(" AND created_at <= ?");
        args.push(Value::Integer(until));
    }

    (sql, args)
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn save_event(&self, event: &Event) -> Result<SaveResult> {
        let event = event.clone();
        let tags_cbor = encode_tags(&event.tags)?;

        self.blocking(move |conn| {
            let tx = conn.transaction()?;

            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM events WHERE id = ?1)",
                params![event.id.0.as_slice()],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(SaveResult::AlreadyExists);
            }

            tx.execute(
                "INSERT INTO events (id, pubkey, created_at, kind, tags, content, sig, ingested_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    event.id.0.as_slice(),
                    event.pubkey.0.as_slice(),
                    event.created_at,
                    i64::from(event.kind.as_u16()),
                    tags_cbor,
                    event.content,
                    event.sig.0.as_slice(),
                    now_secs(),
                ],
            )?;

            {
                let mut stmt =
                    tx.prepare("INSERT INTO event_tags (event_id, key, value) VALUES (?1, ?2, ?3)")?;
                for tag in &event.tags {
                    if let (Some(key), Some(value)) = (tag.key(), tag.value()) {
                        stmt.execute(params![event.id.0.as_slice(), key, value])?;
                    }
                }
            }

            tx.commit()?;
            Ok(SaveResult::Saved)
        })
        .await
    }

    async fn query_events(&self, filter: &Filter) -> Result<Vec<Event>> {
        let (clause, mut args) = where_clause(filter);
        let mut sql = format!("{}{} ORDER BY created_at DESC, id ASC", SELECT_EVENTS, clause);
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            args.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let raws = stmt
                .query_map(params_from_iter(args), row_to_raw)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            raws.into_iter().map(RawEvent::into_event).collect()
        })
        .await
    }

    async fn delete_event(&self, id: &EventId) -> Result<bool> {
        let id = *id;
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM event_tags WHERE event_id = ?1",
                params![id.0.as_slice()],
            )?;
            let removed = tx.execute("DELETE FROM events WHERE id = ?1", params![id.0.as_slice()])?;
            tx.commit()?;
            Ok(removed > 0)
        })
        .await
    }

    async fn count_events(&self, filter: &Filter) -> Result<usize> {
        let (clause, args) = where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM events{}", clause);

        self.blocking(move |conn| {
            let count: i64 = conn.query_row(&sql, params_from_iter(args), |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

/// Get current time in seconds.
fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
