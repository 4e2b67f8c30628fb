//! Event store schema, as an ordered list of SQL migrations.
//!
//! `MIGRATIONS[n]` takes the schema from version `n` to `n + 1`. A database
//! written by a newer build is refused rather than guessed at.

use rusqlite::{params, Connection, Transaction};

use crate::error::{Result, StoreError};

const MIGRATIONS: &[&str] = &[
    // v1: events and their tag index.
    r#"
    CREATE TABLE events (
        id BLOB PRIMARY KEY,              -- SHA-256 of the NIP-01 serialization
        pubkey BLOB NOT NULL,
        created_at INTEGER NOT NULL,      -- author-claimed, Unix seconds
        kind INTEGER NOT NULL,
        tags BLOB NOT NULL,               -- CBOR, as received
        content TEXT NOT NULL,
        sig BLOB NOT NULL,
        ingested_at INTEGER NOT NULL
    );

    -- Only tags with both a key and a value are indexed.
    CREATE TABLE event_tags (
        event_id BLOB NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL
    );

    CREATE INDEX idx_events_pubkey_kind ON events(pubkey, kind);
    CREATE INDEX idx_events_created_at ON events(created_at);
    CREATE INDEX idx_event_tags_key_value ON event_tags(key, value);
    CREATE INDEX idx_event_tags_event ON event_tags(event_id);
    "#,
    // v2: blob index listings read one author's records of one kind, newest first.
    r#"
    DROP INDEX idx_events_pubkey_kind;
    CREATE INDEX idx_events_author_listing ON events(pubkey, kind, created_at DESC);
    CREATE INDEX idx_events_kind_created_at ON events(kind, created_at DESC);
    "#,
];

/// Schema version this build writes.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring the schema up to [`CURRENT_VERSION`]. Safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current = schema_version(conn)?;
    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }
    if current == CURRENT_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for version in (current + 1)..=CURRENT_VERSION {
        apply(&tx, version)?;
    }
    tx.commit()?;

    tracing::debug!(from = current, to = CURRENT_VERSION, "migrated event store schema");
    Ok(())
}

/// Highest applied migration, 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> Result<u32> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?)
}

fn apply(tx: &Transaction<'_>, version: u32) -> Result<()> {
    let sql = usize::try_from(version - 1)
        .ok()
        .and_then(|i| MIGRATIONS.get(i))
        .ok_or_else(|| StoreError::Migration(format!("unknown migration version: {}", version)))?;

    tx.execute_batch(sql)
        .map_err(|e| StoreError::Migration(format!("version {}: {}", version, e)))?;
    tx.execute(
        "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        params![version, now_secs()],
    )?;
    Ok(())
}

/// Get current time in seconds.
fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(conn: &Connection, kind: &str) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = ?1 ORDER BY name")
            .unwrap()
            .query_map([kind], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_fresh_database_gets_current_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables = names(&conn, "table");
        assert!(tables.contains(&"events".to_string()));
        assert!(tables.contains(&"event_tags".to_string()));
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_VERSION);

        let indexes = names(&conn, "index");
        assert!(indexes.contains(&"idx_events_author_listing".to_string()));
        assert!(!indexes.contains(&"idx_events_pubkey_kind".to_string()));
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let applied: u32 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, CURRENT_VERSION);
    }

    #[test]
    fn test_upgrades_a_v1_database() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_migrations (version INTEGER PRIMARY KEY, applied_at INTEGER NOT NULL);
             INSERT INTO schema_migrations VALUES (1, 0);",
        )
        .unwrap();
        conn.execute_batch(MIGRATIONS[0]).unwrap();

        migrate(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 2);
        assert!(names(&conn, "index").contains(&"idx_events_kind_created_at".to_string()));
    }

    #[test]
    fn test_refuses_newer_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, 0)",
            [CURRENT_VERSION + 1],
        )
        .unwrap();

        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }
}
