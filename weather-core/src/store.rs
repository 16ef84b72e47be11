//! Durable storage for collection records.
//!
//! `SqliteRecordStore` keeps one row per request id in the `weather_data` table.
//! Every call is a single statement, so every call is its own commit.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use crate::error::StoreError;
use crate::model::CollectionRecord;

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value access to collection records, keyed by request id.
///
/// There is deliberately no delete.
pub trait RecordStore: Send + Sync {
    fn get(&self, request_id: &str) -> StoreResult<Option<CollectionRecord>>;

    fn exists(&self, request_id: &str) -> StoreResult<bool> {
        Ok(self.get(request_id)?.is_some())
    }

    /// Insert a new record. Fails with [`StoreError::Duplicate`] if the key is taken.
    fn insert(&self, record: &CollectionRecord) -> StoreResult<()>;

    /// Replace the readings blob of an existing record. The timestamp is untouched.
    fn update_data(&self, request_id: &str, data: &str) -> StoreResult<()>;
}

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open (or create) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store. Contents vanish with the value.
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS weather_data (
                request_id TEXT PRIMARY KEY NOT NULL,
                timestamp TEXT NOT NULL,
                data TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<(String, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    }
}

impl RecordStore for SqliteRecordStore {
    fn get(&self, request_id: &str) -> StoreResult<Option<CollectionRecord>> {
        let row = self
            .conn
            .lock()
            .query_row(
                "SELECT request_id, timestamp, data FROM weather_data WHERE request_id = ?1",
                params![request_id],
                Self::row_to_record,
            )
            .optional()?;

        let Some((request_id, timestamp, data)) = row else {
            return Ok(None);
        };

        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| StoreError::BadTimestamp { request_id: request_id.clone(), value: timestamp })?;

        Ok(Some(CollectionRecord { request_id, timestamp, data }))
    }

    fn exists(&self, request_id: &str) -> StoreResult<bool> {
        let count: i64 = self.conn.lock().query_row(
            "SELECT COUNT(*) FROM weather_data WHERE request_id = ?1",
            params![request_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert(&self, record: &CollectionRecord) -> StoreResult<()> {
        let inserted = self.conn.lock().execute(
            "INSERT OR IGNORE INTO weather_data (request_id, timestamp, data) VALUES (?1, ?2, ?3)",
            params![record.request_id, record.timestamp.to_rfc3339(), record.data],
        )?;

        if inserted == 0 {
            return Err(StoreError::Duplicate(record.request_id.clone()));
        }
        tracing::debug!(request_id = %record.request_id, "created collection record");
        Ok(())
    }

    fn update_data(&self, request_id: &str, data: &str) -> StoreResult<()> {
        let updated = self.conn.lock().execute(
            "UPDATE weather_data SET data = ?1 WHERE request_id = ?2",
            params![data, request_id],
        )?;

        if updated == 0 {
            return Err(StoreError::Missing(request_id.to_string()));
        }
        Ok(())
    }
}
