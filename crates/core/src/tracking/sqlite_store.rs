//! SQLite-backed tracked download store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::candidate::LibraryMatchRef;
use crate::config::DatabaseConfig;

use super::{
    DownloadClientInfo, StoreError, TrackedDownload, TrackedDownloadState, TrackedDownloadStore,
};

const SELECT_COLUMNS: &str = "SELECT download_id, client, title, state, matched, source_title, first_seen_at, updated_at FROM tracked_downloads";

/// SQLite-backed tracked download store.
pub struct SqliteTrackedDownloadStore {
    conn: Mutex<Connection>,
}

impl SqliteTrackedDownloadStore {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open the database named by the `[database]` config section.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, StoreError> {
        Self::new(&config.path)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tracked_downloads (
                download_id TEXT PRIMARY KEY,
                client TEXT NOT NULL,
                title TEXT NOT NULL,
                state TEXT NOT NULL,
                matched TEXT,
                source_title TEXT,
                first_seen_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tracked_downloads_first_seen ON tracked_downloads(first_seen_at);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn row_to_download(row: &rusqlite::Row) -> rusqlite::Result<StoredRow> {
        Ok(StoredRow {
            download_id: row.get(0)?,
            client_json: row.get(1)?,
            title: row.get(2)?,
            state_json: row.get(3)?,
            matched_json: row.get(4)?,
            source_title: row.get(5)?,
            first_seen_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

/// Raw column values; decoded outside the rusqlite row callback so JSON
/// errors surface as [`StoreError::Serialization`].
struct StoredRow {
    download_id: String,
    client_json: String,
    title: String,
    state_json: String,
    matched_json: Option<String>,
    source_title: Option<String>,
    first_seen_at: i64,
    updated_at: i64,
}

impl StoredRow {
    fn decode(self) -> Result<TrackedDownload, StoreError> {
        let client: DownloadClientInfo = from_json(&self.client_json)?;
        let state: TrackedDownloadState = from_json(&self.state_json)?;
        let matched: Option<LibraryMatchRef> =
            self.matched_json.as_deref().map(from_json).transpose()?;

        Ok(TrackedDownload {
            download_id: self.download_id,
            client,
            title: self.title,
            state,
            matched,
            source_title: self.source_title,
            first_seen_at: from_micros(self.first_seen_at)?,
            updated_at: from_micros(self.updated_at)?,
        })
    }
}

fn from_json<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, StoreError> {
    serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Timestamps are stored as microseconds since the Unix epoch (UTC).
fn from_micros(value: i64) -> Result<DateTime<Utc>, StoreError> {
    let secs = value.div_euclid(1_000_000);
    let nanos = (value.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| StoreError::Serialization(format!("invalid timestamp {}", value)))
}

impl TrackedDownloadStore for SqliteTrackedDownloadStore {
    fn get(&self, download_id: &str) -> Result<Option<TrackedDownload>, StoreError> {
        let conn = self.lock()?;

        let result = conn.query_row(
            &format!("{} WHERE download_id = ?", SELECT_COLUMNS),
            params![download_id],
            Self::row_to_download,
        );

        match result {
            Ok(row) => row.decode().map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }

    fn upsert(&self, download: &TrackedDownload) -> Result<(), StoreError> {
        let conn = self.lock()?;

        let client_json = to_json(&download.client)?;
        let state_json = to_json(&download.state)?;
        let matched_json = download.matched.as_ref().map(to_json).transpose()?;

        conn.execute(
            "INSERT INTO tracked_downloads (download_id, client, title, state, matched, source_title, first_seen_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(download_id) DO UPDATE SET client = excluded.client, title = excluded.title, state = excluded.state, matched = excluded.matched, source_title = excluded.source_title, first_seen_at = excluded.first_seen_at, updated_at = excluded.updated_at",
            params![
                download.download_id,
                client_json,
                download.title,
                state_json,
                matched_json,
                download.source_title,
                download.first_seen_at.timestamp_micros(),
                download.updated_at.timestamp_micros(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn list(&self) -> Result<Vec<TrackedDownload>, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(&format!(
                "{} ORDER BY first_seen_at ASC, download_id ASC",
                SELECT_COLUMNS
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_download)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut downloads = Vec::new();
        for row_result in rows {
            let row = row_result.map_err(|e| StoreError::Database(e.to_string()))?;
            downloads.push(row.decode()?);
        }

        Ok(downloads)
    }

    fn clear_matches(
        &self,
        predicate: &(dyn Fn(&LibraryMatchRef) -> bool + Sync),
    ) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut affected = Vec::new();
        {
            let mut stmt = tx
                .prepare("SELECT download_id, matched FROM tracked_downloads WHERE matched IS NOT NULL")
                .map_err(|e| StoreError::Database(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(|e| StoreError::Database(e.to_string()))?;

            for row_result in rows {
                let (download_id, matched_json) =
                    row_result.map_err(|e| StoreError::Database(e.to_string()))?;
                let matched: LibraryMatchRef = from_json(&matched_json)?;
                if predicate(&matched) {
                    affected.push(download_id);
                }
            }
        }

        let now = Utc::now().timestamp_micros();
        for download_id in &affected {
            tx.execute(
                "UPDATE tracked_downloads SET matched = NULL, updated_at = ? WHERE download_id = ?",
                params![now, download_id],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(affected.len())
    }
}
