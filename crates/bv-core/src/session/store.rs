//! Session persistence using SQLite

use chrono::Utc;
use rusqlite::params;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::clock::{IdClock, now_iso, parse_timestamp};
use crate::config::StoreConfig;
use crate::db::Database;
use crate::session::types::{
    DEFAULT_EXPORT_NAME, DEFAULT_SESSION_NAME, Session, SessionId, SessionSummary,
};
use crate::upload::FileUpload;
use crate::{Error, Result};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY,
    name TEXT,
    date TEXT NOT NULL,
    mode TEXT NOT NULL,
    item_count INTEGER NOT NULL,
    record TEXT NOT NULL
)";

/// SQLite-based session store.
///
/// Owns one connection, opened on the first operation. Construct it once
/// and share it with everything that reads or writes sessions.
pub struct SessionStore {
    db: Database,
    clock: IdClock,
}

impl SessionStore {
    /// Create a store for the configured database. Nothing is opened yet.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            db: Database::new(config, SCHEMA),
            clock: IdClock::new(),
        }
    }

    /// Create an in-memory session store (for testing)
    pub fn in_memory() -> Self {
        Self::new(StoreConfig::in_memory())
    }

    /// Save a session, overwriting any record with the same id.
    ///
    /// Assigns `id`, `date` and `name` on the caller's session when they
    /// are missing, and returns the id.
    pub async fn save(&self, session: &mut Session) -> Result<i64> {
        let id = self.fill_defaults(session, DEFAULT_SESSION_NAME);

        let record = serde_json::to_string(&session.to_record())?;
        let item_count = i64::try_from(session.item_count()).unwrap_or(i64::MAX);

        let mut conn = self.db.lock().await?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO sessions (id, name, date, mode, item_count, record)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                session.name,
                session.date,
                session.mode(),
                item_count,
                record,
            ],
        )?;
        tx.commit()?;

        debug!("Saved session {} ({} attachments)", id, session.attachment_count());
        Ok(id)
    }

    /// List every stored session, most recent first.
    ///
    /// Sessions whose date does not parse are listed last.
    pub async fn list(&self) -> Result<Vec<SessionSummary>> {
        let mut summaries = {
            let conn = self.db.lock().await?;
            let mut stmt =
                conn.prepare("SELECT id, name, date, mode, item_count FROM sessions")?;

            let rows = stmt.query_map([], |row| {
                let item_count: i64 = row.get(4)?;
                Ok(SessionSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    date: row.get(2)?,
                    mode: row.get(3)?,
                    item_count: usize::try_from(item_count).unwrap_or(0),
                })
            })?;

            let mut result = Vec::new();
            for summary in rows {
                result.push(summary?);
            }
            result
        };

        summaries.sort_by_cached_key(|s| std::cmp::Reverse(parse_timestamp(&s.date)));
        Ok(summaries)
    }

    /// Load a session by id with its attachments restored as blobs
    pub async fn get(&self, id: impl Into<SessionId>) -> Result<Option<Session>> {
        let SessionId(id) = id.into();

        let record: Option<String> = {
            let conn = self.db.lock().await?;
            let result = conn.query_row(
                "SELECT record FROM sessions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            );
            match result {
                Ok(record) => Some(record),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(Error::from(e)),
            }
        };

        let Some(record) = record else {
            debug!("Session {} not found", id);
            return Ok(None);
        };

        let value: Value = serde_json::from_str(&record)?;
        let session = Session::from_record(value)?;
        debug!("Loaded session {}", id);
        Ok(Some(session))
    }

    /// Delete a session by id. Deleting a missing id is not an error.
    pub async fn delete(&self, id: impl Into<SessionId>) -> Result<()> {
        let SessionId(id) = id.into();
        let conn = self.db.lock().await?;
        let affected = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        debug!("Deleted session {} ({} rows)", id, affected);
        Ok(())
    }

    /// Write a session to `dir` as pretty-printed JSON, without touching the database.
    ///
    /// The file is named `bingo_session_<slug>_<millis>.json`. Missing
    /// `id`, `date` and `name` are filled in on the caller's session.
    pub async fn export_to_file(&self, session: &mut Session, dir: &Path) -> Result<PathBuf> {
        self.fill_defaults(session, DEFAULT_EXPORT_NAME);

        let json = serde_json::to_string_pretty(&session.to_record())?;
        let name = session.name.as_deref().unwrap_or(DEFAULT_EXPORT_NAME);
        let path = dir.join(export_file_name(name, Utc::now().timestamp_millis()));

        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, json).await?;

        info!("Exported session to {}", path.display());
        Ok(path)
    }

    /// Parse an exported session file back into its in-memory shape.
    ///
    /// The returned session gets a fresh id and date and is not persisted;
    /// call [`SessionStore::save`] to keep it.
    pub async fn import_from_file(&self, file: &FileUpload) -> Result<Session> {
        if !file.is_declared_as(&mime::APPLICATION_JSON) && !file.has_extension("json") {
            return Err(Error::InvalidFileType(format!(
                "{} is not a .json session file",
                file.name
            )));
        }

        let value: Value = serde_json::from_slice(&file.contents).map_err(|e| {
            Error::CorruptFile(format!("Failed to parse {}: {}", file.name, e))
        })?;
        if !value.is_object() {
            return Err(Error::CorruptFile(format!(
                "{} does not contain a JSON object",
                file.name
            )));
        }
        if value.get("generatorState").is_none_or(Value::is_null) {
            return Err(Error::InvalidSession(format!(
                "{} has no generatorState",
                file.name
            )));
        }

        let mut session = Session::from_record(value)?;
        session.id = Some(self.clock.next_id());
        session.date = Some(now_iso());

        info!(
            "Imported session from {} ({} attachments)",
            file.name,
            session.attachment_count()
        );
        Ok(session)
    }

    fn fill_defaults(&self, session: &mut Session, default_name: &str) -> i64 {
        let id = *session.id.get_or_insert_with(|| self.clock.next_id());
        session.date.get_or_insert_with(now_iso);
        session.name.get_or_insert_with(|| default_name.to_string());
        id
    }
}

/// Lowercase `name`, replacing every non-alphanumeric character with `_`
pub fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// `bingo_session_<slug>_<timestamp>.json`
pub fn export_file_name(name: &str, timestamp_millis: i64) -> String {
    format!("bingo_session_{}_{}.json", slugify(name), timestamp_millis)
}
