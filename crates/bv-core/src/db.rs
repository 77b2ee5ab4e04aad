//! Lazily opened SQLite connection shared by one store

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::{Error, Result};

/// Owns a single connection, opened on first use and reused afterwards
pub struct Database {
    config: StoreConfig,
    /// Schema applied right after the connection is opened
    schema: &'static str,
    conn: OnceCell<Mutex<Connection>>,
}

impl Database {
    pub fn new(config: StoreConfig, schema: &'static str) -> Self {
        Self {
            config,
            schema,
            conn: OnceCell::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.conn.initialized()
    }

    /// Lock the connection, opening it first if this is the first call
    ///
    /// The guard must not be held across an `.await`.
    pub async fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        let conn = self
            .conn
            .get_or_try_init(|| async { self.open().map(Mutex::new) })
            .await?;

        conn.lock()
            .map_err(|_| Error::Storage("database connection lock poisoned".to_string()))
    }

    fn open(&self) -> Result<Connection> {
        let db_path = self.config.db_path.as_str();
        debug!("Opening database at: {}", db_path);

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory()
        } else {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        Error::Storage(format!(
                            "Failed to create database directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
            Connection::open(db_path)
        }
        .map_err(|e| Error::Storage(format!("Failed to open database {}: {}", db_path, e)))?;

        conn.busy_timeout(self.config.busy_timeout())?;
        conn.execute_batch(self.schema)?;

        info!("Database initialized: {}", db_path);
        Ok(conn)
    }
}
