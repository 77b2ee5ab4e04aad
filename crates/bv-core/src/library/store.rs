//! Document storage implementation using SQLite

use rusqlite::params;
use tracing::{debug, info};

use crate::clock::{IdClock, now_iso};
use crate::config::StoreConfig;
use crate::db::Database;
use crate::library::types::{DocumentMeta, document_title, format_file_size};
use crate::upload::FileUpload;
use crate::{Error, Result};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    file_name TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    date_added TEXT NOT NULL,
    data BLOB NOT NULL
)";

/// SQLite-based shelf of PDF documents
pub struct DocumentLibrary {
    db: Database,
    clock: IdClock,
}

impl DocumentLibrary {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            db: Database::new(config, SCHEMA),
            clock: IdClock::new(),
        }
    }

    /// Create an in-memory library (for testing)
    pub fn in_memory() -> Self {
        Self::new(StoreConfig::in_memory())
    }

    /// Store a PDF and return its metadata.
    ///
    /// Only `application/pdf` files are accepted; a file with no declared
    /// type is accepted when its name ends in `.pdf`.
    pub async fn add(&self, file: &FileUpload) -> Result<DocumentMeta> {
        let is_pdf = match file.content_type {
            Some(_) => file.is_declared_as(&mime::APPLICATION_PDF),
            None => file.has_extension("pdf"),
        };
        if !is_pdf {
            return Err(Error::InvalidFileType(format!(
                "{} is not a PDF document",
                file.name
            )));
        }

        let size_bytes = file.size() as u64;
        let meta = DocumentMeta {
            id: self.clock.next_id(),
            title: document_title(&file.name),
            file_name: file.name.clone(),
            size_bytes,
            size: format_file_size(size_bytes),
            date_added: now_iso(),
        };

        let conn = self.db.lock().await?;
        conn.execute(
            "INSERT OR REPLACE INTO documents (id, title, file_name, size_bytes, date_added, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                meta.id,
                meta.title,
                meta.file_name,
                i64::try_from(size_bytes).unwrap_or(i64::MAX),
                meta.date_added,
                file.contents,
            ],
        )?;

        info!("Added document {} ({})", meta.title, meta.size);
        Ok(meta)
    }

    /// All documents, newest first, without their contents
    pub async fn list(&self) -> Result<Vec<DocumentMeta>> {
        let conn = self.db.lock().await?;
        let mut stmt = conn.prepare(
            "SELECT id, title, file_name, size_bytes, date_added FROM documents
             ORDER BY date_added DESC, id DESC",
        )?;

        let documents = stmt.query_map([], |row| {
            let size_bytes: i64 = row.get(3)?;
            let size_bytes = u64::try_from(size_bytes).unwrap_or(0);
            Ok(DocumentMeta {
                id: row.get(0)?,
                title: row.get(1)?,
                file_name: row.get(2)?,
                size_bytes,
                size: format_file_size(size_bytes),
                date_added: row.get(4)?,
            })
        })?;

        let mut result = Vec::new();
        for document in documents {
            result.push(document?);
        }
        debug!("Listed {} documents", result.len());
        Ok(result)
    }

    /// Raw bytes of a document, or `None` if it does not exist
    pub async fn load(&self, id: i64) -> Result<Option<Vec<u8>>> {
        let conn = self.db.lock().await?;

        let result = conn.query_row(
            "SELECT data FROM documents WHERE id = ?1",
            params![id],
            |row| row.get(0),
        );

        match result {
            Ok(data) => Ok(Some(data)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::from(e)),
        }
    }

    /// Remove a document. Removing a missing id is not an error.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let conn = self.db.lock().await?;
        conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        debug!("Deleted document {}", id);
        Ok(())
    }
}
