//! Error types for bv-core

use thiserror::Error;

/// Main error type for bv-core
#[derive(Error, Debug)]
pub enum Error {
    /// The database could not be opened, or a query/transaction failed
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("Corrupt file: {0}")]
    CorruptFile(String),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Result type alias for bv-core
pub type Result<T> = std::result::Result<T, Error>;
