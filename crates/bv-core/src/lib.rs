//! bv-core: bingo-vault core library
//!
//! Local persistence for bingo sessions (with their audio attachments)
//! and for the PDF document library, backed by an embedded SQLite
//! database, plus JSON export and import of sessions.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod session;
pub mod upload;

pub use config::{Config, ExportConfig, StoreConfig};
pub use error::{Error, Result};
pub use library::{DocumentLibrary, DocumentMeta};
pub use session::{Blob, CallerState, Session, SessionId, SessionStore, SessionSummary};
pub use upload::FileUpload;
