//! Session management module
//!
//! Persists bingo sessions, with their audio attachments transcoded to
//! base64 data URIs, and moves them in and out of JSON export files.

pub mod codec;
mod store;
mod types;

pub use codec::{Attachments, Blob, decode_attachments, encode_attachments};
pub use store::{SessionStore, export_file_name, slugify};
pub use types::{
    CallerState, DEFAULT_EXPORT_NAME, DEFAULT_SESSION_NAME, Session, SessionId, SessionSummary,
    UNKNOWN_MODE,
};
