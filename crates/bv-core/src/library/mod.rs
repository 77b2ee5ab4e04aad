//! PDF document library
//!
//! Keeps uploaded PDF files and their metadata in the embedded database.

mod store;
mod types;

pub use store::DocumentLibrary;
pub use types::{DocumentMeta, document_title, format_file_size};
