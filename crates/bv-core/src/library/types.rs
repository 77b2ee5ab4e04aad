//! Document library type definitions

use serde::{Deserialize, Serialize};

/// Metadata of a stored document; the file bytes live beside it in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: i64,
    /// File name without the `.pdf` extension
    pub title: String,
    pub file_name: String,
    pub size_bytes: u64,
    /// Human-readable size, see [`format_file_size`]
    pub size: String,
    /// ISO-8601 timestamp
    pub date_added: String,
}

/// Format a byte count as `"N B"`, `"x.y KB"` or `"x.y MB"`
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// Title shown for an uploaded file: its name minus the `.pdf` extension
pub fn document_title(file_name: &str) -> String {
    file_name
        .strip_suffix(".pdf")
        .or_else(|| file_name.strip_suffix(".PDF"))
        .unwrap_or(file_name)
        .to_string()
}
