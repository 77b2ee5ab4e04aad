//! User-supplied files (imports and library uploads)

use mime::Mime;
use std::path::Path;

use crate::Result;

/// A file handed to the store by the user, with its declared MIME type
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// File name, including extension
    pub name: String,
    /// MIME type declared by whoever supplied the file, if any
    pub content_type: Option<String>,
    /// Raw file contents
    pub contents: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            contents: contents.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk. No MIME type is declared; checks fall back to the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, contents))
    }

    /// The declared type, if present and well-formed
    pub fn declared_mime(&self) -> Option<Mime> {
        self.content_type.as_deref()?.parse().ok()
    }

    /// Whether the declared type matches `expected`, ignoring parameters such as charset
    pub fn is_declared_as(&self, expected: &Mime) -> bool {
        self.declared_mime()
            .is_some_and(|m| m.essence_str() == expected.essence_str())
    }

    /// Case-sensitive extension check, e.g. `has_extension("json")`
    pub fn has_extension(&self, ext: &str) -> bool {
        self.name
            .strip_suffix(ext)
            .is_some_and(|stem| stem.ends_with('.'))
    }

    pub fn size(&self) -> usize {
        self.contents.len()
    }
}
