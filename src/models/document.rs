// file: src/models/document.rs
// description: full document content model returned by get_document_content
// reference: internal data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the returned text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// Read from the original file on disk
    File,
    /// Binary format; only the engine's stored abstract is available
    IndexAbstract,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub path: String,
    pub url: String,
    pub title: String,
    pub filename: String,
    pub mimetype: String,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub modified_readable: String,
    pub content: String,
    /// Character count of the extracted text before truncation. A lower
    /// bound when the disk read stopped at the byte budget; `size` carries
    /// the file's byte length.
    pub content_length: usize,
    pub truncated: bool,
    pub content_source: ContentSource,
}
