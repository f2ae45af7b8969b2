// file: src/index/mod.rs
// description: index gateway, engine seam and native result records
// reference: internal module structure

pub mod gateway;
#[cfg(test)]
pub(crate) mod memory;
pub mod output;
pub mod recoll;

pub use gateway::IndexGateway;
pub use output::RecollOutputParser;
pub use recoll::{RecollEngine, RecollSession};

use crate::error::{AdapterError, Result};
use crate::models::{ContentSource, SortOrder, UNKNOWN};
use crate::query::is_text_mimetype;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Fields requested from the engine for every result.
pub const RECORD_FIELDS: &[&str] = &[
    "url",
    "filename",
    "title",
    "mtype",
    "fbytes",
    "mtime",
    "relevancyrating",
    "abstract",
];

/// One result as the engine reported it. Fields may be missing or empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeRecord {
    fields: BTreeMap<String, String>,
}

impl NativeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Returns the trimmed value, treating blank values as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Filesystem path derived from the record's URL.
    pub fn path(&self) -> Option<&str> {
        self.get("url")
            .map(|url| url.strip_prefix("file://").unwrap_or(url))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub limit: usize,
    pub sort: SortOrder,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// Engine's estimate of total matches, when it reports one
    pub total: Option<u64>,
    pub records: Vec<NativeRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub source: ContentSource,
    /// The read stopped at the byte budget before the end of the file.
    pub truncated: bool,
}

/// Opens sessions against an external full-text index.
#[async_trait]
pub trait IndexEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn open(&self) -> Result<Arc<dyn IndexSession>>;
}

/// A read-only handle on an opened index.
#[async_trait]
pub trait IndexSession: Send + Sync {
    /// Runs a compiled query, yielding at most `options.limit` records in
    /// engine order.
    async fn query(&self, query: &str, options: &QueryOptions) -> Result<QueryOutcome>;

    /// Finds the indexed record for an exact path.
    async fn lookup(&self, path: &Path) -> Result<Option<NativeRecord>>;

    /// Reads the text of an indexed document, at most `max_bytes` from disk.
    async fn read_content(&self, record: &NativeRecord, max_bytes: usize) -> Result<ExtractedText>;

    /// True when the on-disk index no longer matches this session.
    async fn is_stale(&self) -> bool;
}

/// Reads a document from disk for engines that do not store full text.
/// Text formats are read up to `max_bytes`; other formats fall back to the
/// stored abstract once the file is confirmed readable.
pub async fn read_document_text(record: &NativeRecord, max_bytes: usize) -> Result<ExtractedText> {
    use tokio::io::AsyncReadExt;

    let path = record.path().ok_or_else(|| AdapterError::ContentUnavailable {
        path: UNKNOWN.to_string(),
        reason: "index record carries no location".to_string(),
    })?;

    let unavailable = |e: std::io::Error| AdapterError::ContentUnavailable {
        path: path.to_string(),
        reason: e.to_string(),
    };

    let file = tokio::fs::File::open(path).await.map_err(unavailable)?;

    if is_text_mimetype(record.get("mtype").unwrap_or_default()) {
        let mut buf = Vec::new();
        file.take((max_bytes as u64).saturating_add(1))
            .read_to_end(&mut buf)
            .await
            .map_err(unavailable)?;

        let truncated = buf.len() > max_bytes;
        buf.truncate(max_bytes);

        return Ok(ExtractedText {
            text: String::from_utf8_lossy(&buf).into_owned(),
            source: ContentSource::File,
            truncated,
        });
    }

    Ok(ExtractedText {
        text: record.get("abstract").unwrap_or_default().to_string(),
        source: ContentSource::IndexAbstract,
        truncated: false,
    })
}
