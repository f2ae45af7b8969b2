// file: src/mapper.rs
// description: maps native engine records onto normalized result and document models
// reference: field names follow recoll's document fields (url, mtype, fbytes, mtime, abstract)

use crate::index::{ExtractedText, NativeRecord};
use crate::models::{DocumentContent, SearchResultItem, UNKNOWN};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;

const TRUNCATION_MARKER: &str = "...";
const READABLE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, Clone)]
pub struct ResultMapper {
    snippet_chars: usize,
    content_max_chars: usize,
}

impl ResultMapper {
    pub fn new(snippet_chars: usize, content_max_chars: usize) -> Self {
        Self {
            snippet_chars,
            content_max_chars,
        }
    }

    /// Maps records in engine order. Never drops or reorders a record.
    pub fn map_items(&self, records: &[NativeRecord], include_preview: bool) -> Vec<SearchResultItem> {
        records
            .iter()
            .map(|record| self.map_item(record, include_preview))
            .collect()
    }

    pub fn map_item(&self, record: &NativeRecord, include_preview: bool) -> SearchResultItem {
        let fields = CommonFields::extract(record);

        let (snippet, snippet_truncated) = match record.get("abstract") {
            Some(text) if include_preview => {
                let (snippet, truncated) = truncate_chars(text, self.snippet_chars);
                (Some(snippet), truncated)
            }
            _ => (None, false),
        };

        SearchResultItem {
            path: fields.path,
            url: fields.url,
            title: fields.title,
            filename: fields.filename,
            mimetype: fields.mimetype,
            size: fields.size,
            modified: fields.modified,
            modified_readable: readable(fields.modified),
            score: record.get("relevancyrating").and_then(parse_score),
            snippet,
            snippet_truncated,
        }
    }

    pub fn map_document(&self, record: &NativeRecord, extracted: ExtractedText) -> DocumentContent {
        let fields = CommonFields::extract(record);
        let content_length = extracted.text.chars().count();
        let (content, cut) = cut_chars(&extracted.text, self.content_max_chars);
        let truncated = cut || extracted.truncated;

        DocumentContent {
            path: fields.path,
            url: fields.url,
            title: fields.title,
            filename: fields.filename,
            mimetype: fields.mimetype,
            size: fields.size,
            modified: fields.modified,
            modified_readable: readable(fields.modified),
            content: content.to_string(),
            content_length,
            truncated,
            content_source: extracted.source,
        }
    }

    /// Upper bound on bytes to read from disk for one document.
    pub fn content_byte_budget(&self) -> usize {
        // UTF-8 needs at most four bytes per char.
        self.content_max_chars.saturating_mul(4)
    }
}

struct CommonFields {
    path: String,
    url: String,
    title: String,
    filename: String,
    mimetype: String,
    size: Option<u64>,
    modified: Option<DateTime<Utc>>,
}

impl CommonFields {
    fn extract(record: &NativeRecord) -> Self {
        let path = record.path().unwrap_or(UNKNOWN).to_string();
        let url = record
            .get("url")
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN.to_string());

        let filename = record
            .get("filename")
            .map(str::to_string)
            .or_else(|| {
                Path::new(&path)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| UNKNOWN.to_string());

        let title = record
            .get("title")
            .map(str::to_string)
            .unwrap_or_else(|| filename.clone());

        let mimetype = record.get("mtype").unwrap_or(UNKNOWN).to_string();

        let size = record.get("fbytes").and_then(|v| v.parse::<u64>().ok());
        let modified = record.get("mtime").and_then(parse_mtime);

        if size.is_none() || modified.is_none() || mimetype == UNKNOWN {
            debug!("Record for {} is missing metadata; using sentinels", path);
        }

        Self {
            path,
            url,
            title,
            filename,
            mimetype,
            size,
            modified,
        }
    }
}

/// Parses engine modification times: Unix seconds, possibly zero-padded or
/// carrying a one-letter prefix.
pub fn parse_mtime(raw: &str) -> Option<DateTime<Utc>> {
    let digits = raw.trim().trim_start_matches(|c: char| !c.is_ascii_digit());
    let secs = digits.parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}

/// Reads ratings such as `84%` or `0.84`.
pub fn parse_score(raw: &str) -> Option<f32> {
    raw.trim().trim_end_matches('%').trim().parse::<f32>().ok()
}

fn readable(modified: Option<DateTime<Utc>>) -> String {
    modified
        .map(|dt| dt.format(READABLE_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Truncates on a char boundary, appending a marker when text was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match cut_chars(text, max_chars) {
        (head, true) => (format!("{head}{TRUNCATION_MARKER}"), true),
        (head, false) => (head.to_string(), false),
    }
}

fn cut_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => (&text[..cut], true),
        None => (text, false),
    }
}
