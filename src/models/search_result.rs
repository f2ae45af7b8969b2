// file: src/models/search_result.rs
// description: normalized search hit and search response models
// reference: returned to the agent as tool payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for text fields the engine did not report.
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    /// Filesystem path of the document
    pub path: String,

    /// Engine URL (`file://...`), usable with `get_document_content`
    pub url: String,

    pub title: String,

    pub filename: String,

    pub mimetype: String,

    /// File size in bytes, `None` when unreported
    pub size: Option<u64>,

    /// Last modification time in UTC
    pub modified: Option<DateTime<Utc>>,

    pub modified_readable: String,

    /// Engine relevance rating; only comparable within one result set
    pub score: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    #[serde(default)]
    pub snippet_truncated: bool,
}

impl SearchResultItem {
    pub fn format_summary(&self) -> String {
        let score = self
            .score
            .map(|s| format!("{:.0}%", s))
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} [{}] {} ({})",
            score, self.mimetype, self.path, self.modified_readable
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Query string as compiled for the engine
    pub query: String,

    /// Engine's estimate of the total number of matches
    pub total_results: Option<u64>,

    pub returned_results: usize,

    /// Window applied by `list_recent_files`, in days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,

    pub results: Vec<SearchResultItem>,
}

impl SearchResponse {
    pub fn new(query: String, total_results: Option<u64>, results: Vec<SearchResultItem>) -> Self {
        Self {
            query,
            total_results,
            returned_results: results.len(),
            days: None,
            results,
        }
    }

    pub fn with_days(mut self, days: Option<u32>) -> Self {
        self.days = days;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> SearchResultItem {
        SearchResultItem {
            path: "/home/user/notes/todo.md".to_string(),
            url: "file:///home/user/notes/todo.md".to_string(),
            title: "todo".to_string(),
            filename: "todo.md".to_string(),
            mimetype: "text/markdown".to_string(),
            size: Some(120),
            modified: None,
            modified_readable: UNKNOWN.to_string(),
            score: Some(84.0),
            snippet: None,
            snippet_truncated: false,
        }
    }

    #[test]
    fn test_response_counts_results() {
        let response = SearchResponse::new("todo".to_string(), Some(7), vec![item(), item()]);
        assert_eq!(response.returned_results, 2);
        assert_eq!(response.total_results, Some(7));
    }

    #[test]
    fn test_format_summary() {
        let summary = item().format_summary();
        assert!(summary.contains("84%"));
        assert!(summary.contains("text/markdown"));
        assert!(summary.contains("/home/user/notes/todo.md"));
    }

    #[test]
    fn test_missing_snippet_is_omitted_from_json() {
        let json = serde_json::to_value(item()).unwrap();
        assert!(json.get("snippet").is_none());
        assert!(json.get("size").is_some());
    }
}
