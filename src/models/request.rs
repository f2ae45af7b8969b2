// file: src/models/request.rs
// description: request-scoped search and document lookup models
// reference: internal data structures

use crate::error::{AdapterError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ordering the engine should apply to results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Relevance,
    ModifiedDescending,
}

/// Structured Boolean clause, compiled by the query translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryClause {
    Term(String),
    Phrase(String),
    Field { name: String, value: String },
    And(Vec<QueryClause>),
    Or(Vec<QueryClause>),
    Not(Box<QueryClause>),
}

/// Inclusive calendar date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub text: Option<String>,
    pub clause: Option<QueryClause>,
    pub date_range: Option<DateRange>,
    pub filetype: Option<String>,
    pub max_results: usize,
    pub sort: SortOrder,
}

impl SearchRequest {
    pub fn new(max_results: usize) -> Self {
        Self {
            text: None,
            clause: None,
            date_range: None,
            filetype: None,
            max_results,
            sort: SortOrder::Relevance,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_clause(mut self, clause: QueryClause) -> Self {
        self.clause = Some(clause);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
        self.filetype = Some(filetype.into());
        self
    }

    pub fn sorted_by_modified(mut self) -> Self {
        self.sort = SortOrder::ModifiedDescending;
        self
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn has_filter(&self) -> bool {
        self.date_range.is_some_and(|r| !r.is_open()) || self.filetype.is_some()
    }

    /// Checks the request-level invariants. Only recency listings may carry
    /// neither text nor a filter.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(AdapterError::InvalidRequest(
                "max_results must be greater than 0".to_string(),
            ));
        }

        let empty = !self.has_text() && self.clause.is_none() && !self.has_filter();
        if empty && self.sort != SortOrder::ModifiedDescending {
            return Err(AdapterError::InvalidRequest(
                "a query or at least one filter is required".to_string(),
            ));
        }

        Ok(())
    }
}

/// Identifies one indexed document by path or `file://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContentRequest {
    path: PathBuf,
}

impl DocumentContentRequest {
    pub fn parse(reference: &str) -> Result<Self> {
        let trimmed = reference.trim();
        let raw = trimmed.strip_prefix("file://").unwrap_or(trimmed);

        if raw.is_empty() {
            return Err(AdapterError::InvalidRequest(
                "document path must not be empty".to_string(),
            ));
        }

        let path = PathBuf::from(raw);
        if !path.is_absolute() {
            return Err(AdapterError::InvalidRequest(format!(
                "document path must be absolute: {raw}"
            )));
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }
}
