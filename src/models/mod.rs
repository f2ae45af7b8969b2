// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod request;
pub mod search_result;

pub use document::{ContentSource, DocumentContent};
pub use request::{DateRange, DocumentContentRequest, QueryClause, SearchRequest, SortOrder};
pub use search_result::{SearchResponse, SearchResultItem, UNKNOWN};
