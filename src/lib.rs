// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod index;
pub mod mapper;
pub mod mcp;
pub mod models;
pub mod query;
pub mod utils;

pub use config::{Config, IndexConfig, LimitsConfig};
pub use error::{AdapterError, ErrorKind, Result};
pub use index::{IndexEngine, IndexGateway, IndexSession, NativeRecord, RecollEngine};
pub use mapper::ResultMapper;
pub use models::{
    ContentSource, DateRange, DocumentContent, DocumentContentRequest, QueryClause, SearchRequest,
    SearchResponse, SearchResultItem, SortOrder,
};
pub use query::QueryTranslator;
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};
