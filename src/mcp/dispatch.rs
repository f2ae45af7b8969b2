// file: src/mcp/dispatch.rs
// description: validates tool arguments and routes them through translation, the index gateway and mapping
// reference: one method per exposed tool

use super::params::{
    GetDocumentContentParams, ListRecentFilesParams, SearchByDateParams, SearchByFiletypeParams,
    SearchFilesystemParams,
};
use crate::config::LimitsConfig;
use crate::error::{AdapterError, Result};
use crate::index::IndexGateway;
use crate::mapper::ResultMapper;
use crate::models::{
    DateRange, DocumentContent, DocumentContentRequest, SearchRequest, SearchResponse, SortOrder,
};
use crate::query::QueryTranslator;
use crate::utils::Validator;
use chrono::{Days, Utc};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ToolDispatcher {
    gateway: Arc<IndexGateway>,
    mapper: ResultMapper,
    limits: LimitsConfig,
}

impl ToolDispatcher {
    pub fn new(gateway: Arc<IndexGateway>, limits: LimitsConfig) -> Self {
        Self {
            gateway,
            mapper: ResultMapper::new(limits.snippet_chars, limits.content_max_chars),
            limits,
        }
    }

    pub fn gateway(&self) -> &IndexGateway {
        &self.gateway
    }

    pub async fn search_filesystem(&self, params: SearchFilesystemParams) -> Result<SearchResponse> {
        let query = Validator::require_non_blank("query", Some(params.query.as_str()))?;
        let max_results = self.max_results(params.max_results)?;
        info!("MCP: search_filesystem '{}' (max {})", query, max_results);

        let request = SearchRequest::new(max_results).with_text(query);
        self.run_search(&request, params.include_preview.unwrap_or(true))
            .await
    }

    pub async fn search_by_date(&self, params: SearchByDateParams) -> Result<SearchResponse> {
        let query = Validator::non_blank(params.query.as_deref());
        let from = Validator::parse_optional_date("date_from", params.date_from.as_deref())?;
        let to = Validator::parse_optional_date("date_to", params.date_to.as_deref())?;

        if query.is_none() && from.is_none() && to.is_none() {
            return Err(AdapterError::InvalidRequest(
                "at least one of query, date_from or date_to is required".to_string(),
            ));
        }

        let max_results = self.max_results(params.max_results)?;
        info!(
            "MCP: search_by_date {:?}..{:?} query {:?} (max {})",
            from, to, query, max_results
        );

        let mut request = SearchRequest::new(max_results);
        if let Some(query) = query {
            request = request.with_text(query);
        }
        let range = DateRange::new(from, to);
        if !range.is_open() {
            request = request.with_date_range(range);
        }

        self.run_search(&request, true).await
    }

    pub async fn search_by_filetype(&self, params: SearchByFiletypeParams) -> Result<SearchResponse> {
        let filetype = Validator::require_non_blank("filetype", Some(params.filetype.as_str()))?;
        let query = Validator::non_blank(params.query.as_deref());
        let max_results = self.max_results(params.max_results)?;
        info!(
            "MCP: search_by_filetype {} query {:?} (max {})",
            filetype, query, max_results
        );

        let mut request = SearchRequest::new(max_results).with_filetype(filetype);
        if let Some(query) = query {
            request = request.with_text(query);
        }

        self.run_search(&request, true).await
    }

    pub async fn get_document_content(
        &self,
        params: GetDocumentContentParams,
    ) -> Result<DocumentContent> {
        let request = DocumentContentRequest::parse(&params.path)?;
        info!("MCP: get_document_content {}", request.path().display());

        let (record, text) = self
            .gateway
            .fetch_document(request.path(), self.mapper.content_byte_budget())
            .await?;

        Ok(self.mapper.map_document(&record, text))
    }

    pub async fn list_recent_files(&self, params: ListRecentFilesParams) -> Result<SearchResponse> {
        let max_results = self.max_results(params.max_results)?;
        let days = params.days.map(Validator::validate_days).transpose()?;
        info!("MCP: list_recent_files (max {}, days {:?})", max_results, days);

        let mut request = SearchRequest::new(max_results).sorted_by_modified();
        if let Some(days) = days {
            let cutoff = Utc::now()
                .date_naive()
                .checked_sub_days(Days::new(u64::from(days)))
                .ok_or_else(|| AdapterError::InvalidRequest(format!("days out of range: {days}")))?;
            request = request.with_date_range(DateRange::new(Some(cutoff), None));
        }

        let response = self.run_search(&request, true).await?;
        Ok(response.with_days(days))
    }

    async fn run_search(&self, request: &SearchRequest, include_preview: bool) -> Result<SearchResponse> {
        request.validate()?;
        let compiled = QueryTranslator::translate(request)?;
        debug!("Compiled query: {}", compiled);

        let outcome = match request.sort {
            SortOrder::Relevance => {
                self.gateway.search(&compiled, request.max_results).await?
            }
            SortOrder::ModifiedDescending => {
                self.gateway.recent(&compiled, request.max_results).await?
            }
        };

        let items = self.mapper.map_items(&outcome.records, include_preview);
        Ok(SearchResponse::new(compiled, outcome.total, items))
    }

    fn max_results(&self, requested: Option<i64>) -> Result<usize> {
        Validator::validate_max_results(
            requested,
            self.limits.default_max_results,
            self.limits.max_results_ceiling,
        )
    }
}
