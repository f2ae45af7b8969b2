// file: src/mcp/server.rs
// description: MCP server exposing recoll search tools over stdio
// reference: https://docs.rs/rmcp

use super::dispatch::ToolDispatcher;
use super::envelope::into_call_result;
use super::params::{
    GetDocumentContentParams, ListRecentFilesParams, SearchByDateParams, SearchByFiletypeParams,
    SearchFilesystemParams,
};
use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use std::sync::Arc;

const INSTRUCTIONS: &str = "Searches a local Recoll full-text index. Use search_filesystem for keyword \
and Boolean queries, search_by_date and search_by_filetype to filter, list_recent_files for \
recently modified documents, and get_document_content with a path or url from a result to read it. \
Failures come back as {\"error\": {\"kind\", \"message\"}}.";

#[derive(Clone)]
pub struct RecollSearchMcp {
    dispatcher: Arc<ToolDispatcher>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RecollSearchMcp {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            tool_router: Self::tool_router(),
        }
    }

    pub fn get_tool_router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        description = "Search the indexed filesystem using keywords or phrases. Supports Boolean queries (AND, OR, NOT), \"exact phrases\", -exclusions and wildcards. Results are ranked by relevance."
    )]
    async fn search_filesystem(
        &self,
        Parameters(params): Parameters<SearchFilesystemParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.dispatcher.search_filesystem(params).await;
        Ok(into_call_result("search_filesystem", outcome))
    }

    #[tool(
        description = "Search for files modified within a date range (YYYY-MM-DD bounds, either side optional), optionally combined with search terms."
    )]
    async fn search_by_date(
        &self,
        Parameters(params): Parameters<SearchByDateParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.dispatcher.search_by_date(params).await;
        Ok(into_call_result("search_by_date", outcome))
    }

    #[tool(
        description = "Search for files of a given type (pdf, markdown, text, image, email, ... or a mimetype), optionally combined with search terms."
    )]
    async fn search_by_filetype(
        &self,
        Parameters(params): Parameters<SearchByFiletypeParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.dispatcher.search_by_filetype(params).await;
        Ok(into_call_result("search_by_filetype", outcome))
    }

    #[tool(
        description = "Get the text content and metadata of an indexed document by absolute path or file:// URL."
    )]
    async fn get_document_content(
        &self,
        Parameters(params): Parameters<GetDocumentContentParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.dispatcher.get_document_content(params).await;
        Ok(into_call_result("get_document_content", outcome))
    }

    #[tool(
        description = "List the most recently modified files in the index, newest first, optionally limited to the last N days."
    )]
    async fn list_recent_files(
        &self,
        Parameters(params): Parameters<ListRecentFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.dispatcher.list_recent_files(params).await;
        Ok(into_call_result("list_recent_files", outcome))
    }
}

#[tool_handler]
impl ServerHandler for RecollSearchMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "recoll-search".into(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}
