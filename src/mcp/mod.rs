// file: src/mcp/mod.rs
// description: MCP (Model Context Protocol) tool surface over the recoll index
// reference: https://docs.rs/rmcp

pub mod dispatch;
pub mod envelope;
pub mod params;
pub mod server;

pub use dispatch::ToolDispatcher;
pub use envelope::{ErrorEnvelope, into_call_result};
pub use params::{
    GetDocumentContentParams, ListRecentFilesParams, SearchByDateParams, SearchByFiletypeParams,
    SearchFilesystemParams,
};
pub use server::RecollSearchMcp;
