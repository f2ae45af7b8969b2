// file: src/mcp/params.rs
// description: typed tool arguments with generated json schemas
// reference: https://docs.rs/schemars

use rmcp::schemars;
use serde::{Deserialize, Serialize};

// Required strings default to empty and counts are signed; the dispatcher
// rejects missing or out-of-range values as InvalidRequest.

#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[schemars(extend("required" = ["query"]))]
pub struct SearchFilesystemParams {
    #[serde(default)]
    #[schemars(
        description = "Search terms. Supports AND, OR, NOT, \"exact phrases\", -exclusions, wildcards (yubi*) and field terms such as title:budget"
    )]
    pub query: String,

    #[schemars(description = "Maximum number of results (default 20, capped at 100)")]
    pub max_results: Option<i64>,

    #[schemars(description = "Include a short text preview of each match (default true)")]
    pub include_preview: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct SearchByDateParams {
    #[schemars(description = "Optional search terms to combine with the date window")]
    pub query: Option<String>,

    /// Inclusive lower bound, YYYY-MM-DD.
    #[serde(alias = "start_date")]
    #[schemars(description = "Earliest modification date, YYYY-MM-DD (alias: start_date)")]
    pub date_from: Option<String>,

    #[serde(alias = "end_date")]
    #[schemars(description = "Latest modification date, YYYY-MM-DD (alias: end_date)")]
    pub date_to: Option<String>,

    #[schemars(description = "Maximum number of results (default 20, capped at 100)")]
    pub max_results: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[schemars(extend("required" = ["filetype"]))]
pub struct SearchByFiletypeParams {
    #[schemars(description = "Optional search terms to combine with the filetype")]
    pub query: Option<String>,

    #[schemars(
        description = "File type alias (pdf, text, markdown, html, doc, docx, odt, xls, xlsx, image, audio, video, email) or a mimetype such as application/pdf"
    )]
    #[serde(default)]
    pub filetype: String,

    #[schemars(description = "Maximum number of results (default 20, capped at 100)")]
    pub max_results: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[schemars(extend("required" = ["path"]))]
pub struct GetDocumentContentParams {
    #[serde(default, alias = "url")]
    #[schemars(description = "Absolute path or file:// URL of an indexed document (alias: url)")]
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ListRecentFilesParams {
    #[schemars(description = "Maximum number of results (default 20, capped at 100)")]
    pub max_results: Option<i64>,

    #[schemars(description = "Only include files modified within this many days")]
    pub days: Option<i64>,
}
