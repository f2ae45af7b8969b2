// file: src/mcp/envelope.rs
// description: converts dispatcher outcomes into MCP tool results
// reference: https://docs.rs/rmcp

use crate::error::{AdapterError, ErrorKind, Result};
use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&AdapterError> for ErrorEnvelope {
    fn from(err: &AdapterError) -> Self {
        Self {
            error: ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

impl ErrorEnvelope {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            format!(
                "{{\"error\":{{\"kind\":\"{:?}\",\"message\":\"unserializable error\"}}}}",
                self.error.kind
            )
        })
    }
}

/// Successes become pretty JSON text; failures become an error result
/// carrying the envelope.
pub fn into_call_result<T: Serialize>(tool: &str, outcome: Result<T>) -> CallToolResult {
    let err = match outcome {
        Ok(payload) => match serde_json::to_string_pretty(&payload) {
            Ok(json) => return CallToolResult::success(vec![Content::text(json)]),
            Err(e) => AdapterError::QueryExecution(format!("failed to encode result: {e}")),
        },
        Err(err) => err,
    };

    match err.kind() {
        ErrorKind::InvalidRequest | ErrorKind::InvalidQuery | ErrorKind::DocumentNotFound => {
            warn!("MCP: {} rejected: {}", tool, err)
        }
        _ => error!("MCP: {} failed: {}", tool, err),
    }

    CallToolResult::error(vec![Content::text(ErrorEnvelope::from(&err).to_json())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .as_ref()
            .and_then(|content| content.first())
            .and_then(|content| content.as_text())
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_error_envelope_shape() {
        let result = into_call_result::<()>(
            "get_document_content",
            Err(AdapterError::DocumentNotFound("/tmp/gone.txt".to_string())),
        );
        assert_eq!(result.is_error, Some(true));

        let body: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(body["error"]["kind"], json!("DocumentNotFound"));
        assert!(body["error"]["message"].as_str().unwrap().contains("/tmp/gone.txt"));
    }

    #[test]
    fn test_stale_reported_as_unavailable() {
        let envelope = ErrorEnvelope::from(&AdapterError::StaleSession("moved".to_string()));
        assert_eq!(envelope.error.kind, ErrorKind::IndexUnavailable);
    }

    #[test]
    fn test_success_is_json_payload() {
        let result = into_call_result("search_filesystem", Ok(json!({ "returned_results": 0 })));
        assert_eq!(result.is_error, Some(false));
        let body: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(body["returned_results"], json!(0));
    }
}
