//! Parameters of the requests and notifications the server understands.

use serde::Deserialize;
use serde_json::Value;

use super::message::RequestId;

/// `tools/call` parameters. Missing `arguments` is treated as `{}` by the
/// registry.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequestParams {
    pub request_id: RequestId,
    #[serde(default)]
    pub reason: Option<String>,
}
