//! JSON-RPC 2.0 message types for the MCP protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::McpError;

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Request identifier, a string or a number. A `null` id marks a notification.
///
/// Numbers are kept as parsed so that ids outside `i64`, or with a fraction,
/// are echoed back as sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(serde_json::Number),
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A JSON-RPC request (expects exactly one response).
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    pub id: RequestId,
    pub method: String,
    pub params: Option<Value>,
}

/// A JSON-RPC notification (no id, no response expected).
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcNotification {
    pub method: String,
    pub params: Option<Value>,
}

/// A decoded inbound line.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
    /// A reply from the client to a server-initiated request. This server
    /// never issues any, so these are ignored.
    Response { id: Option<RequestId> },
}

/// A JSON-RPC 2.0 success response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

/// A JSON-RPC 2.0 error response. `id` serializes as `null` when unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: Option<RequestId>,
    pub error: JsonRpcErrorObject,
}

/// Error object within a JSON-RPC error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
}

/// Either kind of outbound envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Success(JsonRpcResponse),
    Error(JsonRpcError),
}

/// What dispatching one inbound message produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Respond(Response),
    NoResponse,
}

impl JsonRpcResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}

impl JsonRpcError {
    pub fn new(id: Option<RequestId>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject { code, message },
        }
    }
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Response::Success(JsonRpcResponse::new(id, result))
    }

    pub fn error(id: Option<RequestId>, error: &McpError) -> Self {
        Response::Error(error.to_json_rpc_error(id))
    }

    pub fn id(&self) -> Option<&RequestId> {
        match self {
            Response::Success(r) => Some(&r.id),
            Response::Error(e) => e.id.as_ref(),
        }
    }

    /// Error code, if this is an error envelope.
    pub fn error_code(&self) -> Option<i32> {
        match self {
            Response::Success(_) => None,
            Response::Error(e) => Some(e.error.code),
        }
    }
}

impl Outcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            Outcome::Respond(r) => Some(r),
            Outcome::NoResponse => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_without_id_serializes_null() {
        let resp = Response::error(None, &McpError::ParseError("EOF".to_string()));
        let value = serde_json::to_value(resp).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["error"]["code"], -32700);
        assert!(value["error"].get("data").is_none());
    }

    #[test]
    fn test_success_envelope_shape() {
        let resp = Response::success(RequestId::String("abc".to_string()), json!({"ok": true}));
        assert_eq!(
            serde_json::to_value(resp).unwrap(),
            json!({"jsonrpc": "2.0", "id": "abc", "result": {"ok": true}})
        );
    }
}
