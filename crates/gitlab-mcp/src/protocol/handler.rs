//! Main request dispatcher. Receives JSON-RPC messages, routes to handlers.

use tokio::sync::Mutex;

use serde_json::Value;

use crate::tools::ToolRegistry;
use crate::types::*;

use super::method::Method;
use super::negotiation::NegotiatedCapabilities;

/// The main protocol handler that dispatches incoming JSON-RPC messages.
pub struct ProtocolHandler {
    tools: ToolRegistry,
    capabilities: Mutex<NegotiatedCapabilities>,
}

impl ProtocolHandler {
    pub fn new(tools: ToolRegistry) -> Self {
        Self {
            tools,
            capabilities: Mutex::new(NegotiatedCapabilities::default()),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub async fn is_initialized(&self) -> bool {
        self.capabilities.lock().await.initialized
    }

    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Outcome {
        match msg {
            JsonRpcMessage::Request(req) => self.route(Some(req.id), &req.method, req.params).await,
            JsonRpcMessage::Notification(notif) => {
                self.route(None, &notif.method, notif.params).await
            }
            JsonRpcMessage::Response { id } => {
                tracing::warn!(
                    "Ignoring response {} from client: no requests are outstanding",
                    id.map(|id| id.to_string()).unwrap_or_else(|| "null".to_string())
                );
                Outcome::NoResponse
            }
        }
    }

    /// Resolve the method and run it. Notification-style methods never answer;
    /// any other method called without an id is skipped.
    async fn route(&self, id: Option<RequestId>, name: &str, params: Option<Value>) -> Outcome {
        let method = Method::resolve(name, &self.tools);

        if method.is_notification() {
            self.handle_notification(&method, params).await;
            return Outcome::NoResponse;
        }

        let Some(id) = id else {
            tracing::debug!("Ignoring notification for request method: {name}");
            return Outcome::NoResponse;
        };

        match self.dispatch_request(method, params).await {
            Ok(value) => Outcome::Respond(Response::success(id, value)),
            Err(e) => {
                tracing::debug!("Request {id} ({name}) failed: {e}");
                Outcome::Respond(Response::error(Some(id), &e))
            }
        }
    }

    async fn dispatch_request(&self, method: Method, params: Option<Value>) -> McpResult<Value> {
        match method {
            Method::Initialize => self.handle_initialize(params).await,
            Method::Ping | Method::Initialized | Method::Cancelled => {
                Ok(Value::Object(serde_json::Map::new()))
            }
            Method::ToolsList => self.handle_tools_list(),
            Method::ToolsCall => self.handle_tools_call(params).await,
            Method::Tool(name) => self.call_tool(&name, params).await,
            Method::Unknown(name) => Err(McpError::MethodNotFound(name)),
        }
    }

    async fn handle_notification(&self, method: &Method, params: Option<Value>) {
        match method {
            Method::Initialized => {
                self.capabilities.lock().await.mark_initialized();
            }
            Method::Cancelled => {
                let params: Option<CancelRequestParams> =
                    params.and_then(|p| serde_json::from_value(p).ok());
                match params {
                    Some(p) => tracing::info!(
                        "Received cancellation for request {}: {}",
                        p.request_id,
                        p.reason.as_deref().unwrap_or("no reason given")
                    ),
                    None => tracing::info!("Received cancellation notification"),
                }
            }
            _ => {}
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .unwrap_or_default();

        let result = self.capabilities.lock().await.negotiate(init_params);

        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self.tools.list_tools(),
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call_params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Tool call params required".to_string()))?;

        self.call_tool(&call_params.name, call_params.arguments).await
    }

    async fn call_tool(&self, name: &str, arguments: Option<Value>) -> McpResult<Value> {
        tracing::info!("Calling tool {name}");
        let result = self.tools.call(name, arguments).await?;
        Ok(serde_json::to_value(result)?)
    }
}
