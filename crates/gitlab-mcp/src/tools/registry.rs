//! Tool registration and dispatch.

use std::sync::Arc;

use serde_json::Value;

use gitlab_api::MergeRequestApi;

use crate::types::error_codes::{INTERNAL_ERROR, INVALID_PARAMS};
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::validation::validate;
use super::{CreateMergeRequest, Tool};

/// Immutable set of tools, fixed once the server starts.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            definitions: Vec::new(),
        }
    }

    /// The bundled GitLab tools.
    pub fn gitlab(api: Arc<dyn MergeRequestApi>) -> Self {
        Self::new().register(CreateMergeRequest::new(api))
    }

    /// Add a tool. A later tool with the same name replaces the earlier one.
    pub fn register(mut self, tool: impl Tool + 'static) -> Self {
        let definition = tool.definition();
        if let Some(pos) = self.definitions.iter().position(|d| d.name == definition.name) {
            self.tools.remove(pos);
            self.definitions.remove(pos);
        }
        self.tools.push(Arc::new(tool));
        self.definitions.push(definition);
        self
    }

    pub fn list_tools(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Validate `arguments` against the named tool's checks, then invoke it.
    ///
    /// Failures map onto three codes: unknown tool (-32601), failed check
    /// (-32602), and anything the tool itself reports (-32603).
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> McpResult<ToolCallResult> {
        let pos = self
            .position(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;
        let tool = &self.tools[pos];

        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        if let Err(failure) = validate(tool.checks(), &args) {
            tracing::debug!(tool = name, field = failure.field, "argument check failed");
            return Err(McpError::InvalidParams(failure.to_string()));
        }

        tool.invoke(args).await.map_err(|e| match e.code() {
            INVALID_PARAMS | INTERNAL_ERROR => e,
            _ => McpError::InternalError(e.to_string()),
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.definitions.iter().position(|d| d.name == name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
