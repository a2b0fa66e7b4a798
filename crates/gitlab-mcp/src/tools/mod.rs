//! MCP tool implementations.

pub mod create_merge_request;
pub mod registry;
pub mod validation;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{McpResult, ToolCallResult, ToolDefinition};

pub use create_merge_request::CreateMergeRequest;
pub use registry::ToolRegistry;
pub use validation::{Check, ValidationError};

/// A named, schema-described unit of work callable through `tools/call` or
/// directly by its name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static descriptor advertised by `tools/list`.
    fn definition(&self) -> ToolDefinition;

    /// Argument checks, in the order they must run.
    fn checks(&self) -> &[Check];

    /// Perform the work. Only called with arguments that passed every check.
    async fn invoke(&self, args: Value) -> McpResult<ToolCallResult>;
}
