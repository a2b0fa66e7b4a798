//! Method identifiers understood by the server.

use crate::tools::ToolRegistry;

/// A method name resolved against the built-in methods and the registered tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Initialize,
    Initialized,
    Cancelled,
    Ping,
    ToolsList,
    ToolsCall,
    /// A registered tool invoked by its own name, params used as arguments.
    Tool(String),
    Unknown(String),
}

impl Method {
    pub fn resolve(name: &str, tools: &ToolRegistry) -> Self {
        match name {
            "initialize" => Method::Initialize,
            "notifications/initialized" | "initialized" => Method::Initialized,
            "notifications/cancelled" | "$/cancelRequest" => Method::Cancelled,
            "ping" => Method::Ping,
            "tools/list" => Method::ToolsList,
            "tools/call" => Method::ToolsCall,
            other if tools.contains(other) => Method::Tool(other.to_string()),
            other => Method::Unknown(other.to_string()),
        }
    }

    /// Fire-and-forget methods that never produce a response, even when the
    /// client attaches an id.
    pub fn is_notification(&self) -> bool {
        matches!(self, Method::Initialized | Method::Cancelled)
    }
}
