//! Tool listing and tool call results.

use serde::Serialize;
use serde_json::Value;

use super::error::McpResult;

/// One block of tool output. Only text is produced by this server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Wrap a serializable value as a single text block of pretty-printed JSON.
    pub fn json(value: &impl Serialize) -> McpResult<Self> {
        Ok(Self::text(serde_json::to_string_pretty(value)?))
    }
}

/// Advertised shape of a tool, as returned by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolListResult<'a> {
    pub tools: &'a [ToolDefinition],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_result_shape() {
        let value = serde_json::to_value(ToolCallResult::text("hi")).unwrap();
        assert_eq!(value, json!({"content": [{"type": "text", "text": "hi"}]}));
    }

    #[test]
    fn test_definition_uses_camel_case_schema_key() {
        let def = ToolDefinition::new("t", json!({"type": "object"})).with_description("d");
        let value = serde_json::to_value(def).unwrap();
        assert_eq!(value["inputSchema"]["type"], "object");
        assert_eq!(value["description"], "d");
    }
}
