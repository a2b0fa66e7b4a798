//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use gitlab_api::{GitlabError, GitlabResult, MergeRequest, MergeRequestApi, NewMergeRequest};
use gitlab_mcp::tools::{Check, Tool, ToolRegistry};
use gitlab_mcp::transport::Frame;
use gitlab_mcp::types::{McpResult, ToolCallResult, ToolDefinition};
use gitlab_mcp::{ProtocolHandler, StdioTransport};

/// In-memory GitLab that records every call.
#[derive(Default)]
pub struct FakeGitlab {
    calls: Mutex<Vec<(String, NewMergeRequest)>>,
    failure: Option<(u16, String)>,
}

impl FakeGitlab {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failure: Some((status, message.to_string())),
        })
    }

    pub fn calls(&self) -> Vec<(String, NewMergeRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MergeRequestApi for FakeGitlab {
    async fn create_merge_request(
        &self,
        project: &str,
        request: &NewMergeRequest,
    ) -> GitlabResult<MergeRequest> {
        self.calls
            .lock()
            .unwrap()
            .push((project.to_string(), request.clone()));

        if let Some((status, message)) = &self.failure {
            return Err(GitlabError::Api {
                status: *status,
                message: message.clone(),
            });
        }

        Ok(MergeRequest {
            id: 1001,
            iid: 7,
            project_id: 42,
            title: request.title.clone(),
            state: "opened".to_string(),
            web_url: "https://gitlab.example.com/group/project/-/merge_requests/7".to_string(),
            source_branch: request.source_branch.clone(),
            target_branch: request.target_branch.clone(),
            draft: request.title.starts_with(gitlab_api::DRAFT_PREFIX),
            created_at: Some("2026-10-14T09:00:00.000Z".to_string()),
        })
    }
}

/// Test tool: sleeps `delay_ms`, then echoes `tag`.
pub struct SlowEcho;

#[async_trait]
impl Tool for SlowEcho {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("slow_echo", json!({"type": "object"}))
            .with_description("Echo after a delay")
    }

    fn checks(&self) -> &[Check] {
        &[]
    }

    async fn invoke(&self, args: Value) -> McpResult<ToolCallResult> {
        let delay = args["delay_ms"].as_u64().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(ToolCallResult::text(args["tag"].to_string()))
    }
}

/// Test tool that always panics.
pub struct Explode;

#[async_trait]
impl Tool for Explode {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("explode", json!({"type": "object"}))
    }

    fn checks(&self) -> &[Check] {
        &[]
    }

    async fn invoke(&self, _args: Value) -> McpResult<ToolCallResult> {
        panic!("tool blew up");
    }
}

pub fn transport(api: Arc<FakeGitlab>) -> StdioTransport {
    StdioTransport::new(ProtocolHandler::new(ToolRegistry::gitlab(api)))
}

pub fn transport_with_test_tools(api: Arc<FakeGitlab>) -> StdioTransport {
    let registry = ToolRegistry::gitlab(api).register(SlowEcho).register(Explode);
    StdioTransport::new(ProtocolHandler::new(registry))
}

/// Run one raw line through the full pipeline and return the response, if any.
pub async fn send_line(transport: &StdioTransport, line: &str) -> Option<Value> {
    transport
        .process_frame(Frame::Line(line.as_bytes().to_vec()))
        .await
        .response()
        .map(|r| serde_json::to_value(r).unwrap())
}

pub async fn send(transport: &StdioTransport, msg: Value) -> Option<Value> {
    send_line(transport, &msg.to_string()).await
}

pub async fn send_unwrap(transport: &StdioTransport, msg: Value) -> Value {
    send(transport, msg).await.expect("expected response")
}

pub fn mr_arguments() -> Value {
    json!({
        "project_id": "group/project",
        "source_branch": "feature/login",
        "target_branch": "main",
        "title": "Add login page"
    })
}

pub fn tools_call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}

/// Parse every line written by the server.
pub fn output_lines(output: &[u8]) -> Vec<Value> {
    std::str::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
