//! Async GitLab client wrapping reqwest.
//!
//! Authenticates with a personal access token sent in the `PRIVATE-TOKEN`
//! header. Requests are not retried: creating a merge request is not
//! idempotent.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::types::{GitlabError, GitlabResult, MergeRequest, NewMergeRequest};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Merge request operations needed by the MCP tools.
#[async_trait]
pub trait MergeRequestApi: Send + Sync {
    /// Open a merge request in `project`, given as a numeric id or a
    /// namespaced path such as `group/subgroup/project`.
    async fn create_merge_request(
        &self,
        project: &str,
        request: &NewMergeRequest,
    ) -> GitlabResult<MergeRequest>;
}

/// HTTP client bound to one GitLab API base URL (e.g. `https://gitlab.com/api/v4`).
#[derive(Clone)]
pub struct GitlabClient {
    base_url: Url,
    token: String,
    client: reqwest::Client,
}

impl GitlabClient {
    pub fn new(base_url: Url, token: impl Into<String>, timeout: Duration) -> GitlabResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(GitlabError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gitlab-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            token: token.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/projects/{project}/merge_requests`, percent-encoding the
    /// project path so `group/project` becomes `group%2Fproject`.
    pub fn merge_requests_url(&self, project: &str) -> GitlabResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitlabError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["projects", project, "merge_requests"]);
        Ok(url)
    }
}

#[async_trait]
impl MergeRequestApi for GitlabClient {
    async fn create_merge_request(
        &self,
        project: &str,
        request: &NewMergeRequest,
    ) -> GitlabResult<MergeRequest> {
        let url = self.merge_requests_url(project)?;
        tracing::debug!(
            %url,
            source = %request.source_branch,
            target = %request.target_branch,
            "creating merge request"
        );

        let resp = self
            .client
            .post(url)
            .header(TOKEN_HEADER, &self.token)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = api_error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            tracing::warn!(status = status.as_u16(), %message, "merge request creation rejected");
            return Err(GitlabError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mr: MergeRequest =
            serde_json::from_str(&body).map_err(|e| GitlabError::Decode(e.to_string()))?;
        tracing::info!(iid = mr.iid, web_url = %mr.web_url, "merge request created");
        Ok(mr)
    }
}

/// Pull a readable message out of a GitLab error body.
///
/// GitLab reports errors as `{"message": ...}` or `{"error": ...}`, where the
/// value is a string, a list of strings, or an object of field → messages.
fn api_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };

    let field = value
        .get("message")
        .or_else(|| value.get("error"))
        .unwrap_or(&value);

    Some(match field {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    })
}
