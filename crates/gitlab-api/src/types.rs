//! Request and response types for the merge request endpoints.

use serde::{Deserialize, Serialize, Serializer};

/// Prefix GitLab uses to mark a merge request as a draft.
pub const DRAFT_PREFIX: &str = "Draft: ";

/// Body of `POST /projects/:id/merge_requests`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMergeRequest {
    pub source_branch: String,
    pub target_branch: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "join_labels")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_source_branch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash: Option<bool>,
}

impl NewMergeRequest {
    pub fn new(
        source_branch: impl Into<String>,
        target_branch: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            source_branch: source_branch.into(),
            target_branch: target_branch.into(),
            title: title.into(),
            description: None,
            labels: Vec::new(),
            remove_source_branch: None,
            squash: None,
        }
    }

    /// Mark the merge request as a draft by prefixing its title.
    pub fn draft(mut self) -> Self {
        if !self.title.starts_with(DRAFT_PREFIX) {
            self.title = format!("{DRAFT_PREFIX}{}", self.title);
        }
        self
    }
}

// The API takes labels as a single comma-separated string.
fn join_labels<S: Serializer>(labels: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&labels.join(","))
}

/// A merge request as returned by the API. Only the fields this crate uses
/// are decoded; the rest of the response is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    pub state: String,
    pub web_url: String,
    pub source_branch: String,
    pub target_branch: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Errors returned by the GitLab client.
#[derive(thiserror::Error, Debug)]
pub enum GitlabError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitLab API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

pub type GitlabResult<T> = Result<T, GitlabError>;
