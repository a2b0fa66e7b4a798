//! Tool: create_merge_request. Opens a merge request on GitLab.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use gitlab_api::{MergeRequest, MergeRequestApi, NewMergeRequest};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::validation::{self, Check};
use super::Tool;

pub const NAME: &str = "create_merge_request";

#[derive(Debug, Deserialize)]
struct CreateParams {
    project_id: ProjectRef,
    source_branch: String,
    target_branch: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    labels: Option<Vec<String>>,
    #[serde(default)]
    remove_source_branch: Option<bool>,
    #[serde(default)]
    squash: Option<bool>,
    #[serde(default)]
    draft: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectRef {
    Id(u64),
    Path(String),
}

impl ProjectRef {
    fn as_path_segment(&self) -> String {
        match self {
            ProjectRef::Id(id) => id.to_string(),
            ProjectRef::Path(path) => path.clone(),
        }
    }
}

static CHECKS: [Check; 14] = [
    Check {
        field: "arguments",
        message: "arguments must be a JSON object",
        predicate: validation::is_object,
    },
    Check {
        field: "project_id",
        message: "project_id is required and must be a non-empty string or a non-negative integer",
        predicate: project_id_present,
    },
    Check {
        field: "project_id",
        message: "project_id must be a numeric id or a namespaced path like group/project",
        predicate: project_id_syntax,
    },
    Check {
        field: "source_branch",
        message: "source_branch is required and must be a non-empty string",
        predicate: source_branch_present,
    },
    Check {
        field: "source_branch",
        message: "source_branch is not a valid git branch name \
                  (no spaces, '..', '~^:?*[\\' or leading '-')",
        predicate: source_branch_syntax,
    },
    Check {
        field: "target_branch",
        message: "target_branch is required and must be a non-empty string",
        predicate: target_branch_present,
    },
    Check {
        field: "target_branch",
        message: "target_branch is not a valid git branch name \
                  (no spaces, '..', '~^:?*[\\' or leading '-')",
        predicate: target_branch_syntax,
    },
    Check {
        field: "target_branch",
        message: "target_branch must differ from source_branch",
        predicate: branches_differ,
    },
    Check {
        field: "title",
        message: "title is required and must not be blank",
        predicate: title_present,
    },
    Check {
        field: "description",
        message: "description must be a string",
        predicate: description_type,
    },
    Check {
        field: "labels",
        message: "labels must be an array of non-empty strings",
        predicate: labels_type,
    },
    Check {
        field: "remove_source_branch",
        message: "remove_source_branch must be a boolean",
        predicate: remove_source_branch_type,
    },
    Check {
        field: "squash",
        message: "squash must be a boolean",
        predicate: squash_type,
    },
    Check {
        field: "draft",
        message: "draft must be a boolean",
        predicate: draft_type,
    },
];

fn project_id_present(args: &Value) -> bool {
    match args.get("project_id") {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.is_u64(),
        _ => false,
    }
}

fn project_id_syntax(args: &Value) -> bool {
    match args.get("project_id") {
        Some(Value::String(s)) => validation::is_valid_project_ref(s),
        _ => true,
    }
}

fn source_branch_present(args: &Value) -> bool {
    validation::has_non_empty_string(args, "source_branch")
}

fn source_branch_syntax(args: &Value) -> bool {
    validation::str_field(args, "source_branch").is_some_and(validation::is_valid_branch_name)
}

fn target_branch_present(args: &Value) -> bool {
    validation::has_non_empty_string(args, "target_branch")
}

fn target_branch_syntax(args: &Value) -> bool {
    validation::str_field(args, "target_branch").is_some_and(validation::is_valid_branch_name)
}

fn branches_differ(args: &Value) -> bool {
    validation::str_field(args, "source_branch") != validation::str_field(args, "target_branch")
}

fn title_present(args: &Value) -> bool {
    validation::has_non_blank_string(args, "title")
}

fn description_type(args: &Value) -> bool {
    validation::optional(args, "description", Value::is_string)
}

fn labels_type(args: &Value) -> bool {
    validation::optional(args, "labels", |labels| {
        labels.as_array().is_some_and(|items| {
            items
                .iter()
                .all(|item| item.as_str().is_some_and(|s| !s.trim().is_empty()))
        })
    })
}

fn remove_source_branch_type(args: &Value) -> bool {
    validation::optional(args, "remove_source_branch", Value::is_boolean)
}

fn squash_type(args: &Value) -> bool {
    validation::optional(args, "squash", Value::is_boolean)
}

fn draft_type(args: &Value) -> bool {
    validation::optional(args, "draft", Value::is_boolean)
}

pub fn definition() -> ToolDefinition {
    ToolDefinition::new(
        NAME,
        json!({
            "type": "object",
            "properties": {
                "project_id": {
                    "type": ["string", "integer"],
                    "description": "Numeric project id or namespaced path (e.g. group/project)"
                },
                "source_branch": {
                    "type": "string",
                    "description": "Branch containing the changes"
                },
                "target_branch": { "type": "string", "description": "Branch to merge into" },
                "title": { "type": "string", "description": "Merge request title" },
                "description": {
                    "type": "string",
                    "description": "Merge request description (Markdown)"
                },
                "labels": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Labels to apply"
                },
                "remove_source_branch": {
                    "type": "boolean",
                    "description": "Delete the source branch when merged"
                },
                "squash": { "type": "boolean", "description": "Squash commits when merged" },
                "draft": { "type": "boolean", "description": "Open the merge request as a draft" }
            },
            "required": ["project_id", "source_branch", "target_branch", "title"]
        }),
    )
    .with_description(
        "Create a merge request in a GitLab project from source_branch into target_branch",
    )
}

/// The public projection of a created merge request.
pub fn project_result(mr: &MergeRequest) -> Value {
    json!({
        "id": mr.id,
        "iid": mr.iid,
        "project_id": mr.project_id,
        "title": mr.title,
        "state": mr.state,
        "web_url": mr.web_url,
        "source_branch": mr.source_branch,
        "target_branch": mr.target_branch,
        "draft": mr.draft,
        "created_at": mr.created_at,
    })
}

/// Opens merge requests through a [`MergeRequestApi`] backend.
pub struct CreateMergeRequest {
    api: Arc<dyn MergeRequestApi>,
}

impl CreateMergeRequest {
    pub fn new(api: Arc<dyn MergeRequestApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for CreateMergeRequest {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    fn checks(&self) -> &[Check] {
        &CHECKS
    }

    async fn invoke(&self, args: Value) -> McpResult<ToolCallResult> {
        let params: CreateParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let project = params.project_id.as_path_segment();
        let mut request =
            NewMergeRequest::new(params.source_branch, params.target_branch, params.title);
        request.description = params.description;
        request.labels = params.labels.unwrap_or_default();
        request.remove_source_branch = params.remove_source_branch;
        request.squash = params.squash;
        if params.draft.unwrap_or(false) {
            request = request.draft();
        }

        let mr = self.api.create_merge_request(&project, &request).await?;

        ToolCallResult::json(&project_result(&mr))
    }
}
