//! gitlab-api: minimal GitLab REST (v4) client for merge request automation.

pub mod client;
pub mod types;

pub use client::{GitlabClient, MergeRequestApi, DEFAULT_TIMEOUT_SECS};
pub use types::*;
