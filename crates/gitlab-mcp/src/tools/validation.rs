//! Ordered, fail-fast argument checks run before a tool executes.
//!
//! A tool declares its checks as a static list. They run in order and the
//! first one that fails is reported; the rest are skipped.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// A named predicate over a tool's whole argument object.
#[derive(Clone, Copy)]
pub struct Check {
    /// Argument the check is about, used in logs and error reports.
    pub field: &'static str,
    /// Human-readable reason shown to the caller when the check fails.
    pub message: &'static str,
    pub predicate: fn(&Value) -> bool,
}

/// The first check that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Run `checks` against `args` in order, stopping at the first failure.
pub fn validate(checks: &[Check], args: &Value) -> Result<(), ValidationError> {
    match checks.iter().find(|check| !(check.predicate)(args)) {
        Some(check) => Err(ValidationError {
            field: check.field,
            message: check.message,
        }),
        None => Ok(()),
    }
}

// ── predicate helpers ───────────────────────────────────────────────────────

pub fn is_object(args: &Value) -> bool {
    args.is_object()
}

pub fn str_field<'a>(args: &'a Value, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}

pub fn has_non_empty_string(args: &Value, name: &str) -> bool {
    str_field(args, name).is_some_and(|s| !s.is_empty())
}

pub fn has_non_blank_string(args: &Value, name: &str) -> bool {
    str_field(args, name).is_some_and(|s| !s.trim().is_empty())
}

/// Absent (or `null`) fields pass; present ones must satisfy `accept`.
pub fn optional(args: &Value, name: &str, accept: fn(&Value) -> bool) -> bool {
    match args.get(name) {
        None | Some(Value::Null) => true,
        Some(value) => accept(value),
    }
}

/// A GitLab project reference: a numeric id, or a `namespace/project` path.
pub fn is_valid_project_ref(value: &str) -> bool {
    static PROJECT_PATH: OnceLock<Regex> = OnceLock::new();
    let re = PROJECT_PATH.get_or_init(|| {
        Regex::new(r"^(?:\d+|[A-Za-z0-9_.\-]+(?:/[A-Za-z0-9_.\-]+)+)$")
            .expect("project path regex is valid")
    });
    re.is_match(value)
}

/// Branch name rules of `git check-ref-format --branch`, restricted to a
/// conservative character set.
pub fn is_valid_branch_name(name: &str) -> bool {
    static BRANCH_CHARS: OnceLock<Regex> = OnceLock::new();
    let re = BRANCH_CHARS
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9._/\-]+$").expect("branch charset regex is valid"));

    name.len() <= 255
        && re.is_match(name)
        && name != "@"
        && !name.starts_with('-')
        && !name.starts_with('/')
        && !name.ends_with('/')
        && !name.ends_with('.')
        && !name.ends_with(".lock")
        && !name.contains("..")
        && !name.contains("//")
        && !name.contains("@{")
        && !name.split('/').any(|part| part.starts_with('.'))
}
