//! Discovery of CI variables at the process boundary.
//!
//! Two sources are supported: the `GITHUB_*`/`RUNNER_*` environment variables
//! every GitHub runner exports, and the JSON documents produced by
//! `${{ toJSON(github) }}` / `${{ toJSON(runner) }}` in a workflow.

use super::{CiVariables, RUNNER_PREFIX};
use crate::error::{Error, Result};
use log::debug;
use std::env;
use std::fs;

const GITHUB_ENV_MAPPING: [(&str, &str); 18] = [
    ("GITHUB_ACTION", "action"),
    ("GITHUB_ACTION_PATH", "action_path"),
    ("GITHUB_ACTOR", "actor"),
    ("GITHUB_BASE_REF", "base_ref"),
    ("GITHUB_EVENT_NAME", "event_name"),
    ("GITHUB_EVENT_PATH", "event_path"),
    ("GITHUB_HEAD_REF", "head_ref"),
    ("GITHUB_JOB", "job"),
    ("GITHUB_REF", "ref"),
    ("GITHUB_REPOSITORY", "repository"),
    ("GITHUB_REPOSITORY_OWNER", "repository_owner"),
    ("GITHUB_RUN_ID", "run_id"),
    ("GITHUB_RUN_NUMBER", "run_number"),
    ("GITHUB_SERVER_URL", "server_url"),
    ("GITHUB_SHA", "sha"),
    ("GITHUB_TOKEN", "token"),
    ("GITHUB_WORKFLOW", "workflow"),
    ("GITHUB_WORKSPACE", "workspace"),
];

const RUNNER_ENV_MAPPING: [(&str, &str); 3] = [
    ("RUNNER_OS", "os"),
    ("RUNNER_TEMP", "temp"),
    ("RUNNER_TOOL_CACHE", "tool_cache"),
];

/// Maps `GITHUB_*`/`RUNNER_*` style pairs onto context variable names.
/// Unrelated pairs are ignored.
pub fn vars_from_env_iter<I>(pairs: I) -> CiVariables
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut vars = CiVariables::new();
    for (key, value) in pairs {
        if let Some((_, name)) = GITHUB_ENV_MAPPING.iter().find(|(k, _)| *k == key) {
            vars.insert(name.to_string(), value);
        } else if let Some((_, name)) = RUNNER_ENV_MAPPING.iter().find(|(k, _)| *k == key) {
            vars.insert(format!("{RUNNER_PREFIX}{name}"), value);
        }
    }
    vars
}

/// Reads the CI variables of the current process.
///
/// The workflow event is loaded from `GITHUB_EVENT_PATH` when that file is
/// readable; a missing event file is not an error.
pub fn vars_from_process_env() -> CiVariables {
    let mut vars = vars_from_env_iter(env::vars());

    if let Some(event_path) = vars.get("event_path").cloned() {
        match fs::read_to_string(&event_path) {
            Ok(event) => {
                vars.insert("event".to_string(), event);
            }
            Err(e) => debug!("event file {event_path} not loaded: {e}"),
        }
    }

    vars
}

/// Flattens exported GitHub (and optionally runner) contexts into variables.
///
/// String fields are taken verbatim, nested values (the `event` object) are
/// re-encoded as JSON and `null` fields are dropped.
///
/// # Errors
///
/// Returns [`Error::Validation`] if a document is not a JSON object.
pub fn vars_from_context_json(github: &str, runner: Option<&str>) -> Result<CiVariables> {
    let mut vars = CiVariables::new();
    flatten_into(&mut vars, "", github, "github")?;
    if let Some(runner) = runner {
        flatten_into(&mut vars, RUNNER_PREFIX, runner, "runner")?;
    }
    Ok(vars)
}

fn flatten_into(vars: &mut CiVariables, prefix: &str, json: &str, what: &str) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::Validation(format!("{what} context must be a JSON object")))?;

    for (key, value) in object {
        let text = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        vars.insert(format!("{prefix}{key}"), text);
    }
    Ok(())
}
