//! # Build Context Mapping
//!
//! Translates a flat snapshot of CI variables into the typed [`Builder`],
//! [`Recipe`] and [`AnyContext`] values a provenance predicate needs.
//!
//! The input is a string-to-string map. GitHub context fields use their plain
//! context names (`repository`, `ref`, `sha`, ...); runner fields are prefixed
//! with `runner.` (`runner.os`, `runner.temp`, `runner.tool_cache`). The
//! `event` field, when present, holds the workflow event as a JSON document.
//! [`env`] builds such a map from process variables or from the JSON contexts
//! a workflow can export.
//!
//! ## Examples
//!
//! ```
//! use slsa_provenance::context::{map_context, CiVariables};
//! use slsa_provenance::config::RecipeConfig;
//!
//! let vars: CiVariables = [
//!     ("repository", "org/repo"),
//!     ("ref", "refs/heads/main"),
//!     ("sha", "abc123"),
//!     ("run_id", "42"),
//!     ("job", "build"),
//!     ("workflow", "ci"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.to_string()))
//! .collect();
//!
//! let mapped = map_context(&vars, &RecipeConfig::default()).unwrap();
//! assert_eq!(mapped.recipe.entry_point, "ci");
//! assert_eq!(mapped.context.github.run_id, "42");
//! ```

use crate::config::RecipeConfig;
use crate::error::{Error, Result};
use crate::hash::DigestSet;
use crate::slsa::predicate::{Builder, Item, Recipe};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub mod env;

/// Flat snapshot of ambient CI variables.
pub type CiVariables = BTreeMap<String, String>;

/// Context fields that must be present and non-empty.
pub const REQUIRED_FIELDS: [&str; 6] = ["repository", "ref", "sha", "run_id", "job", "workflow"];

pub const RUNNER_PREFIX: &str = "runner.";

const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Whether the CI token may be embedded in the recipe environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenPolicy {
    /// Drop the token before it reaches the statement.
    #[default]
    Redact,
    /// Embed the token as supplied. Only for attestations that stay private.
    Include,
}

/// A CI access token. Its memory is wiped on drop and it never prints.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Snapshot of the CI environment embedded as the recipe environment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnyContext {
    pub github: GitHubContext,
    pub runner: RunnerContext,
}

impl AnyContext {
    /// Removes the token from the snapshot, wiping its memory.
    pub fn redact(&mut self) {
        // Dropping the Token zeroizes it.
        self.github.token = None;
    }
}

/// Job information exposed by a GitHub workflow run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubContext {
    pub action: String,
    pub action_path: String,
    pub actor: String,
    pub base_ref: String,
    pub event: serde_json::Value,
    pub event_name: String,
    pub event_path: String,
    pub head_ref: String,
    pub job: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub repository: String,
    pub repository_owner: String,
    pub run_id: String,
    pub run_number: String,
    pub sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
    pub workflow: String,
    pub workspace: String,
}

/// The runner executing the job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerContext {
    pub os: String,
    pub temp: String,
    pub tool_cache: String,
}

/// Everything the context mapper derives from one variable snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct MappedContext {
    pub builder: Builder,
    pub recipe: Recipe,
    pub context: AnyContext,
    /// The source repository at the built commit, present when
    /// [`RecipeConfig::include_source_material`] is set. The recipe's
    /// `definedInMaterial` points at it as material 0.
    pub source_material: Option<Item>,
}

/// Maps CI variables and static recipe configuration onto predicate types.
///
/// # Errors
///
/// - [`Error::MissingContextField`] naming the first required field that is
///   absent or empty, checked in [`REQUIRED_FIELDS`] order.
/// - [`Error::Validation`] if `event` is present but is not valid JSON.
pub fn map_context(vars: &CiVariables, config: &RecipeConfig) -> Result<MappedContext> {
    for field in REQUIRED_FIELDS {
        require(vars, field)?;
    }

    let event = match lookup(vars, "event") {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| Error::Validation(format!("event is not valid JSON: {e}")))?,
        None => serde_json::Value::Null,
    };

    let token = match config.token_policy {
        TokenPolicy::Include => lookup(vars, "token").map(Token::new),
        TokenPolicy::Redact => None,
    };

    let github = GitHubContext {
        action: text(vars, "action"),
        action_path: text(vars, "action_path"),
        actor: text(vars, "actor"),
        base_ref: text(vars, "base_ref"),
        event,
        event_name: text(vars, "event_name"),
        event_path: text(vars, "event_path"),
        head_ref: text(vars, "head_ref"),
        job: text(vars, "job"),
        git_ref: text(vars, "ref"),
        repository: text(vars, "repository"),
        repository_owner: text(vars, "repository_owner"),
        run_id: text(vars, "run_id"),
        run_number: text(vars, "run_number"),
        sha: text(vars, "sha"),
        token,
        workflow: text(vars, "workflow"),
        workspace: text(vars, "workspace"),
    };

    let runner = RunnerContext {
        os: text(vars, &format!("{RUNNER_PREFIX}os")),
        temp: text(vars, &format!("{RUNNER_PREFIX}temp")),
        tool_cache: text(vars, &format!("{RUNNER_PREFIX}tool_cache")),
    };

    let context = AnyContext { github, runner };

    let source_material = config.include_source_material.then(|| {
        let server_url = lookup(vars, "server_url").unwrap_or(DEFAULT_SERVER_URL);
        source_material(server_url, &context.github.repository, &context.github.sha)
    });

    let arguments = match &config.arguments {
        Some(arguments) => arguments.clone(),
        None => workflow_inputs(&context.github.event),
    };

    let recipe = Recipe {
        recipe_type: config.recipe_type.clone(),
        defined_in_material: source_material.as_ref().map(|_| 0),
        entry_point: config
            .entry_point
            .clone()
            .unwrap_or_else(|| context.github.workflow.clone()),
        arguments,
        environment: Some(context.clone()),
    };

    Ok(MappedContext {
        builder: Builder {
            id: config.builder_id.clone(),
        },
        recipe,
        context,
        source_material,
    })
}

/// The material describing the repository checkout at `sha`.
pub fn source_material(server_url: &str, repository: &str, sha: &str) -> Item {
    let mut digest = DigestSet::new();
    digest.insert("sha1".to_string(), sha.to_string());

    Item {
        uri: format!("git+{}/{}", server_url.trim_end_matches('/'), repository),
        digest,
    }
}

// workflow_dispatch is the only event carrying user-provided parameters.
fn workflow_inputs(event: &serde_json::Value) -> serde_json::Value {
    event
        .get("inputs")
        .cloned()
        .unwrap_or(serde_json::Value::Null)
}

fn lookup<'a>(vars: &'a CiVariables, key: &str) -> Option<&'a str> {
    vars.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn require<'a>(vars: &'a CiVariables, key: &str) -> Result<&'a str> {
    lookup(vars, key).ok_or_else(|| Error::MissingContextField(key.to_string()))
}

fn text(vars: &CiVariables, key: &str) -> String {
    lookup(vars, key).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn required_vars() -> CiVariables {
        [
            ("repository", "org/repo"),
            ("ref", "refs/heads/main"),
            ("sha", "abc123"),
            ("run_id", "42"),
            ("job", "build"),
            ("workflow", "ci"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_map_required_fields() {
        let mapped = map_context(&required_vars(), &RecipeConfig::default()).unwrap();

        assert_eq!(mapped.builder.id, crate::config::GITHUB_HOSTED_BUILDER_ID);
        assert_eq!(mapped.context.github.repository, "org/repo");
        assert_eq!(mapped.context.github.git_ref, "refs/heads/main");
        assert_eq!(mapped.context.github.sha, "abc123");
        assert_eq!(mapped.context.github.job, "build");
        assert_eq!(mapped.recipe.entry_point, "ci");
        assert_eq!(mapped.recipe.arguments, serde_json::Value::Null);
        assert_eq!(mapped.recipe.environment.as_ref(), Some(&mapped.context));
    }

    #[test]
    fn test_each_missing_field_is_named() {
        for field in REQUIRED_FIELDS {
            let mut vars = required_vars();
            vars.remove(field);

            match map_context(&vars, &RecipeConfig::default()) {
                Err(Error::MissingContextField(name)) => assert_eq!(name, field),
                other => panic!("Expected MissingContextField({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_required_field_is_missing() {
        let mut vars = required_vars();
        vars.insert("sha".to_string(), String::new());

        let err = map_context(&vars, &RecipeConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingContextField(ref f) if f == "sha"));
    }

    #[test]
    fn test_source_material_is_defined_in_material_zero() {
        let mapped = map_context(&required_vars(), &RecipeConfig::default()).unwrap();

        let material = mapped.source_material.unwrap();
        assert_eq!(material.uri, "git+https://github.com/org/repo");
        assert_eq!(material.digest["sha1"], "abc123");
        assert_eq!(mapped.recipe.defined_in_material, Some(0));
    }

    #[test]
    fn test_source_material_respects_server_url() {
        let mut vars = required_vars();
        vars.insert(
            "server_url".to_string(),
            "https://ghe.example.com/".to_string(),
        );

        let mapped = map_context(&vars, &RecipeConfig::default()).unwrap();
        assert_eq!(
            mapped.source_material.unwrap().uri,
            "git+https://ghe.example.com/org/repo"
        );
    }

    #[test]
    fn test_without_source_material() {
        let config = RecipeConfig {
            include_source_material: false,
            ..RecipeConfig::default()
        };

        let mapped = map_context(&required_vars(), &config).unwrap();
        assert!(mapped.source_material.is_none());
        assert_eq!(mapped.recipe.defined_in_material, None);
    }

    #[test]
    fn test_static_config_overrides() {
        let config = RecipeConfig {
            builder_id: "https://builder.example/v1".to_string(),
            entry_point: Some("release.yml".to_string()),
            arguments: Some(json!({"target": "x86_64"})),
            ..RecipeConfig::default()
        };

        let mapped = map_context(&required_vars(), &config).unwrap();
        assert_eq!(mapped.builder.id, "https://builder.example/v1");
        assert_eq!(mapped.recipe.entry_point, "release.yml");
        assert_eq!(mapped.recipe.arguments, json!({"target": "x86_64"}));
    }

    #[test]
    fn test_event_inputs_become_arguments() {
        let mut vars = required_vars();
        vars.insert(
            "event".to_string(),
            json!({"inputs": {"version": "1.2.3"}, "ref": "main"}).to_string(),
        );

        let mapped = map_context(&vars, &RecipeConfig::default()).unwrap();
        assert_eq!(mapped.recipe.arguments, json!({"version": "1.2.3"}));
        assert_eq!(mapped.context.github.event["ref"], "main");
    }

    #[test]
    fn test_invalid_event_json() {
        let mut vars = required_vars();
        vars.insert("event".to_string(), "{not json".to_string());

        assert!(matches!(
            map_context(&vars, &RecipeConfig::default()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_runner_fields() {
        let mut vars = required_vars();
        vars.insert("runner.os".to_string(), "Linux".to_string());
        vars.insert("runner.temp".to_string(), "/tmp/runner".to_string());
        vars.insert("runner.tool_cache".to_string(), "/opt/hostedtoolcache".to_string());

        let mapped = map_context(&vars, &RecipeConfig::default()).unwrap();
        assert_eq!(
            mapped.context.runner,
            RunnerContext {
                os: "Linux".to_string(),
                temp: "/tmp/runner".to_string(),
                tool_cache: "/opt/hostedtoolcache".to_string(),
            }
        );
    }

    #[test]
    fn test_token_redacted_by_default() {
        let mut vars = required_vars();
        vars.insert("token".to_string(), "ghs_supersecret".to_string());

        let mapped = map_context(&vars, &RecipeConfig::default()).unwrap();
        assert!(mapped.context.github.token.is_none());

        let json = serde_json::to_string(&mapped.recipe).unwrap();
        assert!(!json.contains("ghs_supersecret"));
        assert!(!json.contains("\"token\""));
    }

    #[test]
    fn test_token_included_on_request() {
        let mut vars = required_vars();
        vars.insert("token".to_string(), "ghs_supersecret".to_string());
        let config = RecipeConfig {
            token_policy: TokenPolicy::Include,
            ..RecipeConfig::default()
        };

        let mut mapped = map_context(&vars, &config).unwrap();
        assert_eq!(
            mapped.context.github.token.as_ref().map(Token::expose),
            Some("ghs_supersecret")
        );

        mapped.context.redact();
        assert!(mapped.context.github.token.is_none());
    }

    #[test]
    fn test_token_debug_is_masked() {
        let token = Token::new("ghs_supersecret");
        assert_eq!(format!("{token:?}"), "Token(***)");
    }

    #[test]
    fn test_context_serializes_with_schema_names() {
        let mapped = map_context(&required_vars(), &RecipeConfig::default()).unwrap();
        let value = serde_json::to_value(&mapped.context).unwrap();

        assert_eq!(value["github"]["ref"], "refs/heads/main");
        assert_eq!(value["github"]["run_id"], "42");
        assert!(value["runner"].get("tool_cache").is_some());
    }
}
