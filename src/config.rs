//! Typed configuration for the provenance pipeline.
//!
//! Nothing here is read from process-wide state; the CLI (or any other caller)
//! builds these values and hands them to the pipeline.

use crate::context::TokenPolicy;
use crate::in_toto::STATEMENT_TYPE_V01;
use crate::hash::DigestConfig;
use crate::slsa::PROVENANCE_PREDICATE_TYPE_V01;
use crate::slsa::predicate::{Completeness, Item};
use std::num::NonZeroUsize;
use std::thread;

pub const GITHUB_HOSTED_BUILDER_ID: &str = "https://github.com/Attestations/GitHubHostedActions@v1";
pub const GITHUB_ACTIONS_RECIPE_TYPE: &str =
    "https://github.com/Attestations/GitHubActionsWorkflow@v1";

/// Upper bound for the default number of digest workers.
pub const MAX_DEFAULT_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub digest: DigestConfig,
    /// Maximum number of files digested at once.
    pub concurrency: NonZeroUsize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            digest: DigestConfig::default(),
            concurrency: default_concurrency(),
        }
    }
}

/// Available parallelism, capped at [`MAX_DEFAULT_CONCURRENCY`].
pub fn default_concurrency() -> NonZeroUsize {
    let available = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    NonZeroUsize::new(available.min(MAX_DEFAULT_CONCURRENCY)).unwrap_or(NonZeroUsize::MIN)
}

/// Static recipe and builder settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeConfig {
    pub builder_id: String,
    pub recipe_type: String,
    /// Defaults to the workflow name when unset.
    pub entry_point: Option<String>,
    /// Defaults to the workflow_dispatch inputs of the event when unset.
    pub arguments: Option<serde_json::Value>,
    pub token_policy: TokenPolicy,
    /// Record the source checkout as material 0.
    pub include_source_material: bool,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            builder_id: GITHUB_HOSTED_BUILDER_ID.to_string(),
            recipe_type: GITHUB_ACTIONS_RECIPE_TYPE.to_string(),
            entry_point: None,
            arguments: None,
            token_policy: TokenPolicy::default(),
            include_source_material: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataConfig {
    pub reproducible: bool,
    pub completeness: Completeness,
}

/// Everything the pipeline needs besides the artifact path and the CI variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceConfig {
    /// Pinned in-toto statement type URI.
    pub statement_type: String,
    /// Pinned predicate type URI.
    pub predicate_type: String,
    pub collector: CollectorConfig,
    pub recipe: RecipeConfig,
    pub metadata: MetadataConfig,
    /// Appended after the source material, in order.
    pub extra_materials: Vec<Item>,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            statement_type: STATEMENT_TYPE_V01.to_string(),
            predicate_type: PROVENANCE_PREDICATE_TYPE_V01.to_string(),
            collector: CollectorConfig::default(),
            recipe: RecipeConfig::default(),
            metadata: MetadataConfig::default(),
            extra_materials: Vec::new(),
        }
    }
}
