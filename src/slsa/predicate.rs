//! SLSA v0.1 provenance predicate schema.
//!
//! Each type owns its sub-types as named fields; the serialized key names are
//! fixed by the serde attributes, so JSON output matches the published schema
//! regardless of how the Rust types are composed.

use crate::context::AnyContext;
use crate::hash::DigestSet;
use serde::{Deserialize, Serialize};

/// The innermost layer of the attestation, following the in-toto parsing rules.
///
/// `materials` is ordered: [`Recipe::defined_in_material`] indexes into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub builder: Builder,
    pub metadata: Metadata,
    pub recipe: Recipe,
    pub materials: Vec<Item>,
}

/// The entity trusted to have executed the recipe and populated the provenance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Builder {
    pub id: String,
}

/// Other properties of the build.
///
/// There is no `buildStartedOn`: the start time is not known when the
/// statement is assembled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub build_invocation_id: String,
    pub completeness: Completeness,
    pub reproducible: bool,
    pub build_finished_on: String,
}

/// Which fields the builder claims to report completely. This is a policy
/// claim, never derived from the data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completeness {
    pub arguments: bool,
    pub environment: bool,
    pub materials: bool,
}

/// The configuration used for the build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "type")]
    pub recipe_type: String,
    /// Index into [`Predicate::materials`]; `None` when the recipe is not one
    /// of the materials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in_material: Option<usize>,
    pub entry_point: String,
    pub arguments: serde_json::Value,
    pub environment: Option<AnyContext>,
}

/// A material: an input to the build, identified by URI and digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub uri: String,
    pub digest: DigestSet,
}
