use crate::config::MetadataConfig;
use crate::error::{Error, Result};
use crate::in_toto::statement::{Statement, Subject};
use crate::slsa::predicate::{Builder, Item, Metadata, Predicate, Recipe};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashSet;

pub fn make_builder(id: &str) -> Builder {
    Builder { id: id.to_string() }
}

/// `buildFinishedOn` format: RFC 3339 in UTC with second precision.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn make_metadata(
    invocation_id: &str,
    config: &MetadataConfig,
    finished_on: &DateTime<Utc>,
) -> Metadata {
    Metadata {
        build_invocation_id: invocation_id.to_string(),
        completeness: config.completeness,
        reproducible: config.reproducible,
        build_finished_on: format_timestamp(finished_on),
    }
}

/// Composes the predicate, checking that the recipe's `definedInMaterial`
/// points at an existing material.
pub fn generate_predicate(
    builder: Builder,
    metadata: Metadata,
    recipe: Recipe,
    materials: Vec<Item>,
) -> Result<Predicate> {
    // absent means the recipe is not one of the materials
    if let Some(index) = recipe.defined_in_material {
        if index >= materials.len() {
            return Err(Error::InvalidMaterialIndex {
                index,
                len: materials.len(),
            });
        }
    }

    Ok(Predicate {
        builder,
        metadata,
        recipe,
        materials,
    })
}

/// Wraps a predicate in an in-toto statement.
///
/// Subjects keep the order they are given in. The list must be non-empty,
/// every name non-empty and unique, and every digest set non-empty.
pub fn generate_statement(
    subjects: Vec<Subject>,
    statement_type: &str,
    predicate_type: &str,
    predicate: Predicate,
) -> Result<Statement> {
    validate_subjects(&subjects)?;

    Ok(Statement {
        statement_type: statement_type.to_string(),
        subject: subjects,
        predicate_type: predicate_type.to_string(),
        predicate,
    })
}

/// The provenance builder: subjects, builder, recipe, materials and metadata
/// in, one validated statement out. No I/O.
pub fn generate_provenance_statement(
    subjects: Vec<Subject>,
    statement_type: &str,
    predicate_type: &str,
    builder: Builder,
    recipe: Recipe,
    materials: Vec<Item>,
    metadata: Metadata,
) -> Result<Statement> {
    let predicate = generate_predicate(builder, metadata, recipe, materials)?;
    generate_statement(subjects, statement_type, predicate_type, predicate)
}

/// Parses a JSON array of `{"uri", "digest"}` materials.
pub fn parse_materials(json: &str) -> Result<Vec<Item>> {
    let materials: Vec<Item> = serde_json::from_str(json)?;
    for material in &materials {
        if material.uri.is_empty() {
            return Err(Error::Validation(
                "material uri cannot be empty".to_string(),
            ));
        }
    }
    Ok(materials)
}

fn validate_subjects(subjects: &[Subject]) -> Result<()> {
    if subjects.is_empty() {
        return Err(Error::EmptySubjects);
    }

    let mut seen = HashSet::with_capacity(subjects.len());
    for subject in subjects {
        if subject.name.is_empty() {
            return Err(Error::Validation("subject name cannot be empty".to_string()));
        }
        if subject.digest.is_empty() {
            return Err(Error::EmptyDigestSet(subject.name.clone()));
        }
        if !seen.insert(subject.name.as_str()) {
            return Err(Error::DuplicateSubject(subject.name.clone()));
        }
    }

    Ok(())
}
