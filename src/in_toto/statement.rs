use crate::hash::DigestSet;
use crate::slsa::predicate::Predicate;
use serde::{Deserialize, Serialize};

/// The in-toto Statement v0.1 type URI.
pub const STATEMENT_TYPE_V01: &str = "https://in-toto.io/Statement/v0.1";

/// The middle layer of the attestation: binds a predicate to the subjects it
/// describes and names the predicate type.
///
/// Field order is the serialized key order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "_type")]
    pub statement_type: String,
    pub subject: Vec<Subject>,
    #[serde(rename = "predicateType")]
    pub predicate_type: String,
    pub predicate: Predicate,
}

/// A software artifact the attestation applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub digest: DigestSet,
}

impl Subject {
    pub fn new(name: impl Into<String>, digest: DigestSet) -> Self {
        Self {
            name: name.into(),
            digest,
        }
    }
}
