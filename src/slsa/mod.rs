//! # SLSA Provenance Generation
//!
//! This module assembles SLSA v0.1 build provenance and wraps it as an in-toto
//! statement. SLSA provenance is a verifiable record of:
//! - What was built (the subjects, bound by digest)
//! - How it was built (the recipe: type, entry point, arguments, environment)
//! - Who built it (the builder identity)
//! - What went in (the materials, such as the source checkout)
//!
//! ## Key Components
//!
//! - [`predicate`] - The predicate schema types
//! - [`generators`] - Pure composition of subjects and predicate into a statement
//! - [`pipeline`] - The end-to-end run: collect, map, build, encode
//! - [`PROVENANCE_PREDICATE_TYPE_V01`] - The SLSA v0.1 predicate type URI
//!
//! ## Examples
//!
//! ```no_run
//! use slsa_provenance::config::ProvenanceConfig;
//! use slsa_provenance::context::env::vars_from_process_env;
//! use slsa_provenance::slsa::pipeline::Pipeline;
//! use std::path::Path;
//!
//! let pipeline = Pipeline::new(ProvenanceConfig::default());
//! let envelope = pipeline
//!     .generate_envelope(Path::new("dist/"), &vars_from_process_env(), chrono::Utc::now())
//!     .unwrap();
//! println!("{}", envelope.to_json_pretty().unwrap());
//! ```
pub mod generators;
pub mod pipeline;
pub mod predicate;

/// The SLSA v0.1 build provenance predicate type URI.
///
/// ```
/// use slsa_provenance::slsa::PROVENANCE_PREDICATE_TYPE_V01;
///
/// assert_eq!(PROVENANCE_PREDICATE_TYPE_V01, "https://slsa.dev/provenance/v0.1");
/// ```
pub const PROVENANCE_PREDICATE_TYPE_V01: &str = "https://slsa.dev/provenance/v0.1";
