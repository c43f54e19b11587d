//! # SLSA Provenance
//!
//! Generate SLSA provenance for the artifacts of a CI build.
//!
//! The crate digests the artifacts on disk, maps the CI build context onto the
//! SLSA v0.1 predicate, assembles an in-toto statement and wraps it in a DSSE
//! envelope that an external signer can sign.
//!
//! ## Quick Start
//!
//! Inside a GitHub Actions job:
//! ```bash
//! slsa-provenance generate files \
//!     --artifact-path=dist/ \
//!     --output-path=provenance.json \
//!     --github-context='${{ toJSON(github) }}' \
//!     --runner-context='${{ toJSON(runner) }}'
//! ```
//!
//! ## Pipeline
//!
//! 1. [`collector`] walks the artifact path and digests every file ([`hash`])
//! 2. [`context`] maps CI variables onto the builder, recipe and environment
//! 3. [`slsa::generators`] composes and validates the statement
//! 4. [`in_toto`] encodes the statement into an unsigned envelope
//!
//! [`slsa::pipeline::Pipeline`] runs the four stages in order.

pub mod cancel;
pub mod cli;
pub mod collector;
pub mod config;
pub mod context;
pub mod error;
pub mod hash;
pub mod in_toto;
pub mod slsa;
#[cfg(test)]
mod tests;
pub mod utils;

// Re-export error types
pub use error::{Error, Result};

/// Initialize logging for the CLI
///
/// The level is taken from `RUST_LOG`.
///
/// # Examples
///
/// ```
/// use slsa_provenance::init_logging;
///
/// init_logging().ok();
///
/// // only one logger can be installed per process
/// assert!(init_logging().is_err());
/// ```
pub fn init_logging() -> Result<()> {
    env_logger::try_init().map_err(|e| Error::InitializationError(e.to_string()))
}

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use config::ProvenanceConfig;
pub use in_toto::{Envelope, Statement};
pub use slsa::pipeline::Pipeline;
