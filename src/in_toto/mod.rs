//! # in-toto Statement and Envelope Encoding
//!
//! This module holds the in-toto [`Statement`] layer and turns a finished
//! statement into a DSSE [`Envelope`] ready for an external signer.
//!
//! The statement is serialized as compact JSON with keys in struct declaration
//! order (not alphabetical), so the same statement always yields the same
//! payload bytes. Those bytes are base64 encoded into the envelope payload and
//! the signature list starts empty. Nothing here signs.
//!
//! ## Examples
//!
//! ```no_run
//! use slsa_provenance::in_toto::generate_statement_envelope;
//! # use slsa_provenance::in_toto::statement::Statement;
//! # fn statement() -> Statement { unimplemented!() }
//!
//! let envelope = generate_statement_envelope(&statement()).unwrap();
//! assert!(envelope.signatures().is_empty());
//! println!("sign over {} bytes", envelope.pae().len());
//! ```

use crate::error::{Error, Result};

pub mod dsse;
pub mod statement;

pub use dsse::{Envelope, EnvelopeSigner, Signature};
pub use statement::{STATEMENT_TYPE_V01, Statement, Subject};

/// Media type of an in-toto statement carried in a DSSE payload.
pub const DSSE_PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

/// Canonical payload bytes of a statement.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the JSON encoder fails, which does not
/// happen for statements built by this crate.
pub fn encode_statement(statement: &Statement) -> Result<Vec<u8>> {
    serde_json::to_vec(statement).map_err(|e| {
        Error::Serialization(format!("Failed to serialize in-toto statement: {e}"))
    })
}

/// Wraps a statement in an unsigned DSSE envelope.
pub fn generate_statement_envelope(statement: &Statement) -> Result<Envelope> {
    let payload = encode_statement(statement)?;
    Ok(Envelope::new(payload, DSSE_PAYLOAD_TYPE.to_string()))
}
