use crate::error::{Error, Result};
use crate::in_toto::statement::Statement;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// A signature over the envelope's PAE bytes, added by an external signer.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyid: String,
    #[serde_as(as = "serde_with::base64::Base64")]
    pub sig: Vec<u8>,
}

/// Produces signatures over envelope PAE bytes. Implemented outside this crate
/// by whatever holds the signing key.
pub trait EnvelopeSigner {
    fn key_id(&self) -> String;
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// DSSE envelope around a serialized statement.
///
/// Serializes as `{"payloadType", "payload", "signatures"}` with the payload
/// base64 encoded.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    payload_type: String,
    #[serde_as(as = "serde_with::base64::Base64")]
    payload: Vec<u8>,
    signatures: Vec<Signature>,
}

impl Envelope {
    /// Wraps `payload` with an empty signature list.
    pub fn new(payload: Vec<u8>, payload_type: String) -> Self {
        Self {
            payload_type,
            payload,
            signatures: vec![],
        }
    }

    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    /// The raw (decoded) payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The payload exactly as it appears in the serialized envelope.
    pub fn encoded_payload(&self) -> String {
        STANDARD.encode(&self.payload)
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// The exact bytes a signer must sign over: `PAE(payloadType, payload)`.
    pub fn pae(&self) -> Vec<u8> {
        pae(&self.payload_type, &self.payload)
    }

    pub fn add_signature(&mut self, sig: Vec<u8>, keyid: String) -> Result<()> {
        if sig.is_empty() {
            return Err(Error::Validation(
                "DSSE signature cannot be empty".to_string(),
            ));
        }

        self.signatures.push(Signature { keyid, sig });

        Ok(())
    }

    /// Asks `signer` for a signature over [`pae`](Self::pae) and appends it.
    pub fn sign_with(&mut self, signer: &dyn EnvelopeSigner) -> Result<()> {
        let sig = signer.sign(&self.pae())?;
        self.add_signature(sig, signer.key_id())
    }

    /// Parses the payload back into a [`Statement`].
    pub fn decode_statement(&self) -> Result<Statement> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// DSSE v1 pre-authentication encoding.
pub fn pae(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let header = format!(
        "DSSEv1 {} {} {} ",
        payload_type.len(),
        payload_type,
        payload.len()
    );
    let mut result = Vec::with_capacity(header.len() + payload.len());
    result.extend_from_slice(header.as_bytes());
    result.extend_from_slice(payload);
    result
}
