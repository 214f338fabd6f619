// src/models/credential.rs
//! Blockcerts-style credential data model.
//!
//! Only the fields the verifier inspects are typed. Everything else under
//! `data` is kept as opaque claim data in its original key order, because the
//! commitment hash covers every top-level key.
//!
//! Typed fields must hold strings (or `null`). A number or object in
//! `recipient.name`, `recipient.email`, `issuer.name`, any `identityProof`
//! field or `signature.targetHash` makes parsing fail with
//! [`CredentialError::Malformed`]. Such a document never reaches the
//! verifier, so it gets no `invalid_recipient` or `invalid_signature`
//! outcome; the HTTP layer answers 422.
//!
//! ```json
//! {
//!   "data": {
//!     "recipient": { "name": "Alice", "email": "alice@example.com" },
//!     "issuer": {
//!       "name": "Example University",
//!       "identityProof": { "type": "DNS-DID", "location": "example.edu", "key": "abc123" }
//!     },
//!     "degree": "BSc"
//!   },
//!   "signature": { "targetHash": "…" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Identity-proof scheme accepted by this verifier.
pub const DNS_DID: &str = "DNS-DID";

/// Errors raised while turning raw input into a [`Credential`].
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Input is not JSON, or a typed field has the wrong JSON type
    #[error("malformed credential: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document itself is not a JSON object
    #[error("credential must be a JSON object")]
    NotObject,

    /// `data` is present but is not a JSON object
    #[error("credential data must be a JSON object")]
    DataNotObject,
}

/// A credential document as submitted for verification.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Credential {
    /// Claim data covered by the target hash
    #[serde(default)]
    pub data: Option<CredentialData>,

    /// Signature block carrying the claimed target hash
    #[serde(default)]
    pub signature: Option<SignatureBlock>,
}

impl Credential {
    /// Parses a credential from raw JSON bytes.
    ///
    /// # Errors
    /// Returns [`CredentialError`] if the bytes are not a JSON object or a
    /// typed field (recipient, issuer, identity proof, target hash) has the
    /// wrong JSON type.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CredentialError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Parses a credential from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, CredentialError> {
        if !value.is_object() {
            return Err(CredentialError::NotObject);
        }
        if let Some(data) = value.get("data") {
            if !data.is_null() && !data.is_object() {
                return Err(CredentialError::DataNotObject);
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn recipient(&self) -> Option<&Recipient> {
        self.data.as_ref().and_then(|d| d.recipient.as_ref())
    }

    pub fn issuer(&self) -> Option<&Issuer> {
        self.data.as_ref().and_then(|d| d.issuer.as_ref())
    }

    /// Issuer display name, if the credential carries one.
    pub fn issuer_name(&self) -> Option<&str> {
        self.issuer().and_then(|i| i.name.as_deref())
    }

    /// The target hash claimed by the signature block.
    pub fn target_hash(&self) -> Option<&str> {
        self.signature.as_ref().and_then(|s| s.target_hash.as_deref())
    }
}

/// The `data` object of a credential.
///
/// `recipient` and `issuer` are lifted into typed fields; all remaining keys
/// stay in `claims`. `key_order` records every top-level key in the order it
/// appeared, so hashing walks the document the way it was written.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(try_from = "Map<String, Value>")]
pub struct CredentialData {
    pub recipient: Option<Recipient>,
    pub issuer: Option<Issuer>,
    pub claims: Map<String, Value>,
    pub key_order: Vec<String>,
}

impl TryFrom<Map<String, Value>> for CredentialData {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut data = CredentialData::default();
        for (key, value) in map {
            match key.as_str() {
                "recipient" => data.recipient = serde_json::from_value(value)?,
                "issuer" => data.issuer = serde_json::from_value(value)?,
                _ => {
                    data.claims.insert(key.clone(), value);
                }
            }
            data.key_order.push(key);
        }
        Ok(data)
    }
}

/// Credential recipient.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Credential issuer and its identity-proof claim.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Issuer {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "identityProof")]
    pub identity_proof: Option<IdentityProof>,
}

/// Where and how an issuer publishes its verification key.
///
/// For `DNS-DID`, `location` is a domain whose TXT records are expected to
/// contain `key`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityProof {
    #[serde(default, rename = "type")]
    pub proof_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl IdentityProof {
    /// An identity proof object with no fields at all counts as absent.
    pub fn is_present(&self) -> bool {
        self.proof_type.is_some() || self.location.is_some() || self.key.is_some()
    }
}

/// Signature block of a credential.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureBlock {
    #[serde(default, rename = "targetHash")]
    pub target_hash: Option<String>,
}

/// Returns true when a field counts as empty: missing, `""` or `"0"`.
pub fn is_blank(value: Option<&str>) -> bool {
    matches!(value, None | Some("") | Some("0"))
}
