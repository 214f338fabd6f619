// src/services/hasher.rs
//! Canonical commitment hashing over credential data.
//!
//! Each top-level field of `data` is turned into one or more single-entry
//! objects, canonically serialized and hashed with SHA-256:
//!
//! | key         | hashed entries                                                         |
//! |-------------|------------------------------------------------------------------------|
//! | `recipient` | `recipient.name`, `recipient.email`                                    |
//! | `issuer`    | `issuer.name`, plus `issuer.identityProof.{type,key,location}` if set  |
//! | anything    | `{key: value}`                                                         |
//!
//! The hex digests are sorted, concatenated and hashed once more to produce
//! the target hash. Sorting makes the result independent of key order.

use crate::models::credential::{CredentialData, Issuer, Recipient};
use crate::utils::crypto::sha256_hex;
use crate::utils::serialization::single_entry;
use serde_json::Value;

/// Computes target hashes for credential data.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalHasher;

impl CanonicalHasher {
    pub fn new() -> Self {
        CanonicalHasher
    }

    /// Computes the target hash of a credential's `data` object.
    ///
    /// # Arguments
    /// * `data` - Parsed credential data
    ///
    /// # Returns
    /// 64-character lowercase hex SHA-256 of the sorted, concatenated field hashes
    pub fn compute_target_hash(&self, data: &CredentialData) -> String {
        sha256_hex(self.field_hashes(data).concat().as_bytes())
    }

    /// Returns the per-field hashes in sorted order.
    ///
    /// Fields are visited in their original order, but the output is sorted
    /// byte-wise ascending, which is the order they are folded in.
    pub fn field_hashes(&self, data: &CredentialData) -> Vec<String> {
        let mut hashes = Vec::with_capacity(data.key_order.len() + 4);
        for key in &data.key_order {
            match key.as_str() {
                "recipient" => push_recipient(&mut hashes, data.recipient.as_ref()),
                "issuer" => push_issuer(&mut hashes, data.issuer.as_ref()),
                _ => {
                    if let Some(value) = data.claims.get(key) {
                        hashes.push(hash_entry(key, value));
                    }
                }
            }
        }
        hashes.sort();
        hashes
    }
}

fn hash_entry(key: &str, value: &Value) -> String {
    sha256_hex(single_entry(key, value).as_bytes())
}

fn text(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.clone()))
}

fn push_recipient(hashes: &mut Vec<String>, recipient: Option<&Recipient>) {
    let recipient = recipient.cloned().unwrap_or_default();
    hashes.push(hash_entry("recipient.name", &text(recipient.name.as_ref())));
    hashes.push(hash_entry("recipient.email", &text(recipient.email.as_ref())));
}

fn push_issuer(hashes: &mut Vec<String>, issuer: Option<&Issuer>) {
    let Some(issuer) = issuer else {
        hashes.push(hash_entry("issuer.name", &Value::Null));
        return;
    };
    hashes.push(hash_entry("issuer.name", &text(issuer.name.as_ref())));
    if let Some(proof) = issuer.identity_proof.as_ref().filter(|p| p.is_present()) {
        hashes.push(hash_entry("issuer.identityProof.type", &text(proof.proof_type.as_ref())));
        hashes.push(hash_entry("issuer.identityProof.key", &text(proof.key.as_ref())));
        hashes.push(hash_entry("issuer.identityProof.location", &text(proof.location.as_ref())));
    }
}
