// src/services/identity.rs
//! Issuer identity resolution against DNS TXT records.

use crate::dns::resolver::{ResolverError, TxtResolver};
use crate::models::credential::IdentityProof;
use log::debug;
use std::sync::Arc;

/// Whether an issuer's claimed key is published at its claimed location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStatus {
    Found,
    NotFound,
}

/// Checks a DNS-DID identity proof against live TXT records.
///
/// A proof is accepted when any TXT record at `location` contains `key`
/// anywhere in its text. The substring match is intentionally loose: issued
/// credentials rely on it, e.g. key `abc123` matches record `did=abc123;`.
#[derive(Clone)]
pub struct IssuerIdentityResolver {
    resolver: Arc<dyn TxtResolver>,
}

impl IssuerIdentityResolver {
    pub fn new(resolver: Arc<dyn TxtResolver>) -> Self {
        Self { resolver }
    }

    /// Resolves an identity proof.
    ///
    /// A missing key matches as the empty string, so it is found in any
    /// non-empty record set.
    ///
    /// # Arguments
    /// * `proof` - Identity proof whose `location` and `key` are checked
    ///
    /// # Returns
    /// - `Ok(Found)` if a TXT record contains the key
    /// - `Ok(NotFound)` if no record does, the record set is empty, or the
    ///   proof names no location (no lookup is made then)
    /// - `Err(ResolverError)` if the lookup itself failed
    pub async fn resolve(&self, proof: &IdentityProof) -> Result<IdentityStatus, ResolverError> {
        let location = match proof.location.as_deref() {
            Some(location) if !location.is_empty() => location,
            _ => return Ok(IdentityStatus::NotFound),
        };
        let key = proof.key.as_deref().unwrap_or_default();

        let records = self.resolver.lookup_txt(location).await?;
        let found = records.iter().any(|record| record.contains(key));
        debug!(
            "identity proof at {}: {} TXT record(s), key {}",
            location,
            records.len(),
            if found { "found" } else { "not found" }
        );
        Ok(if found {
            IdentityStatus::Found
        } else {
            IdentityStatus::NotFound
        })
    }
}
