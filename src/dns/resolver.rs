// src/dns/resolver.rs
//! DNS TXT lookup capability.
//!
//! The verifier never talks to DNS directly; it goes through [`TxtResolver`],
//! so tests can swap in canned records and deployments can pick a backend.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures while resolving TXT records.
///
/// These describe the resolver, not the issuer: a timeout says nothing about
/// whether the key is published.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("DNS lookup for {domain} timed out after {timeout:?}")]
    Timeout { domain: String, timeout: Duration },

    #[error("DNS transport error: {0}")]
    Transport(String),

    #[error("DNS resolver returned HTTP {0}")]
    HttpStatus(u16),

    #[error("malformed DNS resolver response: {0}")]
    MalformedResponse(String),

    #[error("domain {0} does not exist")]
    NxDomain(String),

    #[error("DNS resolver returned status {status} for {domain}")]
    DnsStatus { domain: String, status: u32 },
}

impl ResolverError {
    /// Whether retrying the same lookup might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ResolverError::Timeout { .. } | ResolverError::Transport(_) => true,
            ResolverError::HttpStatus(status) => *status >= 500,
            // SERVFAIL
            ResolverError::DnsStatus { status, .. } => *status == 2,
            ResolverError::MalformedResponse(_) | ResolverError::NxDomain(_) => false,
        }
    }
}

/// Source of DNS TXT records.
#[async_trait]
pub trait TxtResolver: Send + Sync {
    /// Returns the text of every TXT record published at `domain`.
    ///
    /// An existing domain with no TXT records yields an empty list.
    async fn lookup_txt(&self, domain: &str) -> Result<Vec<String>, ResolverError>;
}
