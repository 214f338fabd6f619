// src/dns/doh_client.rs
//! DNS-over-HTTPS client for TXT lookups.
//!
//! Talks to a JSON DoH endpoint (Google's `https://dns.google/resolve` by
//! default):
//!
//! ```text
//! GET {endpoint}?name=example.edu&type=TXT
//! { "Status": 0, "Answer": [ { "name": "example.edu.", "type": 16, "data": "did=abc123;" } ] }
//! ```
//!
//! # Features
//! - Per-request timeout
//! - Bounded retries with fixed backoff on transient failures
//! - TXT data made only of quoted strings (`"part one" "part two"`)
//!   unquoted and joined; anything else passed through as served

use crate::config::DnsSettings;
use crate::dns::resolver::{ResolverError, TxtResolver};
use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use std::time::Duration;

/// DNS RR type code for TXT records.
const TXT_RECORD_TYPE: u16 = 16;

/// DNS response code for a name that does not exist.
const RCODE_NXDOMAIN: u32 = 3;

#[derive(Deserialize, Debug)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,

    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Deserialize, Debug)]
struct DohAnswer {
    #[serde(rename = "type", default)]
    record_type: Option<u16>,
    data: String,
}

/// TXT resolver backed by a DNS-over-HTTPS JSON endpoint.
#[derive(Clone, Debug)]
pub struct DohResolver {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    attempts: u32,
    retry_backoff: Duration,
}

impl DohResolver {
    /// Creates a resolver from DNS settings.
    ///
    /// # Arguments
    /// * `settings` - Endpoint, timeout and retry policy
    ///
    /// # Errors
    /// Returns `ResolverError::Transport` if the HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(settings: &DnsSettings) -> Result<Self, ResolverError> {
        let timeout = Duration::from_millis(settings.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolverError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            timeout,
            attempts: settings.attempts.max(1),
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn query_once(&self, domain: &str) -> Result<Vec<String>, ResolverError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", domain), ("type", "TXT")])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await
            .map_err(|e| self.map_transport_error(domain, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::HttpStatus(status.as_u16()));
        }

        let body: DohResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_transport_error(domain, e)
            } else {
                ResolverError::MalformedResponse(e.to_string())
            }
        })?;

        match body.status {
            0 => Ok(body
                .answer
                .into_iter()
                .filter(|a| a.record_type.map_or(true, |t| t == TXT_RECORD_TYPE))
                .map(|a| unquote_txt(&a.data))
                .collect()),
            RCODE_NXDOMAIN => Err(ResolverError::NxDomain(domain.to_string())),
            status => Err(ResolverError::DnsStatus {
                domain: domain.to_string(),
                status,
            }),
        }
    }

    fn map_transport_error(&self, domain: &str, e: reqwest::Error) -> ResolverError {
        if e.is_timeout() {
            ResolverError::Timeout {
                domain: domain.to_string(),
                timeout: self.timeout,
            }
        } else {
            ResolverError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl TxtResolver for DohResolver {
    async fn lookup_txt(&self, domain: &str) -> Result<Vec<String>, ResolverError> {
        let mut attempt = 1;
        loop {
            match self.query_once(domain).await {
                Ok(records) => {
                    debug!("TXT lookup for {} returned {} record(s)", domain, records.len());
                    return Ok(records);
                }
                Err(e) if e.is_transient() && attempt < self.attempts => {
                    warn!(
                        "TXT lookup for {} failed (attempt {}/{}): {}; retrying",
                        domain, attempt, self.attempts, e
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Strips presentation-format quoting from TXT record data.
///
/// `"v=1" "key=abc"` becomes `v=1key=abc`, matching how the record's
/// character-strings are concatenated on the wire. Data that is not entirely
/// a sequence of quoted strings (such as `"a" b` or `say "hi"`) is returned
/// unchanged.
pub fn unquote_txt(data: &str) -> String {
    parse_quoted_segments(data.trim()).unwrap_or_else(|| data.to_string())
}

fn parse_quoted_segments(data: &str) -> Option<String> {
    if !data.starts_with('"') {
        return None;
    }

    let mut out = String::with_capacity(data.len());
    let mut in_quotes = false;
    let mut chars = data.chars();
    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', _) => in_quotes = !in_quotes,
            ('\\', true) => out.push(chars.next()?),
            (c, true) => out.push(c),
            (c, false) if c.is_whitespace() => {}
            (_, false) => return None,
        }
    }
    if in_quotes {
        return None;
    }
    Some(out)
}
