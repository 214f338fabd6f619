// src/lib.rs
//! # Blockcerts Credential Verifier
//!
//! Verifies that a Blockcerts-style credential is unmodified since issuance
//! and comes from the issuer it names.
//!
//! ## Architecture Overview
//! 1. **Models**: `Credential`, `VerificationOutcome`, stored `VerificationRecord`s
//! 2. **Services**: structural validation, DNS-DID issuer resolution,
//!    canonical hashing, the verification engine and the HTTP API
//! 3. **DNS Layer**: `TxtResolver` capability with a DNS-over-HTTPS client
//! 4. **Storage Layer**: verification result persistence
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use blockcerts_verifier::config::{DnsFailurePolicy, DnsSettings};
//! use blockcerts_verifier::dns::DohResolver;
//! use blockcerts_verifier::models::credential::Credential;
//! use blockcerts_verifier::services::verifier::Verifier;
//!
//! # async fn run(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = DohResolver::new(&DnsSettings::default())?;
//! let verifier = Verifier::new(Arc::new(resolver), DnsFailurePolicy::Compat);
//! let credential = Credential::from_slice(bytes)?;
//! let report = verifier.verify_credential(&credential).await?;
//! println!("{}: {}", report.issuer_name.unwrap_or_default(), report.outcome);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dns;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
