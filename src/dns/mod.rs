// src/dns/mod.rs
//! DNS TXT resolution used for issuer identity proofs.

pub mod doh_client;
pub mod resolver;

pub use doh_client::DohResolver;
pub use resolver::{ResolverError, TxtResolver};
