// src/storage/mod.rs
//! Persistence of verification results.

pub mod result_store;

pub use result_store::{InMemoryResultStore, StoreError, VerificationResultStore};
