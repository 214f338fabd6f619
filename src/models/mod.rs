// src/models/mod.rs
//! Data structures shared across the verifier.

pub mod credential;
pub mod outcome;
pub mod record;
