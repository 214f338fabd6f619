// src/services/mod.rs
//! Verification services and the HTTP layer around them.

pub mod api_server;
pub mod auth;
pub mod hasher;
pub mod identity;
pub mod validator;
pub mod verifier;
