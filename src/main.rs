// src/main.rs

//! # Blockcerts Credential Verifier - Main Entry Point
//!
//! Loads configuration, wires the verification engine to its collaborators
//! and starts the API server.
//!
//! ## Configuration
//! See [`blockcerts_verifier::config`]. The only required value is the JWT
//! secret:
//! - `VERIFIER_AUTH__JWT_SECRET`: HS256 secret used to validate caller tokens
//! - `VERIFIER_SERVER__PORT`: (Optional) listen port (default: 3000)
//! - `VERIFIER_DNS__ENDPOINT`: (Optional) DoH endpoint (default: https://dns.google/resolve)
//! - `VERIFIER_DNS__FAILURE_POLICY`: (Optional) `compat` or `strict`

use anyhow::Context;
use blockcerts_verifier::config::Settings;
use blockcerts_verifier::dns::DohResolver;
use blockcerts_verifier::services::api_server::ApiServer;
use blockcerts_verifier::services::auth::JwtAuthenticator;
use blockcerts_verifier::services::verifier::Verifier;
use blockcerts_verifier::storage::InMemoryResultStore;
use dotenv::dotenv;
use log::info;
use std::sync::Arc;

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment and configuration
/// 2. Initialize logging
/// 3. Build resolver, engine, result store and authenticator
/// 4. Start API server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let settings = Settings::load().context("failed to load verifier configuration")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log.level.as_str()),
    )
    .init();

    let resolver = DohResolver::new(&settings.dns).context("failed to build DNS resolver")?;
    let endpoint = resolver.endpoint().to_string();
    let verifier = Verifier::new(Arc::new(resolver), settings.dns.failure_policy);
    info!(
        "resolving DNS-DID proofs via {} (timeout {} ms, {} attempt(s), {:?} failure policy)",
        endpoint,
        settings.dns.timeout_ms,
        settings.dns.attempts,
        verifier.failure_policy()
    );

    let authenticator =
        JwtAuthenticator::new(&settings.auth.jwt_secret, settings.auth.issuer.as_deref());
    let api_server = ApiServer::new(
        verifier,
        Arc::new(InMemoryResultStore::new()),
        authenticator,
        settings.server.max_upload_bytes as usize,
    );

    let addr = settings.server.socket_addr()?;
    api_server
        .run(addr)
        .await
        .with_context(|| format!("API server on {} failed", addr))
}
