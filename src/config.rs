// src/config.rs
//! Runtime configuration.
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. `verifier.toml` in the working directory (optional)
//! 3. Environment variables prefixed with `VERIFIER_`, using `__` for nesting
//!    (e.g. `VERIFIER_DNS__TIMEOUT_MS=2000`, `VERIFIER_AUTH__JWT_SECRET=...`)
//!
//! A `.env` file is loaded into the environment by `main` before this runs.

use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use serde::Deserialize;
use std::net::SocketAddr;
use thiserror::Error;

/// Default upload ceiling for a credential file (2 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid server address {0}")]
    InvalidAddress(String),

    #[error("auth.jwt_secret must not be empty")]
    MissingJwtSecret,
}

/// What the engine does when the DNS resolver itself fails.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DnsFailurePolicy {
    /// Treat resolver failures as an unverifiable issuer (`invalid_issuer`)
    #[default]
    Compat,
    /// Surface resolver failures as errors so callers can retry or alert
    Strict,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: u64,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DnsSettings {
    /// DNS-over-HTTPS JSON endpoint
    pub endpoint: String,
    pub timeout_ms: u64,
    /// Total attempts per lookup, including the first
    pub attempts: u32,
    pub retry_backoff_ms: u64,
    pub failure_policy: DnsFailurePolicy,
}

impl Default for DnsSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://dns.google/resolve".to_string(),
            timeout_ms: 5_000,
            attempts: 2,
            retry_backoff_ms: 200,
            failure_policy: DnsFailurePolicy::Compat,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AuthSettings {
    /// HS256 shared secret for bearer tokens
    pub jwt_secret: String,
    /// Expected `iss` claim, if any
    #[serde(default)]
    pub issuer: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Complete service configuration.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub dns: DnsSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Loads settings from defaults, `verifier.toml` and `VERIFIER_*` variables.
    ///
    /// # Errors
    /// Returns `ConfigError` if a source cannot be parsed, a value has the
    /// wrong type, or `auth.jwt_secret` is missing or empty.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::with_name("verifier").required(false))
            .add_source(
                Environment::with_prefix("VERIFIER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::from_builder(builder)
    }

    /// Builder pre-populated with every default value.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let dns = DnsSettings::default();
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64)?
            .set_default("dns.endpoint", dns.endpoint)?
            .set_default("dns.timeout_ms", dns.timeout_ms as i64)?
            .set_default("dns.attempts", i64::from(dns.attempts))?
            .set_default("dns.retry_backoff_ms", dns.retry_backoff_ms as i64)?
            .set_default("dns.failure_policy", "compat")?
            .set_default("log.level", "info")?)
    }

    /// Builds and validates settings from an arbitrary builder.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        if settings.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        let builder = Settings::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Settings::from_builder(builder)
    }

    #[test]
    fn test_defaults_with_secret() {
        let settings = from_toml("[auth]\njwt_secret = \"s3cret\"\n").unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(settings.dns.endpoint, "https://dns.google/resolve");
        assert_eq!(settings.dns.timeout_ms, 5_000);
        assert_eq!(settings.dns.attempts, 2);
        assert_eq!(settings.dns.failure_policy, DnsFailurePolicy::Compat);
        assert_eq!(settings.auth.issuer, None);
        assert_eq!(settings.log.level, "info");
        assert_eq!(
            settings.server.socket_addr().unwrap(),
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_overrides() {
        let settings = from_toml(
            r#"
            [server]
            port = 8080
            [dns]
            failure_policy = "strict"
            timeout_ms = 1500
            [auth]
            jwt_secret = "s3cret"
            issuer = "https://auth.example.edu"
            "#,
        )
        .unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.dns.failure_policy, DnsFailurePolicy::Strict);
        assert_eq!(settings.dns.timeout_ms, 1500);
        assert_eq!(settings.auth.issuer.as_deref(), Some("https://auth.example.edu"));
    }

    #[test]
    fn test_secret_is_required() {
        assert!(from_toml("").is_err());
        assert!(matches!(
            from_toml("[auth]\njwt_secret = \"  \"\n"),
            Err(ConfigError::MissingJwtSecret)
        ));
    }

    #[test]
    fn test_invalid_address() {
        let server = ServerSettings {
            host: "not a host".into(),
            port: 1,
            max_upload_bytes: 1,
        };
        assert!(matches!(server.socket_addr(), Err(ConfigError::InvalidAddress(_))));
    }
}
