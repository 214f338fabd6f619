// src/services/auth.rs
//! Bearer-token authentication of callers.
//!
//! Every verification is recorded against the principal that requested it.
//! Callers present an HS256 JWT in `Authorization: Bearer <token>`; the
//! token's `sub` claim is the principal id.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingCredentials,

    #[error("Authorization header is not a bearer token")]
    InvalidScheme,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token has an empty subject")]
    EmptySubject,
}

/// JWT claims accepted from callers.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
}

/// Validates bearer tokens and extracts the calling principal.
#[derive(Clone)]
pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    /// Creates an authenticator for HS256 tokens.
    ///
    /// # Arguments
    /// * `secret` - Shared signing secret
    /// * `issuer` - If set, tokens must carry this `iss`
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Authenticates a request from its headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthError::InvalidScheme)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidScheme)?
            .trim();
        self.authenticate_token(token)
    }

    /// Validates a raw token.
    pub fn authenticate_token(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::EmptySubject);
        }
        Ok(Principal {
            id: data.claims.sub,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Claims;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub const SECRET: &str = "test-secret";

    /// Signs a token for `sub` that expires an hour from now.
    pub fn token_for(sub: &str, iss: Option<&str>, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
            iss: iss.map(str::to_string),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }
}
