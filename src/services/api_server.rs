// src/services/api_server.rs
//! API Server for the credential verifier
//!
//! This module provides the REST API in front of the verification engine.
//! It owns everything the engine deliberately does not: file upload handling,
//! caller authentication and persistence of results.
//!
//! The API is built using Axum and includes endpoints for:
//! - Credential verification from an uploaded JSON file
//! - Listing the caller's past verification results
//! - Liveness checks

use crate::models::credential::Credential;
use crate::models::outcome::VerificationOutcome;
use crate::models::record::{NewVerificationRecord, VerificationRecord};
use crate::services::auth::JwtAuthenticator;
use crate::services::verifier::Verifier;
use crate::storage::result_store::VerificationResultStore;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Json, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

/// Multipart field carrying the credential file.
pub const UPLOAD_FIELD: &str = "json_file";

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const INVALID_FILE_MESSAGE: &str = "Invalid JSON file.";
const INVALID_USER_MESSAGE: &str = "Invalid User.";

// API request and response structures

/// Verification result as returned to the caller
#[derive(Serialize, Deserialize, Debug)]
pub struct VerifyResponseData {
    pub issuer: Option<String>,
    pub result: VerificationOutcome,
}

/// Response for a completed verification
#[derive(Serialize, Deserialize, Debug)]
pub struct VerifyResponse {
    pub data: VerifyResponseData,
}

/// Response listing the caller's verification records
#[derive(Serialize, Deserialize, Debug)]
pub struct ListVerificationsResponse {
    pub data: Vec<VerificationRecord>,
}

/// Error body for every non-2xx response
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
}

/// Reasons an upload is refused before verification.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("request is not multipart/form-data: {0}")]
    NotMultipart(String),

    #[error("failed to read upload: {0}")]
    Read(String),

    #[error("no `json_file` field in upload")]
    Missing,

    #[error("`json_file` is not a file")]
    NotAFile,

    #[error("uploaded file is empty")]
    Empty,

    #[error("uploaded file is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// API server state containing all service dependencies
#[derive(Clone)]
pub struct ApiServer {
    /// Verification engine
    verifier: Arc<Verifier>,

    /// Where finished verifications are recorded
    result_store: Arc<dyn VerificationResultStore>,

    /// Bearer-token validation for callers
    authenticator: Arc<JwtAuthenticator>,

    /// Largest accepted credential file, in bytes
    max_upload_bytes: usize,
}

impl ApiServer {
    /// Creates a new instance of the API server
    ///
    /// # Arguments
    /// * `verifier` - Verification engine
    /// * `result_store` - Persistence for verification results
    /// * `authenticator` - Caller authentication
    /// * `max_upload_bytes` - Upload size limit for credential files
    pub fn new(
        verifier: Verifier,
        result_store: Arc<dyn VerificationResultStore>,
        authenticator: JwtAuthenticator,
        max_upload_bytes: usize,
    ) -> Self {
        ApiServer {
            verifier: Arc::new(verifier),
            result_store,
            authenticator: Arc::new(authenticator),
            max_upload_bytes,
        }
    }

    /// Builds the router with all API routes
    pub fn router(&self) -> Router {
        Router::new()
            .route("/verify", post(Self::verify_handler))
            .route("/verifications", get(Self::list_verifications_handler))
            .route("/health", get(Self::health_handler))
            .layer(DefaultBodyLimit::max(
                self.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
            ))
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and serves requests until the process exits
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    ///
    /// # Errors
    /// Returns the I/O error if the address cannot be bound or serving fails
    pub async fn run(&self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("API server running at http://{}", listener.local_addr()?);
        info!("Available endpoints:");
        info!("- POST /verify");
        info!("- GET  /verifications");
        info!("- GET  /health");
        axum::serve(listener, self.router()).await
    }

    /// Pulls the credential file out of a multipart upload.
    async fn read_upload(
        &self,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Bytes, UploadError> {
        let mut multipart = multipart.map_err(|e| UploadError::NotMultipart(e.to_string()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| UploadError::Read(e.to_string()))?
        {
            if field.name() != Some(UPLOAD_FIELD) {
                continue;
            }
            if field.file_name().is_none() {
                return Err(UploadError::NotAFile);
            }

            let bytes = field
                .bytes()
                .await
                .map_err(|e| UploadError::Read(e.to_string()))?;
            if bytes.is_empty() {
                return Err(UploadError::Empty);
            }
            if bytes.len() > self.max_upload_bytes {
                return Err(UploadError::TooLarge {
                    size: bytes.len(),
                    limit: self.max_upload_bytes,
                });
            }
            return Ok(bytes);
        }

        Err(UploadError::Missing)
    }

    // =====================
    // Verification Handlers
    // =====================

    /// Verifies an uploaded credential
    ///
    /// # Endpoint
    /// POST /verify
    ///
    /// # Request Body
    /// `multipart/form-data` with the credential in file field `json_file`
    ///
    /// # Responses
    /// - 200 OK: `{"data": {"issuer": ..., "result": ...}}`, result recorded
    /// - 401 Unauthorized: Missing or invalid bearer token
    /// - 422 Unprocessable Entity: Missing, oversized or malformed file
    /// - 502 Bad Gateway: DNS resolver failed (strict DNS failure policy only)
    /// - 500 Internal Server Error: Result could not be recorded
    async fn verify_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Response {
        // Upload is checked before the caller
        let bytes = match state.read_upload(multipart).await {
            Ok(bytes) => bytes,
            Err(e) => {
                info!("rejected upload: {}", e);
                return error_response(StatusCode::UNPROCESSABLE_ENTITY, INVALID_FILE_MESSAGE);
            }
        };

        let principal = match state.authenticator.authenticate(&headers) {
            Ok(principal) => principal,
            Err(e) => {
                info!("rejected caller: {}", e);
                return error_response(StatusCode::UNAUTHORIZED, INVALID_USER_MESSAGE);
            }
        };

        let credential = match Credential::from_slice(&bytes) {
            Ok(credential) => credential,
            Err(e) => {
                info!("rejected credential from {}: {}", principal.id, e);
                return error_response(StatusCode::UNPROCESSABLE_ENTITY, INVALID_FILE_MESSAGE);
            }
        };

        let report = match state.verifier.verify_credential(&credential).await {
            Ok(report) => report,
            Err(e) => {
                warn!("verification for {} could not complete: {}", principal.id, e);
                return error_response(StatusCode::BAD_GATEWAY, e.to_string());
            }
        };

        let record = NewVerificationRecord::json(
            principal.id.clone(),
            report.outcome,
            report.issuer_name.clone(),
        );
        if let Err(e) = state.result_store.store(record) {
            error!("failed to record verification for {}: {}", principal.id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }

        (
            StatusCode::OK,
            Json(VerifyResponse {
                data: VerifyResponseData {
                    issuer: report.issuer_name,
                    result: report.outcome,
                },
            }),
        )
            .into_response()
    }

    /// Lists the caller's verification results, newest first
    ///
    /// # Endpoint
    /// GET /verifications
    ///
    /// # Responses
    /// - 200 OK: `{"data": [record, ...]}`
    /// - 401 Unauthorized: Missing or invalid bearer token
    async fn list_verifications_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
    ) -> Response {
        let principal = match state.authenticator.authenticate(&headers) {
            Ok(principal) => principal,
            Err(e) => {
                info!("rejected caller: {}", e);
                return error_response(StatusCode::UNAUTHORIZED, INVALID_USER_MESSAGE);
            }
        };

        match state.result_store.list_for_principal(&principal.id) {
            Ok(records) => (
                StatusCode::OK,
                Json(ListVerificationsResponse { data: records }),
            )
                .into_response(),
            Err(e) => {
                error!("failed to list verifications for {}: {}", principal.id, e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }

    async fn health_handler() -> impl IntoResponse {
        Json(HealthResponse {
            status: "ok".into(),
        })
    }
}
