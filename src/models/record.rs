// src/models/record.rs
//! Persisted verification results.

use crate::models::outcome::VerificationOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document type recorded for uploaded JSON credentials.
pub const DOCUMENT_TYPE_JSON: &str = "json";

/// A verification result waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVerificationRecord {
    pub principal_id: String,
    pub document_type: String,
    pub outcome: VerificationOutcome,
    pub issuer_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NewVerificationRecord {
    /// Builds a record for an uploaded JSON credential, stamped with the current time.
    pub fn json(
        principal_id: impl Into<String>,
        outcome: VerificationOutcome,
        issuer_name: Option<String>,
    ) -> Self {
        Self {
            principal_id: principal_id.into(),
            document_type: DOCUMENT_TYPE_JSON.to_string(),
            outcome,
            issuer_name,
            timestamp: Utc::now(),
        }
    }
}

/// A stored verification result.
///
/// # Fields
/// - `id`: Store-assigned identifier, unique per store
/// - `principal_id`: The authenticated caller that requested the verification
/// - `document_type`: Kind of uploaded document (currently always `json`)
/// - `outcome`: Result of the verification
/// - `issuer_name`: Issuer named in the credential, if any
/// - `timestamp`: When the verification was recorded (UTC)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    pub id: u64,
    pub principal_id: String,
    pub document_type: String,
    pub outcome: VerificationOutcome,
    pub issuer_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl VerificationRecord {
    pub fn from_new(id: u64, record: NewVerificationRecord) -> Self {
        Self {
            id,
            principal_id: record.principal_id,
            document_type: record.document_type,
            outcome: record.outcome,
            issuer_name: record.issuer_name,
            timestamp: record.timestamp,
        }
    }
}
