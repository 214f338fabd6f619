// src/models/outcome.rs
//! Verification outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The single result of verifying one credential.
///
/// Serialized as `verified`, `invalid_recipient`, `invalid_issuer` or
/// `invalid_signature`; these strings are what callers and stored records see.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified,
    InvalidRecipient,
    InvalidIssuer,
    InvalidSignature,
}

impl VerificationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationOutcome::Verified => "verified",
            VerificationOutcome::InvalidRecipient => "invalid_recipient",
            VerificationOutcome::InvalidIssuer => "invalid_issuer",
            VerificationOutcome::InvalidSignature => "invalid_signature",
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified)
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verified" => Ok(VerificationOutcome::Verified),
            "invalid_recipient" => Ok(VerificationOutcome::InvalidRecipient),
            "invalid_issuer" => Ok(VerificationOutcome::InvalidIssuer),
            "invalid_signature" => Ok(VerificationOutcome::InvalidSignature),
            other => Err(format!("unknown verification outcome: {}", other)),
        }
    }
}

/// What the engine hands back to its caller.
///
/// `issuer_name` is reported even for rejected credentials so the caller can
/// show who the credential claimed to come from. `target_hash` is only set
/// once the hashing stage has run.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub outcome: VerificationOutcome,
    pub issuer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&VerificationOutcome::InvalidSignature).unwrap();
        assert_eq!(json, "\"invalid_signature\"");

        for outcome in [
            VerificationOutcome::Verified,
            VerificationOutcome::InvalidRecipient,
            VerificationOutcome::InvalidIssuer,
            VerificationOutcome::InvalidSignature,
        ] {
            let serialized = serde_json::to_value(outcome).unwrap();
            assert_eq!(serialized.as_str(), Some(outcome.as_str()));
            assert_eq!(outcome.as_str().parse::<VerificationOutcome>(), Ok(outcome));
        }
    }

    #[test]
    fn test_unknown_outcome() {
        assert!("valid".parse::<VerificationOutcome>().is_err());
        assert!(!VerificationOutcome::InvalidIssuer.is_verified());
        assert!(VerificationOutcome::Verified.is_verified());
    }
}
