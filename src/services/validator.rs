// src/services/validator.rs
//! Structural checks run before any network or hashing work.

use crate::models::credential::{is_blank, Credential, IdentityProof, DNS_DID};
use crate::models::outcome::VerificationOutcome;

/// Checks presence and non-emptiness of the fields verification relies on.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        StructuralValidator
    }

    /// Runs both checks in order.
    ///
    /// # Returns
    /// - `Ok(&IdentityProof)` - the DNS-DID proof to resolve next
    /// - `Err(InvalidRecipient)` / `Err(InvalidIssuer)` - first failing check
    pub fn validate<'a>(
        &self,
        credential: &'a Credential,
    ) -> Result<&'a IdentityProof, VerificationOutcome> {
        self.check_recipient(credential)?;
        self.check_issuer_structure(credential)
    }

    /// Recipient must carry a non-empty name and email.
    pub fn check_recipient(&self, credential: &Credential) -> Result<(), VerificationOutcome> {
        let recipient = credential
            .recipient()
            .ok_or(VerificationOutcome::InvalidRecipient)?;
        if is_blank(recipient.name.as_deref()) || is_blank(recipient.email.as_deref()) {
            return Err(VerificationOutcome::InvalidRecipient);
        }
        Ok(())
    }

    /// Issuer must have a name and a `DNS-DID` identity proof.
    pub fn check_issuer_structure<'a>(
        &self,
        credential: &'a Credential,
    ) -> Result<&'a IdentityProof, VerificationOutcome> {
        let issuer = credential.issuer().ok_or(VerificationOutcome::InvalidIssuer)?;
        if is_blank(issuer.name.as_deref()) {
            return Err(VerificationOutcome::InvalidIssuer);
        }
        let proof = issuer
            .identity_proof
            .as_ref()
            .filter(|p| p.is_present())
            .ok_or(VerificationOutcome::InvalidIssuer)?;
        let proof_type = proof.proof_type.as_deref();
        if is_blank(proof_type) || proof_type != Some(DNS_DID) {
            return Err(VerificationOutcome::InvalidIssuer);
        }
        Ok(proof)
    }
}
