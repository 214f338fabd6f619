// src/services/verifier.rs
//! Credential verification engine.
//!
//! Runs the checks as an explicit state machine, stopping at the first
//! failure:
//!
//! ```text
//! Start ─▶ RecipientChecked ─▶ IssuerStructureChecked ─▶ IssuerIdentityChecked ─▶ SignatureChecked ─▶ Verified
//!   │             │                     │                         │
//!   └▶ invalid_recipient          invalid_issuer           invalid_issuer           invalid_signature
//! ```
//!
//! The engine keeps no state between calls; one instance can serve any number
//! of concurrent verifications.

use crate::config::DnsFailurePolicy;
use crate::dns::resolver::{ResolverError, TxtResolver};
use crate::models::credential::{Credential, IdentityProof};
use crate::models::outcome::{VerificationOutcome, VerificationReport};
use crate::services::hasher::CanonicalHasher;
use crate::services::identity::{IdentityStatus, IssuerIdentityResolver};
use crate::services::validator::StructuralValidator;
use log::{debug, info, warn};
use std::sync::Arc;
use thiserror::Error;

/// Infrastructure failures that prevent a verification from concluding.
///
/// Verification failures (`invalid_*`) are never reported through this type.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("issuer identity could not be resolved: {0}")]
    Resolver(#[from] ResolverError),
}

/// Progress through one verification.
#[derive(Debug, Clone, PartialEq, Eq)]
enum VerificationState<'a> {
    Start,
    RecipientChecked,
    IssuerStructureChecked(&'a IdentityProof),
    IssuerIdentityChecked,
    SignatureChecked { target_hash: String },
    Finished {
        outcome: VerificationOutcome,
        target_hash: Option<String>,
    },
}

impl VerificationState<'_> {
    fn rejected(outcome: VerificationOutcome) -> Self {
        VerificationState::Finished {
            outcome,
            target_hash: None,
        }
    }
}

/// Verifies credentials: structure, then issuer identity, then signature.
#[derive(Clone)]
pub struct Verifier {
    validator: StructuralValidator,
    identity: IssuerIdentityResolver,
    hasher: CanonicalHasher,
    failure_policy: DnsFailurePolicy,
}

impl Verifier {
    /// Constructs a new Verifier.
    ///
    /// # Arguments
    /// * `resolver` - TXT lookup capability used for DNS-DID proofs
    /// * `failure_policy` - How resolver failures are reported
    pub fn new(resolver: Arc<dyn TxtResolver>, failure_policy: DnsFailurePolicy) -> Self {
        Self {
            validator: StructuralValidator::new(),
            identity: IssuerIdentityResolver::new(resolver),
            hasher: CanonicalHasher::new(),
            failure_policy,
        }
    }

    pub fn failure_policy(&self) -> DnsFailurePolicy {
        self.failure_policy
    }

    /// Verifies a parsed credential.
    ///
    /// # Arguments
    /// * `credential` - The credential to verify
    ///
    /// # Returns
    /// - `Ok(report)` with exactly one outcome and the claimed issuer name
    /// - `Err(VerificationError::Resolver)` only under
    ///   [`DnsFailurePolicy::Strict`] when the DNS lookup itself failed
    ///
    /// # Process Flow
    /// 1. Recipient name and email present
    /// 2. Issuer name present, identity proof of type `DNS-DID`
    /// 3. Identity-proof key published in the location's TXT records
    /// 4. Recomputed target hash equals `signature.targetHash`
    pub async fn verify_credential(
        &self,
        credential: &Credential,
    ) -> Result<VerificationReport, VerificationError> {
        let mut state = VerificationState::Start;
        loop {
            state = match self.step(state, credential).await? {
                VerificationState::Finished {
                    outcome,
                    target_hash,
                } => {
                    let issuer_name = credential.issuer_name().map(str::to_string);
                    if outcome.is_verified() {
                        info!("credential from {:?} verified", issuer_name);
                    } else {
                        info!("credential from {:?} rejected: {}", issuer_name, outcome);
                    }
                    return Ok(VerificationReport {
                        outcome,
                        issuer_name,
                        target_hash,
                    });
                }
                next => next,
            };
        }
    }

    async fn step<'a>(
        &self,
        state: VerificationState<'a>,
        credential: &'a Credential,
    ) -> Result<VerificationState<'a>, VerificationError> {
        debug!("verification state: {:?}", state);
        let next = match state {
            VerificationState::Start => match self.validator.check_recipient(credential) {
                Ok(()) => VerificationState::RecipientChecked,
                Err(outcome) => VerificationState::rejected(outcome),
            },
            VerificationState::RecipientChecked => {
                match self.validator.check_issuer_structure(credential) {
                    Ok(proof) => VerificationState::IssuerStructureChecked(proof),
                    Err(outcome) => VerificationState::rejected(outcome),
                }
            }
            VerificationState::IssuerStructureChecked(proof) => {
                match self.identity.resolve(proof).await {
                    Ok(IdentityStatus::Found) => VerificationState::IssuerIdentityChecked,
                    Ok(IdentityStatus::NotFound) => {
                        VerificationState::rejected(VerificationOutcome::InvalidIssuer)
                    }
                    Err(e) => match self.failure_policy {
                        DnsFailurePolicy::Compat => {
                            warn!("treating DNS failure as invalid issuer: {}", e);
                            VerificationState::rejected(VerificationOutcome::InvalidIssuer)
                        }
                        DnsFailurePolicy::Strict => return Err(e.into()),
                    },
                }
            }
            VerificationState::IssuerIdentityChecked => {
                let Some(data) = credential.data.as_ref() else {
                    return Ok(VerificationState::rejected(
                        VerificationOutcome::InvalidSignature,
                    ));
                };
                let target_hash = self.hasher.compute_target_hash(data);
                if credential.target_hash() == Some(target_hash.as_str()) {
                    VerificationState::SignatureChecked { target_hash }
                } else {
                    VerificationState::Finished {
                        outcome: VerificationOutcome::InvalidSignature,
                        target_hash: Some(target_hash),
                    }
                }
            }
            VerificationState::SignatureChecked { target_hash } => VerificationState::Finished {
                outcome: VerificationOutcome::Verified,
                target_hash: Some(target_hash),
            },
            finished @ VerificationState::Finished { .. } => finished,
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::identity::test_support::FakeResolver;
    use serde_json::{json, Value};

    fn alice_data() -> Value {
        json!({
            "recipient": { "name": "Alice", "email": "alice@example.com" },
            "issuer": {
                "name": "Example University",
                "identityProof": { "type": "DNS-DID", "location": "example.edu", "key": "abc123" }
            }
        })
    }

    /// Builds a credential whose target hash is computed over `data`.
    fn signed(data: Value) -> Value {
        let parsed = Credential::from_value(json!({ "data": data.clone() })).unwrap();
        let hash = CanonicalHasher::new().compute_target_hash(parsed.data.as_ref().unwrap());
        json!({ "data": data, "signature": { "targetHash": hash } })
    }

    fn parse(value: Value) -> Credential {
        Credential::from_value(value).unwrap()
    }

    fn verifier(fake: &Arc<FakeResolver>, policy: DnsFailurePolicy) -> Verifier {
        Verifier::new(fake.clone(), policy)
    }

    fn example_dns() -> Arc<FakeResolver> {
        Arc::new(FakeResolver::with_records("example.edu", &["did=abc123;"]))
    }

    #[tokio::test]
    async fn test_alice_is_verified() {
        let fake = example_dns();
        let report = verifier(&fake, DnsFailurePolicy::Compat)
            .verify_credential(&parse(signed(alice_data())))
            .await
            .unwrap();
        assert_eq!(report.outcome, VerificationOutcome::Verified);
        assert_eq!(report.issuer_name.as_deref(), Some("Example University"));
        assert!(report.target_hash.is_some());
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_tampered_email_is_invalid_signature() {
        let mut document = signed(alice_data());
        document["data"]["recipient"]["email"] = json!("mallory@example.com");

        let report = verifier(&example_dns(), DnsFailurePolicy::Compat)
            .verify_credential(&parse(document))
            .await
            .unwrap();
        assert_eq!(report.outcome, VerificationOutcome::InvalidSignature);
    }

    #[tokio::test]
    async fn test_tampered_claim_is_invalid_signature() {
        let mut data = alice_data();
        data["degree"] = json!("BSc");
        let mut document = signed(data);
        document["data"]["degree"] = json!("PhD");

        let report = verifier(&example_dns(), DnsFailurePolicy::Compat)
            .verify_credential(&parse(document))
            .await
            .unwrap();
        assert_eq!(report.outcome, VerificationOutcome::InvalidSignature);
    }

    #[tokio::test]
    async fn test_missing_target_hash_is_invalid_signature() {
        let report = verifier(&example_dns(), DnsFailurePolicy::Compat)
            .verify_credential(&parse(json!({ "data": alice_data() })))
            .await
            .unwrap();
        assert_eq!(report.outcome, VerificationOutcome::InvalidSignature);
    }

    #[tokio::test]
    async fn test_empty_recipient_short_circuits_before_dns() {
        let mut data = alice_data();
        data["recipient"]["name"] = json!("");
        let fake = example_dns();

        let report = verifier(&fake, DnsFailurePolicy::Compat)
            .verify_credential(&parse(signed(data)))
            .await
            .unwrap();
        assert_eq!(report.outcome, VerificationOutcome::InvalidRecipient);
        assert_eq!(report.target_hash, None);
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_dns_did_proof_skips_lookup() {
        let mut data = alice_data();
        data["issuer"]["identityProof"]["type"] = json!("RSA");
        let fake = example_dns();

        let report = verifier(&fake, DnsFailurePolicy::Compat)
            .verify_credential(&parse(signed(data)))
            .await
            .unwrap();
        assert_eq!(report.outcome, VerificationOutcome::InvalidIssuer);
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_unpublished_key_is_invalid_issuer() {
        let fake = Arc::new(FakeResolver::with_records("example.edu", &["did=zzz999;"]));
        let report = verifier(&fake, DnsFailurePolicy::Compat)
            .verify_credential(&parse(signed(alice_data())))
            .await
            .unwrap();
        assert_eq!(report.outcome, VerificationOutcome::InvalidIssuer);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_dns_failure_follows_policy() {
        let fake = Arc::new(FakeResolver::failing());
        let credential = parse(signed(alice_data()));

        let compat = verifier(&fake, DnsFailurePolicy::Compat);
        assert_eq!(compat.failure_policy(), DnsFailurePolicy::Compat);
        let report = compat.verify_credential(&credential).await.unwrap();
        assert_eq!(report.outcome, VerificationOutcome::InvalidIssuer);

        let strict = verifier(&fake, DnsFailurePolicy::Strict);
        assert_eq!(strict.failure_policy(), DnsFailurePolicy::Strict);
        let result = strict.verify_credential(&credential).await;
        assert!(matches!(result, Err(VerificationError::Resolver(_))));
    }

    #[tokio::test]
    async fn test_verification_is_deterministic() {
        let fake = example_dns();
        let engine = verifier(&fake, DnsFailurePolicy::Compat);
        let credential = parse(signed(alice_data()));
        let first = engine.verify_credential(&credential).await.unwrap();
        let second = engine.verify_credential(&credential).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_blocking_use_from_sync_code() {
        let fake = example_dns();
        let engine = verifier(&fake, DnsFailurePolicy::Compat);
        let credential = parse(signed(alice_data()));
        let report = tokio_test::block_on(engine.verify_credential(&credential));
        tokio_test::assert_ok!(&report);
        assert_eq!(report.unwrap().outcome, VerificationOutcome::Verified);
    }
}
