// tests/verification_flow.rs
//! End-to-end verification through the DNS-over-HTTPS client.

use blockcerts_verifier::config::{DnsFailurePolicy, DnsSettings};
use blockcerts_verifier::dns::DohResolver;
use blockcerts_verifier::models::credential::Credential;
use blockcerts_verifier::models::outcome::VerificationOutcome;
use blockcerts_verifier::services::hasher::CanonicalHasher;
use blockcerts_verifier::services::verifier::{VerificationError, Verifier};
use mockito::{mock, Matcher};
use serde_json::{json, Value};
use std::sync::Arc;

fn dns_settings() -> DnsSettings {
    DnsSettings {
        endpoint: format!("{}/resolve", mockito::server_url()),
        timeout_ms: 2_000,
        attempts: 1,
        retry_backoff_ms: 0,
        ..DnsSettings::default()
    }
}

fn credential_for(location: &str) -> Value {
    let data = json!({
        "recipient": { "name": "Alice", "email": "alice@example.com" },
        "issuer": {
            "name": "Example University",
            "identityProof": { "type": "DNS-DID", "location": location, "key": "abc123" }
        },
        "degree": "Bachelor of Science",
        "issuedOn": "2023-06-30"
    });
    let parsed = Credential::from_value(json!({ "data": data.clone() })).unwrap();
    let hash = CanonicalHasher::new().compute_target_hash(parsed.data.as_ref().unwrap());
    json!({ "data": data, "signature": { "targetHash": hash } })
}

fn txt_mock(domain: &str, body: &str) -> mockito::Mock {
    mock("GET", Matcher::Regex("^/resolve".into()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("name".into(), domain.into()),
            Matcher::UrlEncoded("type".into(), "TXT".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/dns-json")
        .with_body(body)
        .create()
}

#[tokio::test]
async fn published_key_and_untouched_data_verify() {
    let _m = txt_mock(
        "flow.example.edu",
        r#"{"Status":0,"Answer":[{"name":"flow.example.edu.","type":16,"data":"did=abc123;"}]}"#,
    );
    let verifier = Verifier::new(
        Arc::new(DohResolver::new(&dns_settings()).unwrap()),
        DnsFailurePolicy::Compat,
    );

    let document = credential_for("flow.example.edu");
    let bytes = serde_json::to_vec(&document).unwrap();
    let report = verifier
        .verify_credential(&Credential::from_slice(&bytes).unwrap())
        .await
        .unwrap();
    assert_eq!(report.outcome, VerificationOutcome::Verified);
    assert_eq!(report.issuer_name.as_deref(), Some("Example University"));

    let mut tampered = document;
    tampered["data"]["recipient"]["email"] = json!("eve@example.com");
    let report = verifier
        .verify_credential(&Credential::from_value(tampered).unwrap())
        .await
        .unwrap();
    assert_eq!(report.outcome, VerificationOutcome::InvalidSignature);
}

#[tokio::test]
async fn nxdomain_depends_on_failure_policy() {
    let _m = txt_mock("gone.example.edu", r#"{"Status":3}"#);
    let credential = Credential::from_value(credential_for("gone.example.edu")).unwrap();

    let compat = Verifier::new(
        Arc::new(DohResolver::new(&dns_settings()).unwrap()),
        DnsFailurePolicy::Compat,
    );
    let report = compat.verify_credential(&credential).await.unwrap();
    assert_eq!(report.outcome, VerificationOutcome::InvalidIssuer);

    let strict = Verifier::new(
        Arc::new(DohResolver::new(&dns_settings()).unwrap()),
        DnsFailurePolicy::Strict,
    );
    let result = strict.verify_credential(&credential).await;
    assert!(matches!(result, Err(VerificationError::Resolver(_))));
}

#[tokio::test]
async fn concurrent_verifications_share_one_engine() {
    let _m = txt_mock(
        "shared.example.edu",
        r#"{"Status":0,"Answer":[{"name":"shared.example.edu.","type":16,"data":"\"did=abc123;\""}]}"#,
    );
    let verifier = Arc::new(Verifier::new(
        Arc::new(DohResolver::new(&dns_settings()).unwrap()),
        DnsFailurePolicy::Compat,
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let verifier = verifier.clone();
            tokio::spawn(async move {
                let credential =
                    Credential::from_value(credential_for("shared.example.edu")).unwrap();
                verifier.verify_credential(&credential).await.unwrap().outcome
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), VerificationOutcome::Verified);
    }
}
