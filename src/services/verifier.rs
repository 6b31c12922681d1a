// src/services/verifier.rs
//! Credential verification service.
//!
//! Decides whether a presented Verifiable Credential, or a Verifiable
//! Presentation wrapping one, is acceptable. The decision is a strict AND-chain
//! evaluated in this order, stopping at the first failed gate:
//!
//! 1. Classify the payload as presentation or credential
//! 2. (VP) Extract the embedded credential carrying the domain type tag
//! 3. (VC) Require the domain type tag on the bare credential
//! 4. (VP) Bind the presentation holder to the credential subject
//! 5. Publication log says the subject's credentials are on-chain
//! 6. Issuer is in the trusted issuer registry
//! 7. Credential proof verifies
//! 8. (VP) Presentation proof verifies
//!
//! Every failure, external errors included, becomes [`Decision::Reject`]. The
//! reason is logged, never returned to the caller.

use crate::contracts::issuer_registry::TrustRegistry;
use crate::contracts::publication_log::PublicationLog;
use crate::error::CapabilityError;
use crate::models::credential::{
    has_type, VerifiableCredential, VerifiablePresentation, CREDENTIAL_TYPE, PRESENTATION_TYPE,
};
use crate::proof::signature_verification::{SignatureVerifier, DEFAULT_OPTIONS};
use crate::utils::serialization::serialize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Outcome of a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

/// Shape of an inbound payload, judged by its `type` tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Presentation,
    Credential,
    Unknown,
}

/// Why a payload was rejected. One variant per gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("unable to determine the type of the credential")]
    UnknownType,

    #[error("unable to find a verifiable credential of type {0:?} in the presentation")]
    CredentialNotFound(String),

    #[error("the type of the credential is not {0:?}")]
    CredentialTypeMismatch(String),

    #[error("the credential subject {subject:?} does not match the presentation holder {holder:?}")]
    HolderMismatch {
        holder: Option<String>,
        subject: Option<String>,
    },

    #[error("the credential has no subject id")]
    MissingSubject,

    #[error("unable to detect a publication log for {0}")]
    NotPublished(String),

    #[error("publication log for {subject} reads {message:?}")]
    UnpublishedStatus { subject: String, message: String },

    #[error("publication log lookup failed: {0}")]
    PublicationLookupFailed(String),

    #[error("the credential has no issuer")]
    MissingIssuer,

    #[error("unable to find issuer {0} in the trusted issuers registry")]
    UntrustedIssuer(String),

    #[error("trusted issuer lookup failed: {0}")]
    TrustLookupFailed(String),

    #[error("unable to verify credential: {}", .0.join(", "))]
    InvalidCredentialSignature(Vec<String>),

    #[error("unable to verify presentation: {}", .0.join(", "))]
    InvalidPresentationSignature(Vec<String>),

    #[error("signature service failed: {0}")]
    SignatureServiceFailed(String),
}

/// Classifies a payload. Presentation wins when both tags are present.
pub fn classify(payload: &Value) -> PayloadKind {
    if has_type(payload, PRESENTATION_TYPE) {
        PayloadKind::Presentation
    } else if has_type(payload, CREDENTIAL_TYPE) {
        PayloadKind::Credential
    } else {
        PayloadKind::Unknown
    }
}

/// First embedded credential carrying `credential_type`.
pub fn extract_credential<'a>(
    presentation: &VerifiablePresentation<'a>,
    credential_type: &str,
) -> Result<VerifiableCredential<'a>, Rejection> {
    presentation
        .credentials()
        .into_iter()
        .find(|vc| vc.has_type(credential_type))
        .ok_or_else(|| Rejection::CredentialNotFound(credential_type.to_string()))
}

/// The presentation holder must be the credential subject.
///
/// Both identifiers must be present; two missing ids do not bind
/// (DESIGN.md, Open Question decision 2).
pub fn check_binding(
    presentation: &VerifiablePresentation<'_>,
    credential: &VerifiableCredential<'_>,
) -> Result<(), Rejection> {
    match (presentation.holder(), credential.subject_id()) {
        (Some(holder), Some(subject)) if holder == subject => Ok(()),
        (holder, subject) => Err(Rejection::HolderMismatch {
            holder: holder.map(str::to_string),
            subject: subject.map(str::to_string),
        }),
    }
}

/// Credential verification pipeline over injected capabilities.
#[derive(Clone)]
pub struct Verifier {
    publication_log: Arc<dyn PublicationLog>,
    trust_registry: Arc<dyn TrustRegistry>,
    signatures: Arc<dyn SignatureVerifier>,
    /// Domain type tag a credential must carry
    credential_type: String,
}

impl Verifier {
    pub fn new(
        publication_log: Arc<dyn PublicationLog>,
        trust_registry: Arc<dyn TrustRegistry>,
        signatures: Arc<dyn SignatureVerifier>,
        credential_type: &str,
    ) -> Self {
        Self {
            publication_log,
            trust_registry,
            signatures,
            credential_type: credential_type.to_string(),
        }
    }

    /// Verifies a payload and returns the decision. Never fails.
    pub async fn verify(&self, payload: &Value) -> Decision {
        match self.evaluate(payload).await {
            Ok(()) => {
                log::info!("Verification accepted");
                Decision::Accept
            }
            Err(rejection) => {
                log::warn!("Verification rejected: {}", rejection);
                Decision::Reject
            }
        }
    }

    /// Runs the gates in order and reports the first failure.
    pub async fn evaluate(&self, payload: &Value) -> Result<(), Rejection> {
        match classify(payload) {
            PayloadKind::Presentation => {
                let presentation =
                    VerifiablePresentation::from_value(payload).ok_or(Rejection::UnknownType)?;
                let credential = extract_credential(&presentation, &self.credential_type)?;
                check_binding(&presentation, &credential)?;
                self.check_credential(&credential).await?;
                self.check_presentation_signature(&presentation).await
            }
            PayloadKind::Credential => {
                let credential =
                    VerifiableCredential::from_value(payload).ok_or(Rejection::UnknownType)?;
                if !credential.has_type(&self.credential_type) {
                    return Err(Rejection::CredentialTypeMismatch(self.credential_type.clone()));
                }
                self.check_credential(&credential).await
            }
            PayloadKind::Unknown => Err(Rejection::UnknownType),
        }
    }

    /// Gates shared by both paths: publication, trust, credential proof.
    async fn check_credential(&self, credential: &VerifiableCredential<'_>) -> Result<(), Rejection> {
        self.check_published(credential).await?;
        self.check_issuer(credential).await?;
        self.check_credential_signature(credential).await
    }

    async fn check_published(&self, credential: &VerifiableCredential<'_>) -> Result<(), Rejection> {
        let subject = credential.subject_id().ok_or(Rejection::MissingSubject)?;
        let entry = self
            .publication_log
            .lookup(subject)
            .await
            .map_err(|e| Rejection::PublicationLookupFailed(e.to_string()))?
            .ok_or_else(|| Rejection::NotPublished(subject.to_string()))?;

        if entry.is_published() {
            Ok(())
        } else {
            Err(Rejection::UnpublishedStatus {
                subject: subject.to_string(),
                message: entry.message,
            })
        }
    }

    async fn check_issuer(&self, credential: &VerifiableCredential<'_>) -> Result<(), Rejection> {
        let issuer = credential.issuer().ok_or(Rejection::MissingIssuer)?;
        let trusted = self
            .trust_registry
            .is_trusted(issuer)
            .await
            .map_err(|e| Rejection::TrustLookupFailed(e.to_string()))?;

        if trusted {
            Ok(())
        } else {
            Err(Rejection::UntrustedIssuer(issuer.to_string()))
        }
    }

    async fn check_credential_signature(
        &self,
        credential: &VerifiableCredential<'_>,
    ) -> Result<(), Rejection> {
        let serialized = serialize_document(credential.raw())?;
        let report = self
            .signatures
            .verify_credential(&serialized, DEFAULT_OPTIONS)
            .await
            .map_err(signature_service_failed)?;

        if report.is_valid() {
            Ok(())
        } else {
            Err(Rejection::InvalidCredentialSignature(report.errors))
        }
    }

    async fn check_presentation_signature(
        &self,
        presentation: &VerifiablePresentation<'_>,
    ) -> Result<(), Rejection> {
        let serialized = serialize_document(presentation.raw())?;
        let report = self
            .signatures
            .verify_presentation(&serialized, DEFAULT_OPTIONS)
            .await
            .map_err(signature_service_failed)?;

        if report.is_valid() {
            Ok(())
        } else {
            Err(Rejection::InvalidPresentationSignature(report.errors))
        }
    }
}

fn serialize_document(document: &Value) -> Result<String, Rejection> {
    serialize(document).map_err(|e| Rejection::SignatureServiceFailed(e.to_string()))
}

fn signature_service_failed(error: CapabilityError) -> Rejection {
    Rejection::SignatureServiceFailed(error.to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process fakes of the verifier's capabilities.

    use super::*;
    use crate::contracts::publication_log::{LogEntry, PUBLISHED_MESSAGE};
    use crate::proof::signature_verification::VerificationReport;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    pub const ISSUER: &str = "did:tz:tz1issuer";
    pub const SUBJECT: &str = "did:tz:tz1subject";
    pub const DOMAIN_TYPE: &str = "Company Credential";

    /// Publication log backed by a map; `None` values simulate lookup errors.
    #[derive(Default)]
    pub struct FakeLog {
        pub entries: HashMap<String, Option<String>>,
        pub calls: AtomicUsize,
    }

    impl FakeLog {
        pub fn published(subject: &str) -> Self {
            Self::with_message(subject, PUBLISHED_MESSAGE)
        }

        pub fn with_message(subject: &str, message: &str) -> Self {
            let mut log = FakeLog::default();
            log.entries
                .insert(subject.to_string(), Some(message.to_string()));
            log
        }

        pub fn failing(subject: &str) -> Self {
            let mut log = FakeLog::default();
            log.entries.insert(subject.to_string(), None);
            log
        }
    }

    #[async_trait]
    impl PublicationLog for FakeLog {
        async fn lookup(&self, subject_id: &str) -> Result<Option<LogEntry>, CapabilityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.entries.get(subject_id) {
                None => Ok(None),
                Some(None) => Err(CapabilityError::decode("indexer", "connection reset")),
                Some(Some(message)) => Ok(Some(LogEntry {
                    message: message.clone(),
                })),
            }
        }
    }

    /// Trust registry backed by a map; `Err` entries simulate lookup errors.
    #[derive(Default)]
    pub struct FakeRegistry {
        pub issuers: HashMap<String, Result<bool, String>>,
        pub calls: AtomicUsize,
    }

    impl FakeRegistry {
        pub fn trusting(issuer: &str) -> Self {
            let mut registry = FakeRegistry::default();
            registry.issuers.insert(issuer.to_string(), Ok(true));
            registry
        }
    }

    #[async_trait]
    impl TrustRegistry for FakeRegistry {
        async fn is_trusted(&self, issuer_id: &str) -> Result<bool, CapabilityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.issuers.get(issuer_id) {
                None => Ok(false),
                Some(Ok(trusted)) => Ok(*trusted),
                Some(Err(message)) => Err(CapabilityError::decode("indexer", message.clone())),
            }
        }
    }

    /// Signature verifier returning canned error lists and recording calls.
    #[derive(Default)]
    pub struct FakeSignatures {
        pub credential_errors: Vec<String>,
        pub presentation_errors: Vec<String>,
        pub fail: bool,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeSignatures {
        pub fn valid() -> Self {
            FakeSignatures::default()
        }

        pub fn bad_credential(error: &str) -> Self {
            FakeSignatures {
                credential_errors: vec![error.to_string()],
                ..Default::default()
            }
        }

        pub fn bad_presentation(error: &str) -> Self {
            FakeSignatures {
                presentation_errors: vec![error.to_string()],
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
        }

        fn report(
            &self,
            kind: &str,
            document: &str,
            options: &str,
            errors: &[String],
        ) -> Result<VerificationReport, CapabilityError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((kind.to_string(), options.to_string()));
            }
            // The document must be the untouched JSON of what was presented
            serde_json::from_str::<Value>(document)
                .map_err(|e| CapabilityError::decode("signature service", e.to_string()))?;
            if self.fail {
                return Err(CapabilityError::decode("signature service", "unreachable"));
            }
            Ok(VerificationReport {
                errors: errors.to_vec(),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl SignatureVerifier for FakeSignatures {
        async fn verify_credential(
            &self,
            credential: &str,
            options: &str,
        ) -> Result<VerificationReport, CapabilityError> {
            self.report("credential", credential, options, &self.credential_errors)
        }

        async fn verify_presentation(
            &self,
            presentation: &str,
            options: &str,
        ) -> Result<VerificationReport, CapabilityError> {
            self.report("presentation", presentation, options, &self.presentation_errors)
        }
    }

    pub fn credential(subject: &str) -> Value {
        serde_json::json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "id": "urn:uuid:78c7919b-7774-401a-8ad3-b79760ba4d65",
            "type": ["VerifiableCredential", DOMAIN_TYPE],
            "issuer": ISSUER,
            "issuanceDate": "2022-05-01T10:00:00Z",
            "credentialSubject": { "id": subject, "companyName": "ACME" },
            "proof": { "type": "Ed25519Signature2018", "jws": "eyJhbGciOiJFZERTQSJ9..sig" }
        })
    }

    pub fn presentation(holder: &str, credential: Value) -> Value {
        serde_json::json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiablePresentation"],
            "holder": holder,
            "verifiableCredential": [credential],
            "proof": { "type": "Ed25519Signature2018", "jws": "eyJhbGciOiJFZERTQSJ9..vpsig" }
        })
    }
}
