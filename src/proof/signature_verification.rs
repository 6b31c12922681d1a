// src/proof/signature_verification.rs
//! # Credential Proof Verification
//!
//! Checks the embedded `proof` of a Verifiable Credential or Presentation by
//! delegating to a VC-API compatible verification service (DIDKit HTTP or
//! equivalent). The service resolves DIDs, canonicalizes the document and
//! checks the linked-data signature; this module only transports documents and
//! reads back the outcome.
//!
//! ## Contract
//! - Documents are passed as serialized JSON, together with a serialized
//!   options object (`"{}"` for default options)
//! - The outcome is a [`VerificationReport`]; verification succeeded iff its
//!   `errors` list is empty

use crate::error::CapabilityError;
use crate::utils::http::{endpoint, ensure_success};
use crate::utils::serialization::deserialize;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const SIGNATURE_SERVICE: &str = "signature service";

/// Canonical serialization of the default verification options.
pub const DEFAULT_OPTIONS: &str = "{}";

/// Result of a proof check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl VerificationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Cryptographic proof checks on serialized VC/VP documents.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    async fn verify_credential(
        &self,
        credential: &str,
        options: &str,
    ) -> Result<VerificationReport, CapabilityError>;

    async fn verify_presentation(
        &self,
        presentation: &str,
        options: &str,
    ) -> Result<VerificationReport, CapabilityError>;
}

/// HTTP client for a VC-API verification service.
///
/// Calls `POST {base}/credentials/verify` and `POST {base}/presentations/verify`.
#[derive(Clone, Debug)]
pub struct SignatureServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl SignatureServiceClient {
    pub fn new(base_url: &str) -> Self {
        SignatureServiceClient {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    async fn verify(
        &self,
        resource: &str,
        document_field: &str,
        document: &str,
        options: &str,
    ) -> Result<VerificationReport, CapabilityError> {
        let document: Value = deserialize(document)
            .map_err(|e| CapabilityError::decode(SIGNATURE_SERVICE, format!("document: {e}")))?;
        let options: Value = deserialize(options)
            .map_err(|e| CapabilityError::decode(SIGNATURE_SERVICE, format!("options: {e}")))?;

        let mut body = Map::new();
        body.insert(document_field.to_string(), document);
        body.insert("options".to_string(), options);

        let url = endpoint(&self.base_url, SIGNATURE_SERVICE, &[resource, "verify"])?;
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CapabilityError::transport(SIGNATURE_SERVICE, e))?;

        ensure_success(SIGNATURE_SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| CapabilityError::decode(SIGNATURE_SERVICE, e.to_string()))
    }
}

#[async_trait]
impl SignatureVerifier for SignatureServiceClient {
    async fn verify_credential(
        &self,
        credential: &str,
        options: &str,
    ) -> Result<VerificationReport, CapabilityError> {
        self.verify("credentials", "verifiableCredential", credential, options)
            .await
    }

    async fn verify_presentation(
        &self,
        presentation: &str,
        options: &str,
    ) -> Result<VerificationReport, CapabilityError> {
        self.verify("presentations", "verifiablePresentation", presentation, options)
            .await
    }
}
