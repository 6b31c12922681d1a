// src/models/credential.rs
//! Verifiable Credential and Verifiable Presentation views.
//!
//! Inbound payloads are kept as raw JSON so the exact document can be handed to
//! the signature service unchanged. The types here are borrowed views that read
//! the fields the trust pipeline needs, following the
//! [W3C Verifiable Credentials Data Model](https://www.w3.org/TR/vc-data-model/).

use serde_json::Value;

/// `type` tag marking a Verifiable Presentation.
pub const PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// `type` tag marking a Verifiable Credential.
pub const CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// Reads the `type` member of a VC/VP document.
///
/// The data model allows either a single string or an array of strings.
/// Non-string array members are skipped.
pub fn type_tags(document: &Value) -> Vec<&str> {
    match document.get("type") {
        Some(Value::String(tag)) => vec![tag.as_str()],
        Some(Value::Array(tags)) => tags.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Exact-match membership test on the document's `type` tags.
pub fn has_type(document: &Value, tag: &str) -> bool {
    type_tags(document).contains(&tag)
}

/// Borrowed view of a Verifiable Credential.
#[derive(Debug, Clone, Copy)]
pub struct VerifiableCredential<'a> {
    raw: &'a Value,
}

impl<'a> VerifiableCredential<'a> {
    /// Wraps a JSON object. Returns `None` for any other JSON value.
    pub fn from_value(raw: &'a Value) -> Option<Self> {
        raw.is_object().then_some(Self { raw })
    }

    /// The complete credential document, proof included.
    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    pub fn has_type(&self, tag: &str) -> bool {
        has_type(self.raw, tag)
    }

    /// Issuer identifier. Accepts both `"issuer": "did:..."` and
    /// `"issuer": { "id": "did:..." }`.
    pub fn issuer(&self) -> Option<&'a str> {
        match self.raw.get("issuer")? {
            Value::String(id) => Some(id.as_str()),
            Value::Object(issuer) => issuer.get("id").and_then(Value::as_str),
            _ => None,
        }
    }

    /// `credentialSubject.id`, the subject's identifier.
    pub fn subject_id(&self) -> Option<&'a str> {
        self.raw
            .get("credentialSubject")?
            .get("id")
            .and_then(Value::as_str)
    }
}

/// Borrowed view of a Verifiable Presentation.
#[derive(Debug, Clone, Copy)]
pub struct VerifiablePresentation<'a> {
    raw: &'a Value,
}

impl<'a> VerifiablePresentation<'a> {
    /// Wraps a JSON object. Returns `None` for any other JSON value.
    pub fn from_value(raw: &'a Value) -> Option<Self> {
        raw.is_object().then_some(Self { raw })
    }

    /// The complete presentation document, proof included.
    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    pub fn holder(&self) -> Option<&'a str> {
        self.raw.get("holder").and_then(Value::as_str)
    }

    /// Embedded credentials, normalized to a list.
    ///
    /// A single embedded object becomes a one-element list. A missing field
    /// or any other JSON shape yields an empty list, as do non-object members.
    pub fn credentials(&self) -> Vec<VerifiableCredential<'a>> {
        match self.raw.get("verifiableCredential") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(VerifiableCredential::from_value)
                .collect(),
            Some(single @ Value::Object(_)) => {
                VerifiableCredential::from_value(single).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_tags_accepts_string_or_array() {
        let single = json!({ "type": "VerifiableCredential" });
        assert_eq!(type_tags(&single), vec!["VerifiableCredential"]);

        let many = json!({ "type": ["VerifiableCredential", 7, "Company Credential"] });
        assert_eq!(
            type_tags(&many),
            vec!["VerifiableCredential", "Company Credential"]
        );

        assert!(type_tags(&json!({})).is_empty());
    }

    #[test]
    fn test_has_type_is_exact_match() {
        let doc = json!({ "type": ["VerifiablePresentationX"] });
        assert!(!has_type(&doc, PRESENTATION_TYPE));

        // A bare string is a single tag, not a substring haystack
        let doc = json!({ "type": "MyVerifiableCredentialType" });
        assert!(!has_type(&doc, CREDENTIAL_TYPE));
    }

    #[test]
    fn test_issuer_string_and_object_forms() {
        let plain = json!({ "issuer": "did:tz:issuer" });
        let vc = VerifiableCredential::from_value(&plain).unwrap();
        assert_eq!(vc.issuer(), Some("did:tz:issuer"));

        let nested = json!({ "issuer": { "id": "did:tz:issuer", "name": "ACME" } });
        let vc = VerifiableCredential::from_value(&nested).unwrap();
        assert_eq!(vc.issuer(), Some("did:tz:issuer"));

        let missing = json!({ "issuer": 12 });
        assert_eq!(VerifiableCredential::from_value(&missing).unwrap().issuer(), None);
    }

    #[test]
    fn test_subject_id() {
        let doc = json!({ "credentialSubject": { "id": "did:tz:subject" } });
        let vc = VerifiableCredential::from_value(&doc).unwrap();
        assert_eq!(vc.subject_id(), Some("did:tz:subject"));

        let doc = json!({ "credentialSubject": [{ "id": "did:tz:subject" }] });
        let vc = VerifiableCredential::from_value(&doc).unwrap();
        assert_eq!(vc.subject_id(), None);
    }

    #[test]
    fn test_credentials_normalization() {
        let single = json!({ "verifiableCredential": { "id": "urn:vc:1" } });
        let vp = VerifiablePresentation::from_value(&single).unwrap();
        assert_eq!(vp.credentials().len(), 1);

        let many = json!({ "verifiableCredential": [{ "id": "urn:vc:1" }, "jwt", { "id": "urn:vc:2" }] });
        let vp = VerifiablePresentation::from_value(&many).unwrap();
        assert_eq!(vp.credentials().len(), 2);

        let none = json!({ "verifiableCredential": "eyJhbGciOi..." });
        let vp = VerifiablePresentation::from_value(&none).unwrap();
        assert!(vp.credentials().is_empty());
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(VerifiableCredential::from_value(&json!([1, 2])).is_none());
        assert!(VerifiablePresentation::from_value(&json!("vp")).is_none());
    }
}
