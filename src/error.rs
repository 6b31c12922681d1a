// src/error.rs
//! Error types shared across the gateway.
//!
//! - [`CapabilityError`]: failures raised by external collaborators (indexer,
//!   operation gateway, IPFS node, signature service)
//! - [`ApiError`]: failures surfaced on the HTTP boundary
//!
//! HTTP errors carry their raw message as a `text/plain` body, the same shape
//! every route of the gateway has always used.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure of an external capability call.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// The request never produced a response (connection, TLS, timeout).
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The collaborator answered with a non-success status.
    #[error("{service} responded with status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be interpreted.
    #[error("unexpected {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// The ledger has no token under this id. Ends bigmap pagination.
    #[error("token {token_id} not found in {contract}")]
    TokenNotFound { contract: String, token_id: u64 },

    /// IPFS add/pin failure.
    #[error("IPFS error: {0}")]
    Ipfs(String),
}

impl CapabilityError {
    pub fn transport(service: &'static str, source: reqwest::Error) -> Self {
        CapabilityError::Transport { service, source }
    }

    pub fn decode(service: &'static str, message: impl Into<String>) -> Self {
        CapabilityError::Decode {
            service,
            message: message.into(),
        }
    }

    /// True when the error marks the end of a token enumeration.
    pub fn is_token_not_found(&self) -> bool {
        matches!(self, CapabilityError::TokenNotFound { .. })
    }
}

/// HTTP-level error returned by route handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;
