// src/services/api_server.rs
//! API Server for the credential ledger gateway
//!
//! This module provides the REST API in front of the verification pipeline
//! and the token ledgers. The API is built using Axum and includes endpoints for:
//! - Credential and presentation verification (accept/reject decision)
//! - Minting asset, policy and contract tokens from IPFS-pinned metadata
//! - Reading token metadata by id, by name, or all at once
//! - Health reporting
//!
//! Errors are returned as `text/plain` bodies carrying the raw message.

use crate::error::{ApiError, ApiResult};
use crate::models::token::{MintReceipt, TokenKind, TokenMetadata};
use crate::services::token_minter::{MintError, TokenMinter};
use crate::services::verifier::{Decision, Verifier};
use axum::{
    body::Bytes,
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Response for the verification endpoint
#[derive(Debug, Serialize, Deserialize)]
struct VerifyResponse {
    status: Decision,
}

/// API server state containing all service dependencies
#[derive(Clone)]
pub struct ApiServer {
    /// Credential/presentation verification pipeline
    verifier: Arc<Verifier>,

    /// Service for minting and reading tokens
    minter: Arc<TokenMinter>,

    /// Adds a permissive CORS layer when set
    enable_cors: bool,
}

impl ApiServer {
    /// Creates a new instance of the API server
    ///
    /// # Arguments
    /// * `verifier` - Verification pipeline
    /// * `minter` - Token minting and query service
    /// * `enable_cors` - Whether to allow cross-origin requests
    pub fn new(verifier: Verifier, minter: TokenMinter, enable_cors: bool) -> Self {
        ApiServer {
            verifier: Arc::new(verifier),
            minter: Arc::new(minter),
            enable_cors,
        }
    }

    /// Builds the router with every gateway route.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/verify", post(Self::verify_handler))
            .route("/mint/:kind", post(Self::mint_handler))
            .route(
                "/asset/:id",
                get(|state: State<Arc<ApiServer>>, id: Path<String>| {
                    Self::token_handler(TokenKind::Asset, state, id)
                }),
            )
            .route(
                "/policy/:id",
                get(|state: State<Arc<ApiServer>>, id: Path<String>| {
                    Self::token_handler(TokenKind::Policy, state, id)
                }),
            )
            .route(
                "/contract/:id",
                get(|state: State<Arc<ApiServer>>, id: Path<String>| {
                    Self::token_handler(TokenKind::Contract, state, id)
                }),
            )
            .route(
                "/assetName/:name",
                get(|state: State<Arc<ApiServer>>, name: Path<String>| {
                    Self::token_name_handler(TokenKind::Asset, state, name)
                }),
            )
            .route(
                "/policyName/:name",
                get(|state: State<Arc<ApiServer>>, name: Path<String>| {
                    Self::token_name_handler(TokenKind::Policy, state, name)
                }),
            )
            .route("/all/:token_type", get(Self::all_tokens_handler))
            .route("/health", get(Self::health_handler))
            .with_state(Arc::new(self.clone()));

        if self.enable_cors {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "0.0.0.0:3000")
    pub async fn run(&self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await
    }

    // =====================
    // Verification
    // =====================

    /// Verifies a credential or presentation
    ///
    /// # Endpoint
    /// POST /verify
    ///
    /// # Request Body
    /// A Verifiable Credential or Verifiable Presentation JSON object
    ///
    /// # Responses
    /// - 200 OK: `{"status": "accept" | "reject"}`
    /// - 400 Bad Request: Body is not a JSON object
    async fn verify_handler(
        State(state): State<Arc<ApiServer>>,
        body: Bytes,
    ) -> ApiResult<Json<VerifyResponse>> {
        log::info!("Verify endpoint triggered");
        let payload = parse_object(&body)?;
        let status = state.verifier.verify(&payload).await;
        Ok(Json(VerifyResponse { status }))
    }

    // =====================
    // Token Handlers
    // =====================

    /// Pins metadata to IPFS and mints a token
    ///
    /// # Endpoint
    /// POST /mint/:kind (`asset`, `policy` or `contract`)
    ///
    /// # Request Body
    /// TZIP-12 metadata document to pin
    ///
    /// # Responses
    /// - 201 Created: `{"status": "ok", "hash": <operation hash>}`
    /// - 400 Bad Request: Invalid body, or the mint operation failed
    /// - 404 Not Found: Unknown kind, or pinning failed
    async fn mint_handler(
        State(state): State<Arc<ApiServer>>,
        Path(kind): Path<String>,
        body: Bytes,
    ) -> ApiResult<(StatusCode, Json<MintReceipt>)> {
        log::info!("Mint {} endpoint triggered", kind);
        let kind = parse_kind(&kind)?;
        let metadata = parse_object(&body)?;

        match state.minter.mint(kind, &metadata).await {
            Ok(receipt) => Ok((StatusCode::CREATED, Json(receipt))),
            Err(MintError::Pinning(e)) => {
                log::error!("Pinning {} metadata failed: {}", kind, e);
                Err(ApiError::NotFound(e.to_string()))
            }
            Err(MintError::Minting(e)) => {
                log::error!("Minting {} token failed: {}", kind, e);
                Err(ApiError::BadRequest(e.to_string()))
            }
        }
    }

    /// Fetches metadata of one token
    ///
    /// # Endpoint
    /// GET /asset/:id, /policy/:id, /contract/:id
    ///
    /// # Responses
    /// - 200 OK: Token metadata
    /// - 404 Not Found: Invalid id, missing token, or lookup failure
    async fn token_handler(
        kind: TokenKind,
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<String>,
    ) -> ApiResult<Json<TokenMetadata>> {
        log::info!("Get {} endpoint triggered", kind);
        let token_id = id
            .parse::<u64>()
            .map_err(|e| ApiError::NotFound(format!("invalid token id {id}: {e}")))?;
        state
            .minter
            .token(kind, token_id)
            .await
            .map(Json)
            .map_err(|e| ApiError::NotFound(e.to_string()))
    }

    /// Lists tokens whose name matches exactly
    ///
    /// # Endpoint
    /// GET /assetName/:name, /policyName/:name
    async fn token_name_handler(
        kind: TokenKind,
        State(state): State<Arc<ApiServer>>,
        Path(name): Path<String>,
    ) -> ApiResult<Json<Vec<TokenMetadata>>> {
        log::info!("Get {} by name endpoint triggered", kind);
        state
            .minter
            .tokens_by_name(kind, &name)
            .await
            .map(Json)
            .map_err(|e| ApiError::NotFound(e.to_string()))
    }

    /// Lists every token of a kind
    ///
    /// # Endpoint
    /// GET /all/:token_type
    async fn all_tokens_handler(
        State(state): State<Arc<ApiServer>>,
        Path(token_type): Path<String>,
    ) -> ApiResult<Json<Vec<TokenMetadata>>> {
        log::info!("Get all {} endpoint triggered", token_type);
        let kind = parse_kind(&token_type)?;
        state
            .minter
            .all_tokens(kind)
            .await
            .map(Json)
            .map_err(|e| ApiError::NotFound(e.to_string()))
    }

    /// GET /health
    async fn health_handler() -> impl IntoResponse {
        Json(json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}

/// Parses a request body that must be a JSON object.
fn parse_object(body: &[u8]) -> ApiResult<Value> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if !value.is_object() {
        return Err(ApiError::BadRequest(
            "request body must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}

fn parse_kind(kind: &str) -> ApiResult<TokenKind> {
    kind.parse::<TokenKind>()
        .map_err(|e| ApiError::NotFound(e.to_string()))
}
