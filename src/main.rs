// src/main.rs

//! # Credential Ledger Gateway - Main Entry Point
//!
//! Initializes all core components and starts the API server.
//!
//! ## Architecture Overview
//! 1. **Blockchain Layer**: `TezosClient` for indexer reads and contract calls
//! 2. **Contracts Layer**: publication log, trusted issuer registry, FA2 token ledgers
//! 3. **Services Layer**: verification pipeline, token minting, API endpoints
//! 4. **Storage Layer**: IPFS for token metadata
//! 5. **Proof Layer**: remote signature verification service
//!
//! ## Configuration
//! Read by [`settings::Settings::load`]; every key can be set through a
//! `GATEWAY_<SECTION>__<KEY>` environment variable or `.env` entry, e.g.
//! - `GATEWAY_TEZOS__LOG_ADDRESS`: publication log contract
//! - `GATEWAY_TEZOS__REGISTRY_ADDRESS`: trusted issuer registry contract
//! - `GATEWAY_TEZOS__ASSET_ADDRESS`: asset token contract
//! - `GATEWAY_IPFS__API_URL`: IPFS node URL (default: http://localhost:5001)

use crate::blockchain::tezos_client::TezosClient;
use crate::contracts::issuer_registry::IssuerRegistryContract;
use crate::contracts::publication_log::PublicationLogContract;
use crate::contracts::token_registry::{Fa2TokenRegistry, TokenContracts};
use crate::proof::signature_verification::SignatureServiceClient;
use crate::services::api_server::ApiServer;
use crate::services::token_minter::TokenMinter;
use crate::services::verifier::Verifier;
use crate::settings::Settings;
use crate::storage::ipfs_client::IpfsStorage;
use anyhow::Context;
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;

// Module declarations (organized by functional domain)
mod blockchain; // Tezos indexer and operation gateway
mod contracts; // On-chain contract interfaces
mod error; // Shared error types
mod models; // Data structures
mod proof; // Signature verification
mod services; // Business logic and API
mod settings; // Runtime configuration
mod storage; // IPFS storage layer
mod utils; // Helper functions

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Initialize logging
/// 3. Build ledger, storage and signature adapters
/// 4. Wire services
/// 5. Start API server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load().context("failed to load gateway settings")?;
    let tezos = &settings.tezos;

    let tezos_client = TezosClient::new(&tezos.indexer_url, &tezos.operation_gateway_url);

    // Credential Verifier Service
    let publication_log =
        PublicationLogContract::new(tezos_client.clone(), &tezos.log_address, &tezos.log_bigmap);
    let trust_registry = IssuerRegistryContract::new(
        tezos_client.clone(),
        &tezos.registry_address,
        &tezos.registry_bigmap,
    );
    let signatures = SignatureServiceClient::new(&settings.verifier.signature_service_url);
    let verifier = Verifier::new(
        Arc::new(publication_log),
        Arc::new(trust_registry),
        Arc::new(signatures),
        &settings.verifier.credential_type,
    );

    // Token Minting Service
    let ipfs_storage = IpfsStorage::new(&settings.ipfs.api_url)
        .context("failed to initialize IPFS client - check ipfs.api_url")?;
    let token_registry = Fa2TokenRegistry::new(
        tezos_client,
        TokenContracts {
            asset: tezos.asset_address.clone(),
            policy: tezos.policy_address.clone(),
            contract: tezos.contract_address.clone(),
        },
        &tezos.mint_recipient,
    );
    let minter = TokenMinter::new(Arc::new(ipfs_storage), Arc::new(token_registry));

    let api_server = ApiServer::new(verifier, minter, settings.server.enable_cors);

    // Start the HTTP server
    let addr: SocketAddr = settings
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address {}", settings.bind_address()))?;
    log::info!("API server running at http://{}", addr);
    log::info!("Available endpoints:");
    log::info!("- POST /verify");
    log::info!("- POST /mint/{{asset|policy|contract}}");
    log::info!("- GET  /asset/:id, /policy/:id, /contract/:id");
    log::info!("- GET  /assetName/:name, /policyName/:name");
    log::info!("- GET  /all/:tokenType");
    log::info!("- GET  /health");

    api_server
        .run(addr)
        .await
        .context("API server terminated")?;
    Ok(())
}
