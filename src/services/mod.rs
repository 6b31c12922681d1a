pub mod api_server;
pub mod token_minter;
pub mod verifier;
