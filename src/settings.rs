// src/settings.rs
//! Runtime configuration for the gateway.
//!
//! Sources are layered in this order (later wins):
//! 1. Built-in defaults
//! 2. Optional `config/gateway.{toml,yaml,json}` file
//! 3. Environment variables prefixed with `GATEWAY`, nested with `__`
//!    (e.g. `GATEWAY_TEZOS__INDEXER_URL`, `GATEWAY_SERVER__PORT`)
//!
//! `.env` is loaded by `main` before this runs, so its entries appear as
//! ordinary environment variables.
//!
//! Contract addresses and the mint recipient have no usable default; loading
//! fails while any of them is empty.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Default domain credential tag accepted by the verifier.
pub const DEFAULT_CREDENTIAL_TYPE: &str = "Company Credential";

/// Complete gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub tezos: TezosSettings,
    pub ipfs: IpfsSettings,
    pub verifier: VerifierSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

/// Ledger endpoints and contract addresses.
#[derive(Debug, Clone, Deserialize)]
pub struct TezosSettings {
    /// TzKT-compatible indexer used for all reads
    pub indexer_url: String,
    /// Remote signer/injector that submits contract calls
    pub operation_gateway_url: String,
    /// Owner of newly minted tokens
    pub mint_recipient: String,
    pub asset_address: String,
    pub policy_address: String,
    pub contract_address: String,
    /// Contract holding the credential publication log
    pub log_address: String,
    pub log_bigmap: String,
    /// Contract holding the trusted issuer registry
    pub registry_address: String,
    pub registry_bigmap: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpfsSettings {
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifierSettings {
    /// VC-API compatible signature verification service
    pub signature_service_url: String,
    /// Domain tag a credential's `type` must carry
    pub credential_type: String,
}

impl Settings {
    /// Loads settings from defaults, the optional config file and the
    /// environment.
    ///
    /// # Errors
    /// A source fails to parse, or a required ledger address is empty.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Self::environment())
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Self::builder()?
            .add_source(File::with_name("config/gateway").required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// `GATEWAY_<SECTION>__<KEY>` variables.
    fn environment() -> Environment {
        Environment::with_prefix("GATEWAY")
            .prefix_separator("_")
            .separator("__")
    }

    /// Rejects empty ledger addresses.
    fn validate(&self) -> Result<(), ConfigError> {
        let tezos = &self.tezos;
        let required = [
            ("tezos.mint_recipient", &tezos.mint_recipient),
            ("tezos.asset_address", &tezos.asset_address),
            ("tezos.policy_address", &tezos.policy_address),
            ("tezos.contract_address", &tezos.contract_address),
            ("tezos.log_address", &tezos.log_address),
            ("tezos.registry_address", &tezos.registry_address),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((key, _)) => Err(ConfigError::Message(format!("{key} must be set"))),
            None => Ok(()),
        }
    }

    /// Address and port the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000_i64)?
            .set_default("server.enable_cors", true)?
            .set_default("tezos.indexer_url", "https://api.ghostnet.tzkt.io")?
            .set_default("tezos.operation_gateway_url", "http://localhost:8732")?
            .set_default("tezos.mint_recipient", "")?
            .set_default("tezos.asset_address", "")?
            .set_default("tezos.policy_address", "")?
            .set_default("tezos.contract_address", "")?
            .set_default("tezos.log_address", "")?
            .set_default("tezos.log_bigmap", "logs")?
            .set_default("tezos.registry_address", "")?
            .set_default("tezos.registry_bigmap", "issuers")?
            .set_default("ipfs.api_url", "http://localhost:5001")?
            .set_default("verifier.signature_service_url", "http://localhost:9000")?
            .set_default("verifier.credential_type", DEFAULT_CREDENTIAL_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize() {
        let settings: Settings = Settings::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 3000);
        assert!(settings.server.enable_cors);
        assert_eq!(settings.verifier.credential_type, DEFAULT_CREDENTIAL_TYPE);
        assert_eq!(settings.tezos.log_bigmap, "logs");
        assert_eq!(settings.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let settings: Settings = Settings::builder()
            .unwrap()
            .set_override("server.port", 8080_i64)
            .unwrap()
            .set_override("tezos.asset_address", "KT1Asset")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.tezos.asset_address, "KT1Asset");
    }

    fn addresses() -> config::Map<String, String> {
        [
            ("GATEWAY_TEZOS__MINT_RECIPIENT", "tz1Owner"),
            ("GATEWAY_TEZOS__ASSET_ADDRESS", "KT1Asset"),
            ("GATEWAY_TEZOS__POLICY_ADDRESS", "KT1Policy"),
            ("GATEWAY_TEZOS__CONTRACT_ADDRESS", "KT1Contract"),
            ("GATEWAY_TEZOS__LOG_ADDRESS", "KT1Log"),
            ("GATEWAY_TEZOS__REGISTRY_ADDRESS", "KT1Registry"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
    }

    #[test]
    fn test_environment_uses_single_underscore_after_prefix() {
        let mut vars = addresses();
        vars.insert("GATEWAY_SERVER__PORT".into(), "8081".into());
        let settings =
            Settings::from_environment(Settings::environment().source(Some(vars))).unwrap();

        assert_eq!(settings.tezos.log_address, "KT1Log");
        assert_eq!(settings.tezos.registry_address, "KT1Registry");
        assert_eq!(settings.server.port, 8081);
    }

    #[test]
    fn test_empty_address_is_rejected() {
        let mut vars = addresses();
        vars.remove("GATEWAY_TEZOS__LOG_ADDRESS");
        let err = Settings::from_environment(Settings::environment().source(Some(vars)))
            .unwrap_err();
        assert_eq!(err.to_string(), "tezos.log_address must be set");

        let mut vars = addresses();
        vars.insert("GATEWAY_TEZOS__MINT_RECIPIENT".into(), "  ".into());
        let err = Settings::from_environment(Settings::environment().source(Some(vars)))
            .unwrap_err();
        assert_eq!(err.to_string(), "tezos.mint_recipient must be set");
    }

    #[test]
    fn test_load_reads_process_environment() {
        for (key, value) in addresses() {
            std::env::set_var(key, value);
        }
        std::env::set_var("GATEWAY_TEZOS__LOG_ADDRESS", "KT1Documented");

        let settings = Settings::load().unwrap();
        assert_eq!(settings.tezos.log_address, "KT1Documented");
        assert_eq!(settings.tezos.asset_address, "KT1Asset");
    }
}
