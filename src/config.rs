//! Run configuration.
//!
//! Values come from an optional TOML file and are then overridden by command
//! line flags. Every field has a default, so an empty file is valid, but a
//! live run also needs `ledger.endpoint` (or `--endpoint`) naming a node the
//! operator trusts with the signing seed.
//!
//! # Example TOML
//! ```toml
//! [ledger]
//! network = "testnet"
//! endpoint = "http://localhost:5005"
//! decimals = 6
//!
//! [retry]
//! retry_limit = 3
//! backoff_ms = 1000
//! backoff_factor = 2
//! max_backoff_ms = 10000
//! ```

use crate::application::watcher::RetryPolicy;
use crate::domain::amount::LedgerPrecision;
use crate::error::{PayoutError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Which ledger network a run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
}

impl Network {
    const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Devnet];

    /// Public JSON-RPC server run by Ripple for this network.
    pub fn public_endpoint(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://s1.ripple.com:51234/",
            Network::Testnet => "https://s.altnet.rippletest.net:51234/",
            Network::Devnet => "https://s.devnet.rippletest.net:51234/",
        }
    }

    /// Whether `endpoint` is one of the public servers of any network.
    pub fn is_public_endpoint(endpoint: &str) -> bool {
        let endpoint = endpoint.trim().trim_end_matches('/');
        Self::ALL
            .iter()
            .any(|network| network.public_endpoint().trim_end_matches('/') == endpoint)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub network: Network,
    /// Node that signs and submits payments. Required for live runs.
    pub endpoint: Option<String>,
    pub decimals: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            endpoint: None,
            decimals: LedgerPrecision::default().decimals,
        }
    }
}

impl LedgerConfig {
    /// Endpoint that receives the signing seed with every submission.
    ///
    /// Must be configured explicitly and must not be a public server.
    pub fn signing_endpoint(&self) -> Result<&str> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            PayoutError::ConfigError(
                "live payments need a trusted signing node: set --endpoint or ledger.endpoint"
                    .to_string(),
            )
        })?;
        if Network::is_public_endpoint(endpoint) {
            return Err(PayoutError::ConfigError(format!(
                "{endpoint} is a public server; refusing to send the signing seed to it"
            )));
        }
        Ok(endpoint)
    }

    pub fn precision(&self) -> LedgerPrecision {
        LedgerPrecision {
            decimals: self.decimals,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would break the polling contract.
    pub fn validate(&self) -> Result<()> {
        if self.retry.backoff_factor < 1 {
            return Err(PayoutError::ConfigError(
                "retry.backoff_factor must be at least 1".to_string(),
            ));
        }
        if self.retry.max_backoff_ms < self.retry.backoff_ms {
            return Err(PayoutError::ConfigError(
                "retry.max_backoff_ms must not be below retry.backoff_ms".to_string(),
            ));
        }
        if self.ledger.decimals > 18 {
            return Err(PayoutError::ConfigError(
                "ledger.decimals must be at most 18".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.ledger.network, Network::Testnet);
        assert_eq!(config.ledger.decimals, 6);
        assert_eq!(config.retry.retry_limit, 3);
        assert!(matches!(
            config.ledger.signing_endpoint(),
            Err(PayoutError::ConfigError(_))
        ));
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [ledger]
            network = "devnet"
            endpoint = "http://localhost:5005"

            [retry]
            retry_limit = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.ledger.network, Network::Devnet);
        assert_eq!(config.ledger.signing_endpoint().unwrap(), "http://localhost:5005");
        assert_eq!(config.retry.retry_limit, 5);
        assert_eq!(config.retry.backoff_ms, 1000);
    }

    #[test]
    fn test_shrinking_backoff_is_rejected() {
        let result = Config::parse(
            r#"
            [retry]
            backoff_factor = 0
            "#,
        );
        assert!(matches!(result, Err(PayoutError::ConfigError(_))));

        let result = Config::parse(
            r#"
            [retry]
            backoff_ms = 500
            max_backoff_ms = 100
            "#,
        );
        assert!(matches!(result, Err(PayoutError::ConfigError(_))));
    }

    #[test]
    fn test_public_servers_never_receive_the_seed() {
        for network in Network::ALL {
            let ledger = LedgerConfig {
                network,
                endpoint: Some(network.public_endpoint().to_string()),
                ..LedgerConfig::default()
            };
            assert!(matches!(
                ledger.signing_endpoint(),
                Err(PayoutError::ConfigError(m)) if m.contains("public server")
            ));
        }

        assert!(Network::is_public_endpoint("https://s1.ripple.com:51234"));
        assert!(!Network::is_public_endpoint("https://rippled.internal:51234/"));
    }

    #[test]
    fn test_unknown_network_is_rejected() {
        let result = Config::parse(
            r#"
            [ledger]
            network = "moonnet"
            "#,
        );
        assert!(matches!(result, Err(PayoutError::ConfigFileError(_))));
    }
}
