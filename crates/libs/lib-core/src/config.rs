//! # Wallet Configuration
//!
//! Configuration for the wallet coordinator and the RPC connection it hands to adapters.
//! Values come from environment variables (a `.env` file is honoured via `dotenvy`) and
//! are validated on load to fail fast if misconfigured.
//!
//! ## Environment Variables
//!
//! | Variable              | Default                          |
//! |-----------------------|----------------------------------|
//! | `WALLET_STORAGE_KEY`  | `walletName`                     |
//! | `WALLET_AUTO_CONNECT` | `false`                          |
//! | `SOLANA_RPC_URL`      | `https://api.devnet.solana.com`  |
//! | `SOLANA_COMMITMENT`   | `confirmed`                      |
//!
//! ```rust,no_run
//! use lib_core::config::{ConnectionConfig, WalletConfig};
//!
//! let wallet = WalletConfig::from_env().expect("invalid wallet config");
//! let connection = ConnectionConfig::from_env().expect("invalid connection config");
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Default key under which the selected wallet name is persisted.
pub const DEFAULT_STORAGE_KEY: &str = "walletName";

/// Default Solana RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Coordinator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Key used to persist the selected wallet name
    pub local_storage_key: String,

    /// Connect automatically whenever a ready wallet is selected
    pub auto_connect: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            local_storage_key: DEFAULT_STORAGE_KEY.to_string(),
            auto_connect: false,
        }
    }
}

impl WalletConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let local_storage_key =
            lookup("WALLET_STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        let auto_connect = match lookup("WALLET_AUTO_CONNECT") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| format!("WALLET_AUTO_CONNECT must be a boolean, got {:?}", raw))?,
            None => false,
        };

        let config = Self {
            local_storage_key,
            auto_connect,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.local_storage_key.trim().is_empty() {
            return Err("WALLET_STORAGE_KEY must not be empty".to_string());
        }
        Ok(())
    }
}

/// Commitment level requested from the RPC node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("Unknown commitment level: {}", other)),
        }
    }
}

/// RPC connection configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// RPC endpoint URL
    pub endpoint: String,

    /// Commitment used for reads and preflight checks
    pub commitment: Commitment,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RPC_URL.to_string(),
            commitment: Commitment::default(),
        }
    }
}

impl ConnectionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("SOLANA_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let commitment = match lookup("SOLANA_COMMITMENT") {
            Some(raw) => raw.parse()?,
            None => Commitment::default(),
        };

        let config = Self {
            endpoint,
            commitment,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("SOLANA_RPC_URL must not be empty".to_string());
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
