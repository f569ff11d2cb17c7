//! # RPC Connection Handle
//!
//! The coordinator treats the RPC connection as opaque: it is built here from an endpoint
//! and a commitment, then passed straight through to the adapter's `send_transaction`.
//!
//! ```rust,no_run
//! use lib_core::ConnectionConfig;
//! use lib_wallet::connection::ConnectionStore;
//!
//! let store = ConnectionStore::new(ConnectionConfig::default());
//! store.set_endpoint("https://api.mainnet-beta.solana.com");
//! let connection = store.connection();
//! ```

use lib_core::{Commitment, ConnectionConfig};
use parking_lot::RwLock;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Shared handle to a Solana RPC endpoint.
#[derive(Clone)]
pub struct RpcConnection {
    endpoint: String,
    commitment: Commitment,
    client: Arc<RpcClient>,
}

impl RpcConnection {
    pub fn new(config: &ConnectionConfig) -> Self {
        let client = RpcClient::new_with_commitment(
            config.endpoint.clone(),
            commitment_config(config.commitment),
        );
        Self {
            endpoint: config.endpoint.clone(),
            commitment: config.commitment,
            client: Arc::new(client),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    /// Underlying nonblocking RPC client, for adapters that submit transactions themselves.
    pub fn client(&self) -> &Arc<RpcClient> {
        &self.client
    }
}

impl fmt::Debug for RpcConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcConnection")
            .field("endpoint", &self.endpoint)
            .field("commitment", &self.commitment)
            .finish()
    }
}

fn commitment_config(commitment: Commitment) -> CommitmentConfig {
    match commitment {
        Commitment::Processed => CommitmentConfig::processed(),
        Commitment::Confirmed => CommitmentConfig::confirmed(),
        Commitment::Finalized => CommitmentConfig::finalized(),
    }
}

/// Holds the connection configuration and the handle built from it.
pub struct ConnectionStore {
    config: RwLock<ConnectionConfig>,
    connection: RwLock<RpcConnection>,
}

impl ConnectionStore {
    pub fn new(config: ConnectionConfig) -> Self {
        let connection = RpcConnection::new(&config);
        Self {
            config: RwLock::new(config),
            connection: RwLock::new(connection),
        }
    }

    pub fn config(&self) -> ConnectionConfig {
        self.config.read().clone()
    }

    /// Current connection handle.
    pub fn connection(&self) -> RpcConnection {
        self.connection.read().clone()
    }

    /// Point the store at a new endpoint and rebuild the handle.
    pub fn set_endpoint(&self, endpoint: impl Into<String>) {
        let mut config = self.config.write();
        config.endpoint = endpoint.into();
        self.rebuild(&config);
    }

    /// Change the commitment and rebuild the handle.
    pub fn set_commitment(&self, commitment: Commitment) {
        let mut config = self.config.write();
        config.commitment = commitment;
        self.rebuild(&config);
    }

    fn rebuild(&self, config: &ConnectionConfig) {
        *self.connection.write() = RpcConnection::new(config);
        info!(
            endpoint = %config.endpoint,
            commitment = %config.commitment,
            "RPC connection rebuilt"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_uses_config() {
        let connection = RpcConnection::new(&ConnectionConfig::default());
        assert_eq!(connection.endpoint(), lib_core::config::DEFAULT_RPC_URL);
        assert_eq!(connection.commitment(), Commitment::Confirmed);
        assert_eq!(connection.client().url(), lib_core::config::DEFAULT_RPC_URL);
    }

    #[test]
    fn test_commitment_maps_to_client_config() {
        assert_eq!(commitment_config(Commitment::Processed), CommitmentConfig::processed());
        assert_eq!(commitment_config(Commitment::Confirmed), CommitmentConfig::confirmed());
        assert_eq!(commitment_config(Commitment::Finalized), CommitmentConfig::finalized());
    }

    #[tokio::test]
    async fn test_store_rebuilds_on_change() {
        let store = ConnectionStore::new(ConnectionConfig::default());
        let before = store.connection();

        store.set_endpoint("http://127.0.0.1:8899");
        store.set_commitment(Commitment::Finalized);

        let after = store.connection();
        assert_eq!(after.endpoint(), "http://127.0.0.1:8899");
        assert_eq!(after.commitment(), Commitment::Finalized);
        assert_eq!(after.client().commitment(), CommitmentConfig::finalized());
        assert_eq!(store.config().endpoint, "http://127.0.0.1:8899");
        assert!(!Arc::ptr_eq(before.client(), after.client()));
    }
}
