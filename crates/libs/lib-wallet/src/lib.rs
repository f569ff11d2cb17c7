//! # Wallet Library
//!
//! Solana wallet connection coordinator for pluggable wallet adapters: persisted selection,
//! adapter event bridging, capability-gated signing and the connection state machine.

pub mod adapter;
pub mod connection;
pub mod coordinator;
pub mod events;
pub mod opener;
pub mod signer;
pub mod storage;

#[cfg(test)]
mod test_support;

// Re-export commonly used types from root for convenience
pub use adapter::{
    AdapterEvent, AdapterEventKind, SendTransactionOptions, WalletAdapter, WalletName,
    WalletReadyState, WalletTransaction,
};
pub use connection::{ConnectionStore, RpcConnection};
pub use coordinator::{AnchorWallet, ConnectionState, Wallet, WalletCoordinator};
pub use events::{EventEmitter, SubscriptionManager};
pub use opener::{BrowserUrlOpener, UrlOpener};
pub use storage::{FileStore, KeyValueStore, MemoryStore, PersistedCell};
