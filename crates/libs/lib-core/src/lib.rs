//! # Core Library
//!
//! Error types, configuration and logging shared by the wallet crates.

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{Commitment, ConnectionConfig, WalletConfig};
pub use error::{Result, StorageError, WalletError};
