//! # Centralized Error Handling
//!
//! This module defines the error types shared by the wallet crates. It follows the
//! `thiserror` pattern for ergonomic error handling.
//!
//! ## Error Categories
//!
//! Errors are categorized by their source:
//!
//! 1. **Coordinator Guards** - raised before any adapter is touched
//!    - [`NotSelected`](WalletError::NotSelected): no wallet is selected
//!    - [`NotConnected`](WalletError::NotConnected): a wallet is selected but not connected
//!    - [`NotReady`](WalletError::NotReady): the selected wallet is not installed or loadable
//!
//! 2. **Adapter Errors** - surfaced by a wallet adapter, either through its `error` event or a
//!    rejected connect/disconnect/sign/send call
//!    - [`Connection`](WalletError::Connection), [`Disconnection`](WalletError::Disconnection)
//!    - [`SignTransaction`](WalletError::SignTransaction)
//!    - [`SignMessage`](WalletError::SignMessage)
//!    - [`SendTransaction`](WalletError::SendTransaction) and friends
//!
//! 3. **Storage Errors** - [`StorageError`], produced by key/value stores. These never reach
//!    callers of the coordinator; the selection cell logs them and carries on.
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{WalletError, Result};
//!
//! fn require_connected(connected: bool) -> Result<()> {
//!     if !connected {
//!         return Err(WalletError::NotConnected);
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Convenience type alias for `Result<T, WalletError>`.
pub type Result<T> = std::result::Result<T, WalletError>;

/// Wallet lifecycle error.
///
/// `Clone + PartialEq` so the last error can be held in observable state and compared
/// by subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// The operation needs a selected wallet and none is selected.
    #[error("Wallet not selected")]
    NotSelected,

    /// The operation needs an open connection and the selected wallet is not connected.
    #[error("Wallet not connected")]
    NotConnected,

    /// The selected wallet is neither installed nor loadable.
    #[error("Wallet not ready")]
    NotReady,

    /// The adapter failed to open a session.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The adapter failed to close its session.
    #[error("Disconnection error: {0}")]
    Disconnection(String),

    /// The wallet has no account to expose.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// The wallet returned a public key that could not be parsed.
    #[error("Invalid public key: {0}")]
    PublicKey(String),

    /// The wallet refused or failed to sign a transaction.
    #[error("Sign transaction error: {0}")]
    SignTransaction(String),

    /// The wallet refused or failed to sign a message.
    #[error("Sign message error: {0}")]
    SignMessage(String),

    /// The wallet failed to sign or submit a transaction.
    #[error("Send transaction error: {0}")]
    SendTransaction(String),

    /// The wallet's popup or window was closed by the user.
    #[error("Wallet window closed: {0}")]
    WindowClosed(String),

    /// The wallet did not answer in time.
    #[error("Wallet timed out: {0}")]
    Timeout(String),

    /// Any other adapter-defined failure.
    #[error("Adapter error: {0}")]
    Adapter(String),
}

impl WalletError {
    /// True for errors that originate inside an adapter rather than in a coordinator guard.
    pub fn is_adapter_error(&self) -> bool {
        !matches!(
            self,
            WalletError::NotSelected | WalletError::NotConnected | WalletError::NotReady
        )
    }
}

/// Failure of a key/value store backing the persisted wallet selection.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure reading or writing the backing file.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document is not valid JSON.
    #[error("Storage JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store cannot be used at all (e.g., no backing location).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
