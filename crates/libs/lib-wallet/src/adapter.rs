//! # Wallet Adapter Boundary
//!
//! The contract every pluggable wallet connector implements. The coordinator never looks
//! inside an adapter; it only needs:
//!
//! - identity: a unique [`WalletName`]
//! - status: [`WalletReadyState`], a connected flag and an optional public key
//! - lifecycle: async `connect` / `disconnect`
//! - events: `on` / `off` listener registration for [`AdapterEventKind`]
//! - optional signing capabilities, each a separate trait
//!
//! ## Capabilities
//!
//! Signing support differs per wallet, so each signing shape is its own trait
//! ([`TransactionSigner`], [`BatchTransactionSigner`], [`MessageSigner`]). An adapter
//! advertises a capability by overriding the matching accessor:
//!
//! ```rust,ignore
//! impl WalletAdapter for PhantomAdapter {
//!     // ...
//!     fn message_signer(self: Arc<Self>) -> Option<Arc<dyn MessageSigner>> {
//!         Some(self)
//!     }
//! }
//! ```
//!
//! Callers test for the capability at the call site; absence means "unsupported", never an
//! error.

use crate::connection::RpcConnection;
use async_trait::async_trait;
use lib_core::{Commitment, WalletError};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use std::fmt;
use std::sync::Arc;

/// Unique wallet identity, also the value persisted as the user's selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletName(String);

impl WalletName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for WalletName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Whether a wallet can be used in the current environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletReadyState {
    /// Detected and usable right away (e.g., a browser extension is installed)
    Installed,
    /// Not detected in this environment
    NotDetected,
    /// Usable after loading (e.g., a hosted or SDK-backed wallet)
    Loadable,
    /// Cannot work in this environment at all
    Unsupported,
}

impl WalletReadyState {
    /// True for states in which `connect` may be attempted.
    pub fn is_ready(&self) -> bool {
        matches!(self, WalletReadyState::Installed | WalletReadyState::Loadable)
    }
}

impl fmt::Display for WalletReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WalletReadyState::Installed => "Installed",
            WalletReadyState::NotDetected => "NotDetected",
            WalletReadyState::Loadable => "Loadable",
            WalletReadyState::Unsupported => "Unsupported",
        };
        f.write_str(label)
    }
}

/// Names of the lifecycle events an adapter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterEventKind {
    Connect,
    Disconnect,
    Error,
    ReadyStateChange,
}

/// Payload of an adapter event.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterEvent {
    /// Session opened, carrying the account's public key
    Connect(Pubkey),
    /// Session closed, by the user or the wallet
    Disconnect,
    /// Adapter-side failure
    Error(WalletError),
    /// The adapter's ready state changed
    ReadyStateChange(WalletReadyState),
}

impl AdapterEvent {
    pub fn kind(&self) -> AdapterEventKind {
        match self {
            AdapterEvent::Connect(_) => AdapterEventKind::Connect,
            AdapterEvent::Disconnect => AdapterEventKind::Disconnect,
            AdapterEvent::Error(_) => AdapterEventKind::Error,
            AdapterEvent::ReadyStateChange(_) => AdapterEventKind::ReadyStateChange,
        }
    }
}

/// Handle identifying one registered listener.
pub type ListenerId = u64;

/// Listener callback attached to an adapter.
pub type EventHandler = Arc<dyn Fn(&AdapterEvent) + Send + Sync>;

/// A transaction handed to a wallet, legacy or versioned.
#[derive(Debug, Clone, PartialEq)]
pub enum WalletTransaction {
    Legacy(Transaction),
    Versioned(VersionedTransaction),
}

impl From<Transaction> for WalletTransaction {
    fn from(tx: Transaction) -> Self {
        WalletTransaction::Legacy(tx)
    }
}

impl From<VersionedTransaction> for WalletTransaction {
    fn from(tx: VersionedTransaction) -> Self {
        WalletTransaction::Versioned(tx)
    }
}

/// Submission options forwarded to the adapter's `send_transaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendTransactionOptions {
    /// Skip the preflight simulation
    pub skip_preflight: bool,
    /// Commitment used for the preflight simulation
    pub preflight_commitment: Option<Commitment>,
    /// Maximum number of times the node retries the submission
    pub max_retries: Option<usize>,
    /// Minimum slot the node must have reached to accept the request
    pub min_context_slot: Option<u64>,
}

/// Capability: sign a single transaction.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign_transaction(
        &self,
        transaction: WalletTransaction,
    ) -> Result<WalletTransaction, WalletError>;
}

/// Capability: sign a batch of transactions in one approval.
#[async_trait]
pub trait BatchTransactionSigner: Send + Sync {
    async fn sign_all_transactions(
        &self,
        transactions: Vec<WalletTransaction>,
    ) -> Result<Vec<WalletTransaction>, WalletError>;
}

/// Capability: sign an arbitrary message, returning the signature bytes.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    async fn sign_message(&self, message: Vec<u8>) -> Result<Vec<u8>, WalletError>;
}

/// A pluggable wallet connector.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Unique adapter name
    fn name(&self) -> &WalletName;

    /// Install or landing page, opened for the user when the wallet is not ready
    fn url(&self) -> &str;

    /// Icon (usually a data URI) for wallet pickers
    fn icon(&self) -> &str {
        ""
    }

    fn ready_state(&self) -> WalletReadyState;

    fn connected(&self) -> bool;

    fn public_key(&self) -> Option<Pubkey>;

    async fn connect(&self) -> Result<(), WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    /// Sign and submit a transaction through the given connection.
    async fn send_transaction(
        &self,
        transaction: WalletTransaction,
        connection: &RpcConnection,
        options: SendTransactionOptions,
    ) -> Result<Signature, WalletError>;

    /// Register a listener for `kind`.
    fn on(&self, kind: AdapterEventKind, handler: EventHandler) -> ListenerId;

    /// Remove a listener previously returned by [`WalletAdapter::on`].
    fn off(&self, kind: AdapterEventKind, id: ListenerId);

    fn transaction_signer(self: Arc<Self>) -> Option<Arc<dyn TransactionSigner>> {
        None
    }

    fn batch_signer(self: Arc<Self>) -> Option<Arc<dyn BatchTransactionSigner>> {
        None
    }

    fn message_signer(self: Arc<Self>) -> Option<Arc<dyn MessageSigner>> {
        None
    }
}

impl fmt::Debug for dyn WalletAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletAdapter")
            .field("name", self.name())
            .field("ready_state", &self.ready_state())
            .field("connected", &self.connected())
            .finish()
    }
}

/// Instance identity of two adapter handles (names are identity for lookup, this is
/// identity for listener ownership).
pub fn same_adapter(a: &Arc<dyn WalletAdapter>, b: &Arc<dyn WalletAdapter>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
