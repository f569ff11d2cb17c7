//! Observable connection state.

use crate::adapter::{same_adapter, WalletAdapter, WalletName, WalletReadyState, WalletTransaction};
use crate::signer::{SignAllTransactionsFn, SignTransactionFn};
use lib_core::WalletError;
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::sync::Arc;

/// A registered adapter paired with its last reported ready state.
#[derive(Clone)]
pub struct Wallet {
    pub adapter: Arc<dyn WalletAdapter>,
    pub ready_state: WalletReadyState,
}

impl Wallet {
    pub fn new(adapter: Arc<dyn WalletAdapter>) -> Self {
        let ready_state = adapter.ready_state();
        Self {
            adapter,
            ready_state,
        }
    }

    pub fn name(&self) -> &WalletName {
        self.adapter.name()
    }
}

impl PartialEq for Wallet {
    fn eq(&self, other: &Self) -> bool {
        same_adapter(&self.adapter, &other.adapter) && self.ready_state == other.ready_state
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("name", self.name())
            .field("ready_state", &self.ready_state)
            .finish()
    }
}

/// Canonical coordinator state.
///
/// The selected adapter is only reachable through [`ConnectionState::wallet`], so a
/// selected adapter without its wallet (or the reverse) cannot be represented.
#[derive(Clone, Debug)]
pub struct ConnectionState {
    /// Registered adapters, in registration order
    pub adapters: Vec<Arc<dyn WalletAdapter>>,
    /// One wallet per registered adapter
    pub wallets: Vec<Wallet>,
    /// Current selection
    pub wallet: Option<Wallet>,
    pub connecting: bool,
    pub disconnecting: bool,
    /// Set once the host is tearing down; adapter noise is ignored from then on
    pub unloading: bool,
    pub connected: bool,
    pub public_key: Option<Pubkey>,
    /// Ready state of the selected adapter
    pub ready_state: Option<WalletReadyState>,
    pub auto_connect: bool,
    /// Last recorded error
    pub error: Option<WalletError>,
}

impl ConnectionState {
    pub fn new(auto_connect: bool) -> Self {
        Self {
            adapters: Vec::new(),
            wallets: Vec::new(),
            wallet: None,
            connecting: false,
            disconnecting: false,
            unloading: false,
            connected: false,
            public_key: None,
            ready_state: None,
            auto_connect,
            error: None,
        }
    }

    /// Adapter of the selected wallet.
    pub fn adapter(&self) -> Option<Arc<dyn WalletAdapter>> {
        self.wallet.as_ref().map(|w| Arc::clone(&w.adapter))
    }

    pub fn wallet_name(&self) -> Option<&WalletName> {
        self.wallet.as_ref().map(Wallet::name)
    }

    /// True when `adapter` is the selected instance.
    pub fn is_selected(&self, adapter: &Arc<dyn WalletAdapter>) -> bool {
        self.wallet
            .as_ref()
            .map(|w| same_adapter(&w.adapter, adapter))
            .unwrap_or(false)
    }

    /// Clear every selection-derived field.
    pub(crate) fn reset_selection(&mut self) {
        self.wallet = None;
        self.connected = false;
        self.public_key = None;
        self.ready_state = None;
    }
}

impl PartialEq for ConnectionState {
    fn eq(&self, other: &Self) -> bool {
        self.adapters.len() == other.adapters.len()
            && self
                .adapters
                .iter()
                .zip(&other.adapters)
                .all(|(a, b)| same_adapter(a, b))
            && self.wallets == other.wallets
            && self.wallet == other.wallet
            && self.connecting == other.connecting
            && self.disconnecting == other.disconnecting
            && self.unloading == other.unloading
            && self.connected == other.connected
            && self.public_key == other.public_key
            && self.ready_state == other.ready_state
            && self.auto_connect == other.auto_connect
            && self.error == other.error
    }
}

/// The connected account bundled with its transaction signers, for program clients that
/// need a full signing wallet.
#[derive(Clone)]
pub struct AnchorWallet {
    public_key: Pubkey,
    sign_transaction: SignTransactionFn,
    sign_all_transactions: SignAllTransactionsFn,
}

impl AnchorWallet {
    pub(crate) fn new(
        public_key: Pubkey,
        sign_transaction: SignTransactionFn,
        sign_all_transactions: SignAllTransactionsFn,
    ) -> Self {
        Self {
            public_key,
            sign_transaction,
            sign_all_transactions,
        }
    }

    pub fn public_key(&self) -> Pubkey {
        self.public_key
    }

    pub async fn sign_transaction(
        &self,
        transaction: WalletTransaction,
    ) -> Result<WalletTransaction, WalletError> {
        (self.sign_transaction)(transaction).await
    }

    pub async fn sign_all_transactions(
        &self,
        transactions: Vec<WalletTransaction>,
    ) -> Result<Vec<WalletTransaction>, WalletError> {
        (self.sign_all_transactions)(transactions).await
    }
}

impl fmt::Debug for AnchorWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorWallet")
            .field("public_key", &self.public_key)
            .finish()
    }
}
