//! Scriptable adapter and recorders shared by the unit tests.

use crate::adapter::{
    AdapterEvent, AdapterEventKind, BatchTransactionSigner, EventHandler, ListenerId, MessageSigner,
    SendTransactionOptions, TransactionSigner, WalletAdapter, WalletName, WalletReadyState,
    WalletTransaction,
};
use crate::connection::RpcConnection;
use crate::events::EventEmitter;
use crate::opener::UrlOpener;
use crate::signer::ErrorSink;
use async_trait::async_trait;
use lib_core::WalletError;
use parking_lot::Mutex;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::sync::Arc;
use tokio::sync::Notify;

/// Per-method call counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub connect: usize,
    pub disconnect: usize,
    pub send_transaction: usize,
    pub sign_transaction: usize,
    pub sign_all_transactions: usize,
    pub sign_message: usize,
}

#[derive(Debug, Clone, Copy)]
struct Capabilities {
    transaction: bool,
    batch: bool,
    message: bool,
}

#[derive(Default)]
struct Failures {
    connect: Option<WalletError>,
    disconnect: Option<WalletError>,
    signing: Option<WalletError>,
    send: Option<WalletError>,
}

pub struct MockAdapter {
    name: WalletName,
    url: String,
    key: Pubkey,
    ready_state: Mutex<WalletReadyState>,
    connected: Mutex<bool>,
    emitter: EventEmitter,
    calls: Mutex<Calls>,
    failures: Mutex<Failures>,
    capabilities: Mutex<Capabilities>,
    emit_errors: Mutex<bool>,
    connect_gate: Mutex<Option<Arc<Notify>>>,
    disconnect_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockAdapter {
    /// An installed adapter supporting every signing shape.
    pub fn new(name: &str) -> Arc<Self> {
        Self::with_ready_state(name, WalletReadyState::Installed)
    }

    pub fn with_ready_state(name: &str, ready_state: WalletReadyState) -> Arc<Self> {
        Arc::new(Self {
            name: WalletName::from(name),
            url: format!("https://{}.example", name.to_lowercase()),
            key: Pubkey::new_unique(),
            ready_state: Mutex::new(ready_state),
            connected: Mutex::new(false),
            emitter: EventEmitter::new(),
            calls: Mutex::new(Calls::default()),
            failures: Mutex::new(Failures::default()),
            capabilities: Mutex::new(Capabilities {
                transaction: true,
                batch: true,
                message: true,
            }),
            emit_errors: Mutex::new(true),
            connect_gate: Mutex::new(None),
            disconnect_gate: Mutex::new(None),
        })
    }

    /// Key reported once connected.
    pub fn key(&self) -> Pubkey {
        self.key
    }

    pub fn calls(&self) -> Calls {
        *self.calls.lock()
    }

    pub fn emit(&self, event: AdapterEvent) {
        self.emitter.emit(event);
    }

    pub fn listener_count(&self, kind: AdapterEventKind) -> usize {
        self.emitter.listener_count(kind)
    }

    /// Change the ready state and announce it.
    pub fn set_ready_state(&self, ready_state: WalletReadyState) {
        *self.ready_state.lock() = ready_state;
        self.emit(AdapterEvent::ReadyStateChange(ready_state));
    }

    /// Flip the connected flag without emitting, as if connected from outside.
    pub fn set_connected(&self, connected: bool) {
        *self.connected.lock() = connected;
    }

    pub fn set_capabilities(&self, transaction: bool, batch: bool, message: bool) {
        *self.capabilities.lock() = Capabilities {
            transaction,
            batch,
            message,
        };
    }

    /// Whether failures are also announced through an `Error` event.
    pub fn set_emit_errors(&self, emit: bool) {
        *self.emit_errors.lock() = emit;
    }

    pub fn fail_connect(&self, error: WalletError) {
        self.failures.lock().connect = Some(error);
    }

    pub fn fail_disconnect(&self, error: WalletError) {
        self.failures.lock().disconnect = Some(error);
    }

    pub fn fail_signing(&self, error: WalletError) {
        self.failures.lock().signing = Some(error);
    }

    pub fn fail_send(&self, error: WalletError) {
        self.failures.lock().send = Some(error);
    }

    /// Make `connect` wait until the returned gate is notified.
    pub fn hold_connect(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.connect_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Make `disconnect` wait until the returned gate is notified.
    pub fn hold_disconnect(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.disconnect_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    fn fail(&self, error: WalletError) -> Result<(), WalletError> {
        let emit = *self.emit_errors.lock();
        if emit {
            self.emit(AdapterEvent::Error(error.clone()));
        }
        Err(error)
    }
}

#[async_trait]
impl WalletAdapter for MockAdapter {
    fn name(&self) -> &WalletName {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn ready_state(&self) -> WalletReadyState {
        *self.ready_state.lock()
    }

    fn connected(&self) -> bool {
        *self.connected.lock()
    }

    fn public_key(&self) -> Option<Pubkey> {
        let connected = *self.connected.lock();
        connected.then_some(self.key)
    }

    async fn connect(&self) -> Result<(), WalletError> {
        self.calls.lock().connect += 1;

        let gate = self.connect_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let failure = self.failures.lock().connect.clone();
        if let Some(error) = failure {
            return self.fail(error);
        }
        *self.connected.lock() = true;
        self.emit(AdapterEvent::Connect(self.key));
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.calls.lock().disconnect += 1;

        let gate = self.disconnect_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let failure = self.failures.lock().disconnect.clone();
        if let Some(error) = failure {
            return self.fail(error);
        }
        *self.connected.lock() = false;
        self.emit(AdapterEvent::Disconnect);
        Ok(())
    }

    async fn send_transaction(
        &self,
        _transaction: WalletTransaction,
        _connection: &RpcConnection,
        _options: SendTransactionOptions,
    ) -> Result<Signature, WalletError> {
        self.calls.lock().send_transaction += 1;
        let failure = self.failures.lock().send.clone();
        match failure {
            Some(error) => Err(error),
            None => Ok(Signature::default()),
        }
    }

    fn on(&self, kind: AdapterEventKind, handler: EventHandler) -> ListenerId {
        self.emitter.on(kind, handler)
    }

    fn off(&self, kind: AdapterEventKind, id: ListenerId) {
        self.emitter.off(kind, id)
    }

    fn transaction_signer(self: Arc<Self>) -> Option<Arc<dyn TransactionSigner>> {
        let enabled = self.capabilities.lock().transaction;
        if enabled {
            Some(self)
        } else {
            None
        }
    }

    fn batch_signer(self: Arc<Self>) -> Option<Arc<dyn BatchTransactionSigner>> {
        let enabled = self.capabilities.lock().batch;
        if enabled {
            Some(self)
        } else {
            None
        }
    }

    fn message_signer(self: Arc<Self>) -> Option<Arc<dyn MessageSigner>> {
        let enabled = self.capabilities.lock().message;
        if enabled {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl TransactionSigner for MockAdapter {
    async fn sign_transaction(
        &self,
        transaction: WalletTransaction,
    ) -> Result<WalletTransaction, WalletError> {
        self.calls.lock().sign_transaction += 1;
        let failure = self.failures.lock().signing.clone();
        match failure {
            Some(error) => Err(error),
            None => Ok(transaction),
        }
    }
}

#[async_trait]
impl BatchTransactionSigner for MockAdapter {
    async fn sign_all_transactions(
        &self,
        transactions: Vec<WalletTransaction>,
    ) -> Result<Vec<WalletTransaction>, WalletError> {
        self.calls.lock().sign_all_transactions += 1;
        let failure = self.failures.lock().signing.clone();
        match failure {
            Some(error) => Err(error),
            None => Ok(transactions),
        }
    }
}

#[async_trait]
impl MessageSigner for MockAdapter {
    /// "Signs" by reversing the message.
    async fn sign_message(&self, mut message: Vec<u8>) -> Result<Vec<u8>, WalletError> {
        self.calls.lock().sign_message += 1;
        let failure = self.failures.lock().signing.clone();
        match failure {
            Some(error) => Err(error),
            None => {
                message.reverse();
                Ok(message)
            }
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    errors: Mutex<Vec<WalletError>>,
}

impl RecordingSink {
    pub fn errors(&self) -> Vec<WalletError> {
        self.errors.lock().clone()
    }
}

impl ErrorSink for RecordingSink {
    fn report(&self, error: WalletError) -> WalletError {
        self.errors.lock().push(error.clone());
        error
    }
}

#[derive(Default)]
pub struct RecordingOpener {
    urls: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) {
        self.urls.lock().push(url.to_string());
    }
}

/// Let spawned tasks run to their next suspension point.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
