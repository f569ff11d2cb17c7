//! # Wallet Connection Coordinator
//!
//! Owns the single [`ConnectionState`] and drives it from user intent (`select_wallet`,
//! `connect`, `disconnect`) and adapter events (`connect`, `disconnect`, `error`,
//! `readyStateChange`).
//!
//! ## State Flow
//!
//! ```text
//! Idle --select--> Selected --connect()--> Connecting --ok--> Connected
//!  ^                  ^                        |                  |
//!  |                  +------ connect failed --+        disconnect()
//!  +-------------------------- Disconnecting <--------------------+
//! ```
//!
//! - The selection lives in a [`PersistedCell`]; every write (and the value read at startup)
//!   is reconciled into state by snapshotting the matching adapter.
//! - Listeners for the selected adapter are re-pointed synchronously on every selection
//!   change, old ones first, so a deselected adapter can never touch state.
//! - When the selected adapter changes and the previous one is still connected, it is
//!   disconnected in the background.
//! - `connect` and `disconnect` sample state once at call time; a call that arrives while the
//!   same transition is in flight is a silent no-op.
//! - While `unloading` is set, adapter `disconnect` events and every error are dropped.
//!
//! Subscribers observe state through [`WalletCoordinator::subscribe`], a `tokio::sync::watch`
//! receiver. Operations that change nothing do not notify. A reported error always does,
//! even when it equals the one already recorded.

mod state;

pub use state::{AnchorWallet, ConnectionState, Wallet};

use crate::adapter::{
    same_adapter, AdapterEvent, AdapterEventKind, SendTransactionOptions, WalletAdapter, WalletName,
    WalletReadyState, WalletTransaction,
};
use crate::connection::RpcConnection;
use crate::events::{event_stream, switch_on_presence, SubscriptionManager};
use crate::opener::{BrowserUrlOpener, UrlOpener};
use crate::signer::{
    self, ConnectedCheck, ErrorSink, SignAllTransactionsFn, SignMessageFn, SignTransactionFn,
};
use crate::storage::{KeyValueStore, PersistedCell};
use futures::channel::mpsc;
use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use lib_core::{Result, WalletConfig, WalletError};
use parking_lot::Mutex;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Handle to the coordinator. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct WalletCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<ConnectionState>,
    selection: PersistedCell<WalletName>,
    /// Connect/disconnect/error listeners of the selected adapter
    adapter_listeners: Mutex<SubscriptionManager>,
    /// Ready-state listeners of every registered adapter
    ready_listeners: Mutex<SubscriptionManager>,
    url_opener: Arc<dyn UrlOpener>,
    /// Serializes selection reconciliation, from snapshot through listener retarget to the
    /// state write
    reconcile_lock: Mutex<()>,
}

/// Outcome of the one-shot `connect` precondition check.
enum ConnectGate {
    Skip,
    NotSelected,
    NotReady(Arc<dyn WalletAdapter>),
    Proceed(Arc<dyn WalletAdapter>),
}

enum DisconnectGate {
    Skip,
    ClearSelection,
    Proceed(Arc<dyn WalletAdapter>),
}

impl WalletCoordinator {
    /// Build a coordinator over `adapters`, persisting the selection in `store`.
    ///
    /// A selection persisted by an earlier session is restored immediately and, with
    /// `auto_connect`, connected as soon as the wallet is ready.
    pub fn new(
        config: &WalletConfig,
        adapters: Vec<Arc<dyn WalletAdapter>>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_url_opener(config, adapters, store, Arc::new(BrowserUrlOpener))
    }

    pub fn with_url_opener(
        config: &WalletConfig,
        adapters: Vec<Arc<dyn WalletAdapter>>,
        store: Arc<dyn KeyValueStore>,
        url_opener: Arc<dyn UrlOpener>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::new(config.auto_connect));
        let inner = Arc::new(Inner {
            state,
            selection: PersistedCell::new(config.local_storage_key.clone(), store),
            adapter_listeners: Mutex::new(SubscriptionManager::new()),
            ready_listeners: Mutex::new(SubscriptionManager::new()),
            url_opener,
            reconcile_lock: Mutex::new(()),
        });

        info!(
            adapters = adapters.len(),
            auto_connect = config.auto_connect,
            storage_key = %config.local_storage_key,
            "Wallet coordinator starting"
        );
        inner.install_adapters(adapters);

        // replays the persisted value, so the restored selection is reconciled right here
        let weak: Weak<Inner> = Arc::downgrade(&inner);
        inner.selection.subscribe(move |_: Option<&WalletName>| {
            if let Some(inner) = weak.upgrade() {
                inner.reconcile();
            }
        });

        Self { inner }
    }

    // ----- intent -----

    /// Select a wallet by name, or clear the selection with `None`.
    ///
    /// Unknown names are persisted but resolve to the idle state until an adapter with that
    /// name is registered.
    pub fn select_wallet(&self, name: Option<WalletName>) {
        debug!(wallet = ?name, "Selecting wallet");
        self.inner.selection.set(name);
    }

    /// Connect the selected wallet.
    ///
    /// No-op while connecting, disconnecting or already connected. Failures are recorded in
    /// [`ConnectionState::error`] and returned; a failed adapter connect also clears the
    /// selection.
    pub async fn connect(&self) -> Result<()> {
        match self.inner.begin_connect() {
            Ok(Some(adapter)) => self.inner.finish_connect(adapter).await,
            Ok(None) => Ok(()),
            Err(error) => Err(error),
        }
    }

    /// Disconnect the selected wallet and clear the selection.
    pub async fn disconnect(&self) -> Result<()> {
        let mut gate = DisconnectGate::Skip;
        self.inner.state.send_if_modified(|state| {
            if state.disconnecting || state.connecting {
                return false;
            }
            match state.adapter() {
                None => {
                    gate = DisconnectGate::ClearSelection;
                    false
                }
                Some(adapter) => {
                    state.disconnecting = true;
                    gate = DisconnectGate::Proceed(adapter);
                    true
                }
            }
        });

        match gate {
            DisconnectGate::Skip => Ok(()),
            DisconnectGate::ClearSelection => {
                self.inner.selection.set(None);
                Ok(())
            }
            DisconnectGate::Proceed(adapter) => self.inner.finish_disconnect(adapter).await,
        }
    }

    /// Sign and submit `transaction` through the selected, connected wallet.
    ///
    /// Failures are recorded and returned. Unlike `connect`, a failure keeps the selection.
    pub async fn send_transaction(
        &self,
        transaction: impl Into<WalletTransaction>,
        connection: &RpcConnection,
        options: Option<SendTransactionOptions>,
    ) -> Result<Signature> {
        let (adapter, connected) = self.selected();
        let adapter = match adapter {
            Some(adapter) => adapter,
            None => return Err(self.inner.report(WalletError::NotSelected)),
        };
        if !connected {
            return Err(self.inner.report(WalletError::NotConnected));
        }

        match adapter
            .send_transaction(transaction.into(), connection, options.unwrap_or_default())
            .await
        {
            Ok(signature) => {
                debug!(wallet = %adapter.name(), %signature, "Transaction sent");
                Ok(signature)
            }
            Err(error) => Err(self.inner.report(error)),
        }
    }

    /// Transaction signer of the selected wallet, or `None` if nothing is selected or the
    /// wallet cannot sign transactions.
    ///
    /// The returned function checks the connection on every call, so one kept past a
    /// disconnect or a wallet switch fails with [`WalletError::NotConnected`].
    pub fn sign_transaction(&self) -> Option<SignTransactionFn> {
        let adapter = self.adapter()?;
        let capability = Arc::clone(&adapter).transaction_signer()?;
        Some(signer::sign_transaction(capability, self.connected_check(adapter), self.sink()))
    }

    pub fn sign_all_transactions(&self) -> Option<SignAllTransactionsFn> {
        let adapter = self.adapter()?;
        let capability = Arc::clone(&adapter).batch_signer()?;
        Some(signer::sign_all_transactions(
            capability,
            self.connected_check(adapter),
            self.sink(),
        ))
    }

    pub fn sign_message(&self) -> Option<SignMessageFn> {
        let adapter = self.adapter()?;
        let capability = Arc::clone(&adapter).message_signer()?;
        Some(signer::sign_message(capability, self.connected_check(adapter), self.sink()))
    }

    /// Replace the registered adapters.
    ///
    /// The wallet list is rebuilt, ready-state listeners are re-attached and the current
    /// selection is resolved against the new list.
    pub fn set_adapters(&self, adapters: Vec<Arc<dyn WalletAdapter>>) {
        info!(adapters = adapters.len(), "Registering wallet adapters");
        self.inner.reconcile_after(move |inner| inner.install_adapters(adapters));
    }

    /// Teardown signal. While set, adapter disconnects and errors leave state untouched.
    pub fn set_unloading(&self, unloading: bool) {
        if self.inner.update(|state| state.unloading = unloading) {
            debug!(unloading, "Unloading flag changed");
        }
    }

    // ----- observation -----

    /// Receiver that always holds the latest state snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    pub fn adapters(&self) -> Vec<Arc<dyn WalletAdapter>> {
        self.inner.state.borrow().adapters.clone()
    }

    pub fn wallets(&self) -> Vec<Wallet> {
        self.inner.state.borrow().wallets.clone()
    }

    pub fn wallet(&self) -> Option<Wallet> {
        self.inner.state.borrow().wallet.clone()
    }

    pub fn adapter(&self) -> Option<Arc<dyn WalletAdapter>> {
        self.inner.state.borrow().adapter()
    }

    pub fn public_key(&self) -> Option<Pubkey> {
        self.inner.state.borrow().public_key
    }

    pub fn connected(&self) -> bool {
        self.inner.state.borrow().connected
    }

    pub fn connecting(&self) -> bool {
        self.inner.state.borrow().connecting
    }

    pub fn disconnecting(&self) -> bool {
        self.inner.state.borrow().disconnecting
    }

    pub fn unloading(&self) -> bool {
        self.inner.state.borrow().unloading
    }

    pub fn ready_state(&self) -> Option<WalletReadyState> {
        self.inner.state.borrow().ready_state
    }

    pub fn auto_connect(&self) -> bool {
        self.inner.state.borrow().auto_connect
    }

    pub fn error(&self) -> Option<WalletError> {
        self.inner.state.borrow().error.clone()
    }

    /// Public key plus transaction signers, available only when all three are.
    pub fn anchor_wallet(&self) -> Option<AnchorWallet> {
        let public_key = self.public_key()?;
        let sign_transaction = self.sign_transaction()?;
        let sign_all_transactions = self.sign_all_transactions()?;
        Some(AnchorWallet::new(public_key, sign_transaction, sign_all_transactions))
    }

    /// Persisted selection, which may name a wallet that is not registered.
    pub fn persisted_selection(&self) -> Option<WalletName> {
        self.inner.selection.get()
    }

    /// Persisted selection values: the current one first, then every write.
    pub fn selection_changes(&self) -> mpsc::UnboundedReceiver<Option<WalletName>> {
        self.inner.selection.watch()
    }

    /// Selected adapter: the current one first, then each time a different instance (or
    /// none) becomes selected.
    pub fn adapter_changes(&self) -> BoxStream<'static, Option<Arc<dyn WalletAdapter>>> {
        let mut rx = self.subscribe();
        let first = rx.borrow_and_update().adapter();

        let changes = stream::unfold((rx, first.clone()), |(mut rx, mut last)| async move {
            loop {
                rx.changed().await.ok()?;
                let current = rx.borrow_and_update().adapter();
                if !same_selection(&last, &current) {
                    last = current.clone();
                    return Some((current, (rx, last)));
                }
            }
        });

        stream::once(future::ready(first)).chain(changes).boxed()
    }

    /// `kind` events of whichever adapter is selected, following the selection.
    ///
    /// Yields `None` whenever the selection is cleared.
    pub fn adapter_events(
        &self,
        kind: AdapterEventKind,
    ) -> impl Stream<Item = Option<AdapterEvent>> + Send + Unpin {
        switch_on_presence(self.adapter_changes(), move |adapter: &Arc<dyn WalletAdapter>| {
            event_stream(Arc::clone(adapter), kind)
        })
    }

    fn selected(&self) -> (Option<Arc<dyn WalletAdapter>>, bool) {
        let state = self.inner.state.borrow();
        (state.adapter(), state.connected)
    }

    fn sink(&self) -> Arc<dyn ErrorSink> {
        self.inner.clone()
    }

    /// True while `adapter` is still the selected wallet and connected.
    fn connected_check(&self, adapter: Arc<dyn WalletAdapter>) -> ConnectedCheck {
        let weak = Arc::downgrade(&self.inner);
        Arc::new(move || {
            weak.upgrade().is_some_and(|inner| {
                let state = inner.state.borrow();
                state.connected && state.is_selected(&adapter)
            })
        })
    }
}

impl fmt::Debug for WalletCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("WalletCoordinator")
            .field("wallet", &state.wallet_name())
            .field("connected", &state.connected)
            .field("connecting", &state.connecting)
            .field("disconnecting", &state.disconnecting)
            .finish()
    }
}

impl Inner {
    /// Apply `f` and notify subscribers only if the state actually changed.
    fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut ConnectionState),
    {
        self.state.send_if_modified(|state| {
            let before = state.clone();
            f(state);
            *state != before
        })
    }

    fn install_adapters(self: &Arc<Self>, adapters: Vec<Arc<dyn WalletAdapter>>) {
        let wallets: Vec<Wallet> = adapters.iter().cloned().map(Wallet::new).collect();

        {
            let mut listeners = self.ready_listeners.lock();
            listeners.clear();
            for adapter in &adapters {
                let weak = Arc::downgrade(self);
                let name = adapter.name().clone();
                listeners.attach(adapter, AdapterEventKind::ReadyStateChange, move |event| {
                    if let (Some(inner), AdapterEvent::ReadyStateChange(ready_state)) =
                        (weak.upgrade(), event)
                    {
                        inner.on_ready_state_change(&name, *ready_state);
                    }
                });
            }
        }

        self.update(|state| {
            state.adapters = adapters;
            state.wallets = wallets;
        });
    }

    /// Resolve the persisted selection against the registered wallets and make the result
    /// authoritative.
    fn reconcile(self: &Arc<Self>) {
        self.reconcile_after(|_| {});
    }

    /// Run `prepare`, then reconcile, both under the reconcile lock.
    ///
    /// Background disconnects and autoconnect start after the lock is released, since they
    /// may write the selection and re-enter here.
    fn reconcile_after<F>(self: &Arc<Self>, prepare: F)
    where
        F: FnOnce(&Arc<Self>),
    {
        let replaced = {
            let _guard = self.reconcile_lock.lock();
            prepare(self);
            self.reconcile_locked()
        };

        if let Some(previous) = replaced {
            info!(wallet = %previous.name(), "Disconnecting previously selected wallet");
            spawn_detached("disconnect_previous_adapter", disconnect_quietly(previous));
        }

        self.auto_connect_if_ready();
    }

    /// Returns the previously selected adapter when it was replaced while still connected.
    fn reconcile_locked(self: &Arc<Self>) -> Option<Arc<dyn WalletAdapter>> {
        // read under the lock, so the last reconcile always sees the last write
        let name = self.selection.get();
        let (found, previous) = {
            let state = self.state.borrow();
            let found = name.as_ref().and_then(|name| {
                state
                    .wallets
                    .iter()
                    .find(|wallet| wallet.name() == name)
                    .map(|wallet| Arc::clone(&wallet.adapter))
            });
            (found, state.adapter())
        };

        if name.is_some() && found.is_none() {
            debug!(wallet = ?name, "Selected wallet is not registered");
        }

        // adapter fields are read outside the state lock
        let snapshot = found.map(|adapter| {
            let connected = adapter.connected();
            let public_key = if connected { adapter.public_key() } else { None };
            let ready_state = adapter.ready_state();
            (adapter, ready_state, connected, public_key)
        });
        let current = snapshot.as_ref().map(|(adapter, ..)| Arc::clone(adapter));

        let changed = !same_selection(&previous, &current);
        if changed {
            self.retarget_listeners(current.as_ref());
        }

        self.update(|state| match snapshot {
            Some((adapter, ready_state, connected, public_key)) => {
                if let Some(entry) = state
                    .wallets
                    .iter_mut()
                    .find(|wallet| same_adapter(&wallet.adapter, &adapter))
                {
                    entry.ready_state = ready_state;
                }
                state.wallet = Some(Wallet {
                    adapter,
                    ready_state,
                });
                state.ready_state = Some(ready_state);
                state.connected = connected;
                state.public_key = public_key;
            }
            None => state.reset_selection(),
        });

        if changed {
            previous.filter(|adapter| adapter.connected())
        } else {
            None
        }
    }

    fn retarget_listeners(self: &Arc<Self>, adapter: Option<&Arc<dyn WalletAdapter>>) {
        let weak = Arc::downgrade(self);
        self.adapter_listeners.lock().retarget(adapter, |manager, adapter| {
            for kind in [
                AdapterEventKind::Connect,
                AdapterEventKind::Disconnect,
                AdapterEventKind::Error,
            ] {
                let weak = weak.clone();
                let source = Arc::downgrade(adapter);
                manager.attach(adapter, kind, move |event| {
                    if let (Some(inner), Some(source)) = (weak.upgrade(), source.upgrade()) {
                        inner.on_adapter_event(&source, event);
                    }
                });
            }
            debug!(wallet = %adapter.name(), "Attached adapter listeners");
        });
    }

    fn on_adapter_event(self: &Arc<Self>, source: &Arc<dyn WalletAdapter>, event: &AdapterEvent) {
        let (selected, unloading) = {
            let state = self.state.borrow();
            (state.is_selected(source), state.unloading)
        };
        if !selected {
            debug!(
                wallet = %source.name(),
                kind = ?event.kind(),
                "Ignoring event from stale adapter"
            );
            return;
        }

        match event {
            AdapterEvent::Connect(_) => {
                let connected = source.connected();
                let public_key = if connected { source.public_key() } else { None };
                self.update(|state| {
                    if state.is_selected(source) {
                        state.connected = connected;
                        state.public_key = public_key;
                    }
                });
            }
            AdapterEvent::Disconnect => {
                if unloading {
                    debug!(wallet = %source.name(), "Ignoring disconnect while unloading");
                    return;
                }
                info!(wallet = %source.name(), "Wallet disconnected");
                self.selection.set(None);
            }
            AdapterEvent::Error(error) => {
                self.report(error.clone());
            }
            AdapterEvent::ReadyStateChange(_) => {}
        }
    }

    fn on_ready_state_change(self: &Arc<Self>, name: &WalletName, ready_state: WalletReadyState) {
        let changed = self.update(|state| {
            if let Some(wallet) = state.wallets.iter_mut().find(|wallet| wallet.name() == name) {
                wallet.ready_state = ready_state;
            }
            if let Some(wallet) = state.wallet.as_mut().filter(|wallet| wallet.name() == name) {
                wallet.ready_state = ready_state;
                state.ready_state = Some(ready_state);
            }
        });
        if changed {
            debug!(wallet = %name, %ready_state, "Ready state changed");
            self.auto_connect_if_ready();
        }
    }

    /// One-shot precondition check. `Ok(None)` means there is nothing to do.
    fn begin_connect(&self) -> Result<Option<Arc<dyn WalletAdapter>>> {
        let mut gate = ConnectGate::Skip;
        self.state.send_if_modified(|state| {
            if state.connecting || state.disconnecting || state.connected {
                return false;
            }
            let Some(adapter) = state.adapter() else {
                gate = ConnectGate::NotSelected;
                return false;
            };
            if !state.ready_state.map(|r| r.is_ready()).unwrap_or(false) {
                gate = ConnectGate::NotReady(adapter);
                return false;
            }
            state.connecting = true;
            gate = ConnectGate::Proceed(adapter);
            true
        });

        match gate {
            ConnectGate::Skip => Ok(None),
            ConnectGate::NotSelected => Err(self.report(WalletError::NotSelected)),
            ConnectGate::NotReady(adapter) => {
                warn!(wallet = %adapter.name(), "Wallet is not ready, opening its page");
                self.selection.set(None);
                self.url_opener.open(adapter.url());
                Err(self.report(WalletError::NotReady))
            }
            ConnectGate::Proceed(adapter) => {
                info!(wallet = %adapter.name(), "Connecting wallet");
                Ok(Some(adapter))
            }
        }
    }

    /// Await the adapter connect and fold the outcome into state.
    ///
    /// When the selection moved while connecting, the flags reset here may make the newly
    /// selected wallet eligible for autoconnect, so that is re-checked. A connect that
    /// succeeded for a wallet no longer selected is undone in the background.
    async fn finish_connect(self: &Arc<Self>, adapter: Arc<dyn WalletAdapter>) -> Result<()> {
        let result = adapter.connect().await;

        let connected = result.is_ok() && adapter.connected();
        let public_key = if connected { adapter.public_key() } else { None };
        let mut still_selected = false;
        self.update(|state| {
            state.connecting = false;
            still_selected = state.is_selected(&adapter);
            if still_selected && result.is_ok() {
                state.connected = connected;
                state.public_key = public_key;
            }
        });

        let outcome = match result {
            Ok(()) if still_selected => {
                info!(wallet = %adapter.name(), "Wallet connected");
                Ok(())
            }
            Ok(()) => {
                info!(
                    wallet = %adapter.name(),
                    "Wallet deselected while connecting, disconnecting"
                );
                spawn_detached("disconnect_deselected_adapter", disconnect_quietly(adapter));
                Ok(())
            }
            Err(error) => {
                if still_selected {
                    self.selection.set(None);
                }
                Err(self.report(error))
            }
        };

        if !still_selected {
            self.auto_connect_if_ready();
        }
        outcome
    }

    async fn finish_disconnect(self: &Arc<Self>, adapter: Arc<dyn WalletAdapter>) -> Result<()> {
        let result = adapter.disconnect().await;

        let mut still_selected = false;
        self.update(|state| {
            state.disconnecting = false;
            still_selected = state.is_selected(&adapter);
        });
        if still_selected {
            self.selection.set(None);
        } else {
            // a wallet selected mid-disconnect was held back by the flag just cleared
            self.auto_connect_if_ready();
        }

        match result {
            Ok(()) => {
                info!(wallet = %adapter.name(), "Wallet disconnect complete");
                Ok(())
            }
            Err(error) => Err(self.report(error)),
        }
    }

    /// Start a background connect when the selected wallet is ready and idle.
    ///
    /// Failures are recorded by `finish_connect`; nothing awaits the attempt.
    fn auto_connect_if_ready(self: &Arc<Self>) {
        let eligible = {
            let state = self.state.borrow();
            state.auto_connect
                && state.wallet.is_some()
                && state.ready_state.map(|r| r.is_ready()).unwrap_or(false)
                && !state.connecting
                && !state.connected
                && !state.disconnecting
        };
        if !eligible {
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            warn!("No tokio runtime available, skipping wallet autoconnect");
            return;
        };

        if let Ok(Some(adapter)) = self.begin_connect() {
            let inner = Arc::clone(self);
            handle.spawn(async move {
                if let Err(e) = inner.finish_connect(adapter).await {
                    debug!(error = %e, "Autoconnect failed");
                }
            });
        }
    }
}

impl ErrorSink for Inner {
    /// Record `error` and notify subscribers, even when it equals the previous one.
    fn report(&self, error: WalletError) -> WalletError {
        let mut suppressed = false;
        self.state.send_if_modified(|state| {
            if state.unloading {
                suppressed = true;
                return false;
            }
            state.error = Some(error.clone());
            true
        });

        if suppressed {
            debug!(error = %error, "Dropping wallet error while unloading");
        } else {
            warn!(error = %error, "Wallet error");
        }
        error
    }
}

fn same_selection(a: &Option<Arc<dyn WalletAdapter>>, b: &Option<Arc<dyn WalletAdapter>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_adapter(a, b),
        (None, None) => true,
        _ => false,
    }
}

async fn disconnect_quietly(adapter: Arc<dyn WalletAdapter>) {
    if let Err(e) = adapter.disconnect().await {
        warn!(wallet = %adapter.name(), error = %e, "Wallet failed to disconnect");
    }
}

/// Run `future` on the ambient runtime, or log and drop it when there is none.
fn spawn_detached<F>(task: &'static str, future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            debug!(task, "Task spawned");
            handle.spawn(future);
        }
        Err(_) => warn!(task, "No tokio runtime available, task skipped"),
    }
}
