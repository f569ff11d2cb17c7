//! # Adapter Event Bridge
//!
//! Lifts an adapter's `on`/`off` listener interface into two shapes the rest of the crate
//! consumes:
//!
//! - **Callbacks with RAII detach**: [`listen`] attaches exactly one listener and returns a
//!   [`ListenerGuard`] that detaches it on drop.
//! - **Streams**: [`event_stream`] is a lazy [`futures::Stream`] that attaches its own
//!   listener on first poll and detaches when dropped. Each stream owns its listener; nothing
//!   is shared between subscribers.
//!
//! On top of those, [`SubscriptionManager`] keeps an arena of `{adapter name -> guards}` so
//! the coordinator can re-point listeners at a new adapter deterministically, and
//! [`switch_on_presence`] does the same for streams.
//!
//! [`EventEmitter`] is the other side of the contract: a listener table adapter
//! implementations embed to satisfy `on`/`off` and to `emit` events.

use crate::adapter::{
    AdapterEvent, AdapterEventKind, EventHandler, ListenerId, WalletAdapter, WalletName,
};
use futures::channel::mpsc;
use futures::stream::{Stream, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::debug;

/// Listener table for adapter implementations.
#[derive(Default)]
pub struct EventEmitter {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<AdapterEventKind, Vec<(ListenerId, EventHandler)>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, kind: AdapterEventKind, handler: EventHandler) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().entry(kind).or_default().push((id, handler));
        id
    }

    pub fn off(&self, kind: AdapterEventKind, id: ListenerId) {
        if let Some(handlers) = self.listeners.lock().get_mut(&kind) {
            handlers.retain(|(listener, _)| *listener != id);
        }
    }

    /// Invoke every listener registered for the event's kind.
    ///
    /// Listeners are snapshotted first, so a handler may register or remove listeners
    /// (including itself) without deadlocking.
    pub fn emit(&self, event: AdapterEvent) {
        let handlers: Vec<EventHandler> = self
            .listeners
            .lock()
            .get(&event.kind())
            .map(|handlers| handlers.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        for handler in handlers {
            handler(&event);
        }
    }

    pub fn listener_count(&self, kind: AdapterEventKind) -> usize {
        self.listeners.lock().get(&kind).map(Vec::len).unwrap_or(0)
    }
}

/// One attached listener. Dropping the guard detaches it from the adapter.
pub struct ListenerGuard {
    adapter: Arc<dyn WalletAdapter>,
    kind: AdapterEventKind,
    id: ListenerId,
}

impl ListenerGuard {
    pub fn adapter(&self) -> &Arc<dyn WalletAdapter> {
        &self.adapter
    }

    pub fn kind(&self) -> AdapterEventKind {
        self.kind
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.adapter.off(self.kind, self.id);
    }
}

/// Attach `handler` to `adapter` for events of `kind`.
pub fn listen<F>(
    adapter: &Arc<dyn WalletAdapter>,
    kind: AdapterEventKind,
    handler: F,
) -> ListenerGuard
where
    F: Fn(&AdapterEvent) + Send + Sync + 'static,
{
    let id = adapter.on(kind, Arc::new(handler));
    ListenerGuard {
        adapter: Arc::clone(adapter),
        kind,
        id,
    }
}

/// Lazy stream of one adapter's events of one kind.
///
/// Never ends on its own; stop it by dropping it.
pub struct AdapterEventStream {
    adapter: Arc<dyn WalletAdapter>,
    kind: AdapterEventKind,
    attached: Option<(mpsc::UnboundedReceiver<AdapterEvent>, ListenerGuard)>,
}

impl AdapterEventStream {
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }
}

impl Stream for AdapterEventStream {
    type Item = AdapterEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.attached.is_none() {
            let (tx, rx) = mpsc::unbounded();
            let guard = listen(&this.adapter, this.kind, move |event| {
                let _ = tx.unbounded_send(event.clone());
            });
            debug!(
                wallet = %this.adapter.name(),
                kind = ?this.kind,
                "Attached event stream listener"
            );
            this.attached = Some((rx, guard));
        }

        match this.attached.as_mut() {
            Some((rx, _)) => rx.poll_next_unpin(cx),
            None => Poll::Pending,
        }
    }
}

/// Stream the adapter's `kind` events. The listener is attached on first poll.
pub fn event_stream(adapter: Arc<dyn WalletAdapter>, kind: AdapterEventKind) -> AdapterEventStream {
    AdapterEventStream {
        adapter,
        kind,
        attached: None,
    }
}

/// Arena of active listeners keyed by adapter name.
#[derive(Default)]
pub struct SubscriptionManager {
    arena: HashMap<WalletName, Vec<ListenerGuard>>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener and file its guard under the adapter's name.
    pub fn attach<F>(
        &mut self,
        adapter: &Arc<dyn WalletAdapter>,
        kind: AdapterEventKind,
        handler: F,
    ) where
        F: Fn(&AdapterEvent) + Send + Sync + 'static,
    {
        let guard = listen(adapter, kind, handler);
        self.arena.entry(adapter.name().clone()).or_default().push(guard);
    }

    /// Detach every listener held for `name`.
    pub fn detach(&mut self, name: &WalletName) {
        if let Some(guards) = self.arena.remove(name) {
            debug!(wallet = %name, listeners = guards.len(), "Detached adapter listeners");
        }
    }

    /// Detach everything.
    pub fn clear(&mut self) {
        self.arena.clear();
    }

    /// Tear down all current listeners, then let `attach` wire up the new adapter.
    ///
    /// With `None` the arena is simply left empty.
    pub fn retarget<F>(&mut self, adapter: Option<&Arc<dyn WalletAdapter>>, attach: F)
    where
        F: FnOnce(&mut Self, &Arc<dyn WalletAdapter>),
    {
        self.clear();
        if let Some(adapter) = adapter {
            attach(self, adapter);
        }
    }

    pub fn is_attached(&self, name: &WalletName) -> bool {
        self.arena.get(name).map(|g| !g.is_empty()).unwrap_or(false)
    }

    /// Total number of live listeners.
    pub fn len(&self) -> usize {
        self.arena.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stream combinator that re-targets a projection whenever the upstream adapter changes.
///
/// For each `Some(adapter)` from upstream the previous inner stream is dropped (detaching
/// its listeners) and `project(adapter)` becomes the new inner stream; its items are
/// emitted as `Some(item)`. For `None` the inner stream is dropped and `None` is emitted.
pub fn switch_on_presence<U, F, S>(upstream: U, project: F) -> SwitchOnPresence<U, F, S>
where
    U: Stream<Item = Option<Arc<dyn WalletAdapter>>> + Unpin,
    F: FnMut(&Arc<dyn WalletAdapter>) -> S,
    S: Stream + Unpin,
{
    SwitchOnPresence {
        upstream,
        project,
        inner: None,
        upstream_done: false,
    }
}

pub struct SwitchOnPresence<U, F, S> {
    upstream: U,
    project: F,
    inner: Option<S>,
    upstream_done: bool,
}

impl<U, F, S> Stream for SwitchOnPresence<U, F, S>
where
    U: Stream<Item = Option<Arc<dyn WalletAdapter>>> + Unpin,
    F: FnMut(&Arc<dyn WalletAdapter>) -> S + Unpin,
    S: Stream + Unpin,
{
    type Item = Option<S::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        while !this.upstream_done {
            match this.upstream.poll_next_unpin(cx) {
                Poll::Ready(Some(Some(adapter))) => {
                    this.inner = None;
                    this.inner = Some((this.project)(&adapter));
                }
                Poll::Ready(Some(None)) => {
                    this.inner = None;
                    return Poll::Ready(Some(None));
                }
                Poll::Ready(None) => this.upstream_done = true,
                Poll::Pending => break,
            }
        }

        match this.inner.as_mut() {
            Some(inner) => match inner.poll_next_unpin(cx) {
                Poll::Ready(Some(item)) => Poll::Ready(Some(Some(item))),
                Poll::Ready(None) => {
                    this.inner = None;
                    if this.upstream_done {
                        Poll::Ready(None)
                    } else {
                        Poll::Pending
                    }
                }
                Poll::Pending => Poll::Pending,
            },
            None if this.upstream_done => Poll::Ready(None),
            None => Poll::Pending,
        }
    }
}
