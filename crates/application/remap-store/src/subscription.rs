//! Ordered delivery of store events to any number of observers.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::mpsc;

use crate::app_core::StoreEvent;

#[derive(Default)]
struct Registry {
    next_id: u64,
    senders: Vec<(u64, mpsc::UnboundedSender<StoreEvent>)>,
}

/// Fan-out side shared by the store and its save worker.
#[derive(Clone, Default)]
pub(crate) struct Broadcaster {
    registry: Arc<Mutex<Registry>>,
}

impl Broadcaster {
    pub(crate) fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.senders.push((id, tx));

        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Sends to every live subscriber. Subscribers whose receiver is gone are dropped.
    pub(crate) fn send(&self, event: StoreEvent) {
        self.send_after(event, || {});
    }

    /// Runs `before` and sends `event` without letting another send in between.
    pub(crate) fn send_after(&self, event: StoreEvent, before: impl FnOnce()) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        before();
        registry
            .senders
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .senders
            .len()
    }
}

/// Receiving end of `ProfileStore::subscribe`. Events arrive in publish order
/// without gaps. Dropping the subscription unregisters it.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<StoreEvent>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// `None` once the store is gone and every queued event was received.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        self.rx.recv().await
    }

    /// Must not be called from within an async runtime.
    pub fn blocking_recv(&mut self) -> Option<StoreEvent> {
        self.rx.blocking_recv()
    }

    pub fn try_recv(&mut self) -> Option<StoreEvent> {
        self.rx.try_recv().ok()
    }

    /// Everything queued right now.
    pub fn drain(&mut self) -> Vec<StoreEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.senders.retain(|(id, _)| *id != self.id);
        }
    }
}
