//! Typed publish/subscribe for store events.

use tokio::sync::mpsc;

use crate::model::Snapshot;

/// Everything the store tells its subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A new full snapshot (empty after a failed fetch under the default policy).
    Update(Snapshot),
    /// The push channel confirmed it is live.
    Active,
    /// The push channel failed or closed.
    Inactive,
}

/// Push channel health as last reported by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// No channel attempt has concluded yet.
    #[default]
    Unknown,
    Active,
    Inactive,
}

/// Receiving end of a store subscription.
///
/// Sees every event dispatched after it was created, in dispatch order.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<StoreEvent>,
}

impl Subscription {
    /// Waits for the next event. Returns `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        self.rx.recv().await
    }

    /// Returns the next already-delivered event, if any.
    pub fn try_recv(&mut self) -> Option<StoreEvent> {
        self.rx.try_recv().ok()
    }
}

/// Subscriber list, notified in registration order.
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Vec<mpsc::UnboundedSender<StoreEvent>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.push(tx);
        Subscription { rx }
    }

    /// Delivers `event` to every live subscriber and forgets the closed ones.
    pub(crate) fn dispatch(&mut self, event: &StoreEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}
