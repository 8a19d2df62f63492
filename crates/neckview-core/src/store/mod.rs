//! Live data store.
//!
//! Owns the canonical snapshot and the connectivity flag, and keeps both in
//! step with the server through a perpetual background loop:
//!
//! 1. refresh: fetch the full list (fire-and-forget)
//! 2. stream: open the push channel and wait until it dies; each `update`
//!    notification triggers another refresh
//! 3. back off, then start over
//!
//! Refreshes and channel opens both go through a [`SingleFlight`], so a burst
//! of notifications never stacks more than one pending plus one queued fetch.
//!
//! The store is an explicitly constructed service: build it with
//! [`LiveStore::new`], attach subscribers, then [`LiveStore::start`] the loop and
//! keep the returned [`StoreHandle`] for as long as it should run.

mod events;
mod sync;

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub use events::{Connectivity, StoreEvent, Subscription};
use events::Subscribers;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::model::{SessionRecord, Snapshot};
use crate::single_flight::{Flight, SingleFlight};
use crate::source::{SessionSource, SourceResult};

/// Pause between one sync cycle ending and the next one starting.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// What to publish when a snapshot fetch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchFailurePolicy {
    /// Publish an empty snapshot so stale rows are never shown as current.
    #[default]
    #[serde(rename = "clear")]
    Clear,
    /// Publish nothing and keep showing the last good snapshot.
    #[serde(rename = "keep")]
    KeepLast,
}

/// Tuning for the sync loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub backoff: Duration,
    pub on_fetch_error: FetchFailurePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            backoff: DEFAULT_BACKOFF,
            on_fetch_error: FetchFailurePolicy::default(),
        }
    }
}

/// Result of one refresh: the number of sessions published, or why the fetch failed.
pub type RefreshOutcome = SourceResult<usize>;

/// Result of one push channel lifetime. Always an error once the channel ends.
pub type ChannelOutcome = SourceResult<()>;

struct StoreState {
    snapshot: Snapshot,
    connectivity: Connectivity,
    subscribers: Subscribers,
}

/// State shared between the store handle, the loop, and in-flight operations.
struct StoreShared {
    state: Mutex<StoreState>,
    /// Cancellation for the current sync loop run; replaced on every `start`.
    run: Mutex<CancellationToken>,
}

impl StoreShared {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_token(&self) -> CancellationToken {
        self.run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs the token for a new run and returns the previous one.
    fn replace_run_token(&self, token: CancellationToken) -> CancellationToken {
        let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
        mem::replace(&mut *run, token)
    }

    /// Updates canonical state and notifies every subscriber before returning.
    fn dispatch(&self, event: StoreEvent) {
        let mut state = self.lock();
        match &event {
            StoreEvent::Update(snapshot) => state.snapshot = Arc::clone(snapshot),
            StoreEvent::Active => {
                info!("event channel live");
                state.connectivity = Connectivity::Active;
            }
            StoreEvent::Inactive => {
                info!("event channel down");
                state.connectivity = Connectivity::Inactive;
            }
        }
        state.subscribers.dispatch(&event);
    }

    fn publish(&self, records: Vec<SessionRecord>) {
        self.dispatch(StoreEvent::Update(Snapshot::from(records)));
    }
}

/// Live session store. Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct LiveStore {
    shared: Arc<StoreShared>,
    refresh: SingleFlight<RefreshOutcome>,
    channel: SingleFlight<ChannelOutcome>,
    options: SyncOptions,
}

impl LiveStore {
    pub fn new(source: Arc<dyn SessionSource>, options: SyncOptions) -> Self {
        let shared = Arc::new(StoreShared {
            state: Mutex::new(StoreState {
                snapshot: Snapshot::from(Vec::new()),
                connectivity: Connectivity::Unknown,
                subscribers: Subscribers::default(),
            }),
            run: Mutex::new(CancellationToken::new()),
        });
        let refresh = sync::refresh_flight(
            Arc::clone(&source),
            Arc::clone(&shared),
            options.on_fetch_error,
        );
        let channel = sync::channel_flight(source, Arc::clone(&shared), refresh.clone());
        Self {
            shared,
            refresh,
            channel,
            options,
        }
    }

    /// Attaches a subscriber. It only sees events dispatched from now on.
    pub fn subscribe(&self) -> Subscription {
        self.shared.lock().subscribers.subscribe()
    }

    /// Current canonical snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.shared.lock().snapshot)
    }

    pub fn connectivity(&self) -> Connectivity {
        self.shared.lock().connectivity
    }

    /// Requests a snapshot refresh, coalesced with any fetch already in flight.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn refresh(&self) -> Flight<RefreshOutcome> {
        self.refresh.trigger()
    }

    /// Starts the sync loop.
    ///
    /// The loop runs until [`StoreHandle::shutdown`] is called or the handle is dropped.
    /// Only one loop runs at a time: starting again stops the previous run, and
    /// a store can be started again after it was shut down.
    pub fn start(&self) -> StoreHandle {
        let cancel = CancellationToken::new();
        self.shared.replace_run_token(cancel.clone()).cancel();
        let store = self.clone();
        let run = cancel.clone();
        let task = tokio::spawn(async move { sync::run(store, run).await });
        StoreHandle {
            cancel,
            task: Some(task),
        }
    }

    #[cfg(test)]
    fn refresh_executions(&self) -> u64 {
        self.refresh.executions()
    }
}

/// Keeps the sync loop alive. Dropping it stops the loop.
pub struct StoreHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl StoreHandle {
    /// Stops the sync loop and closes any open push channel.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests;
