//! Coalescing invoker: at most one execution in flight plus one queued follow-up.
//!
//! Bursts of refresh requests (a push notification landing while a poll is in
//! flight, several notifications in a row, a manual refresh) collapse into the
//! pending execution and a single trailing execution that starts once the
//! pending one settles. Every caller gets a [`Flight`] it can await or drop.
//!
//! ```text
//!            trigger                 trigger                 trigger
//!   Idle ─────────────▶ Pending ─────────────▶ Queued ─────────────▶ Queued
//!    ▲                   │   ▲                   │                 (same follow-up)
//!    └──── settle ───────┘   └────── settle ─────┘
//!                                (follow-up becomes pending)
//! ```
//!
//! Executions run on their own Tokio tasks, so a dropped [`Flight`] never
//! stalls the state machine, and a panicking execution still settles its slot.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;

/// Handle to one execution's eventual output.
///
/// Resolves to `None` only if the execution was aborted (panicked or its
/// runtime shut down) before producing a value.
pub type Flight<T> = Shared<BoxFuture<'static, Option<T>>>;

type Operation<T> = dyn Fn() -> BoxFuture<'static, T> + Send + Sync;

enum FlightState<T>
where
    T: Clone + Send + Sync + 'static,
{
    Idle,
    Pending {
        id: u64,
        flight: Flight<T>,
    },
    Queued {
        pending_id: u64,
        follow_up_id: u64,
        follow_up: Flight<T>,
    },
}

struct Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    op: Box<Operation<T>>,
    state: Mutex<FlightState<T>>,
    next_id: AtomicU64,
    executions: AtomicU64,
}

/// Single-flight wrapper around an async operation.
pub struct SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F>(op: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                op: Box::new(op),
                state: Mutex::new(FlightState::Idle),
                next_id: AtomicU64::new(0),
                executions: AtomicU64::new(0),
            }),
        }
    }

    /// Requests an execution.
    ///
    /// - idle: starts one now and returns it
    /// - one pending: queues a follow-up to run after it settles and returns the follow-up
    /// - pending and queued: returns the already queued follow-up
    ///
    /// Must be called from within a Tokio runtime.
    pub fn trigger(&self) -> Flight<T> {
        let mut state = self.inner.lock();
        let (next, flight) = match mem::replace(&mut *state, FlightState::Idle) {
            FlightState::Idle => {
                let id = self.inner.next_id();
                let flight = Inner::launch(&self.inner, id, None);
                (
                    FlightState::Pending {
                        id,
                        flight: flight.clone(),
                    },
                    flight,
                )
            }
            FlightState::Pending { id, flight } => {
                let follow_up_id = self.inner.next_id();
                let follow_up = Inner::launch(&self.inner, follow_up_id, Some(flight));
                (
                    FlightState::Queued {
                        pending_id: id,
                        follow_up_id,
                        follow_up: follow_up.clone(),
                    },
                    follow_up,
                )
            }
            FlightState::Queued {
                pending_id,
                follow_up_id,
                follow_up,
            } => {
                let flight = follow_up.clone();
                (
                    FlightState::Queued {
                        pending_id,
                        follow_up_id,
                        follow_up,
                    },
                    flight,
                )
            }
        };
        *state = next;
        flight
    }

    /// Returns true when nothing is pending or queued.
    #[cfg(test)]
    fn is_idle(&self) -> bool {
        matches!(*self.inner.lock(), FlightState::Idle)
    }

    /// Number of executions started so far.
    #[cfg(test)]
    pub(crate) fn executions(&self) -> u64 {
        self.inner.executions.load(Ordering::SeqCst)
    }
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn lock(&self) -> MutexGuard<'_, FlightState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Spawns one execution, optionally chained after `after` settles.
    fn launch(this: &Arc<Self>, id: u64, after: Option<Flight<T>>) -> Flight<T> {
        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(this);
        tokio::spawn(async move {
            if let Some(previous) = after {
                // Outcome is irrelevant; the follow-up runs either way.
                let _ = previous.await;
            }
            let guard = SettleGuard {
                inner: Arc::clone(&inner),
                id,
            };
            inner.executions.fetch_add(1, Ordering::SeqCst);
            let output = (inner.op)().await;
            // Settle before publishing so the follow-up is already pending
            // when waiters on this flight wake up.
            drop(guard);
            let _ = tx.send(output);
        });
        rx.map(Result::ok).boxed().shared()
    }

    fn settle(&self, id: u64) {
        let mut state = self.lock();
        *state = match mem::replace(&mut *state, FlightState::Idle) {
            FlightState::Pending { id: pending, .. } if pending == id => FlightState::Idle,
            FlightState::Queued {
                pending_id,
                follow_up_id,
                follow_up,
            } if pending_id == id => FlightState::Pending {
                id: follow_up_id,
                flight: follow_up,
            },
            other => other,
        };
    }
}

/// Settles the slot even when the execution unwinds.
struct SettleGuard<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<Inner<T>>,
    id: u64,
}

impl<T> Drop for SettleGuard<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.inner.settle(self.id);
    }
}
