use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};

use super::*;
use crate::model::{SessionId, SessionState};
use crate::source::{ChannelEvent, ChannelStream, SourceError, SourceErrorKind};

type ChannelScript = mpsc::UnboundedReceiver<SourceResult<ChannelEvent>>;

/// Source that replays queued fetch results and hands out test-driven channels.
///
/// An exhausted fetch queue yields an empty list; an exhausted channel queue
/// refuses the connection.
struct ScriptedSource {
    fetches: Mutex<VecDeque<SourceResult<Vec<SessionRecord>>>>,
    fetch_calls: AtomicUsize,
    channels: Mutex<VecDeque<ChannelScript>>,
    opens: mpsc::UnboundedSender<Instant>,
}

impl ScriptedSource {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Instant>) {
        let (opens, opened) = mpsc::unbounded_channel();
        let source = Arc::new(Self {
            fetches: Mutex::new(VecDeque::new()),
            fetch_calls: AtomicUsize::new(0),
            channels: Mutex::new(VecDeque::new()),
            opens,
        });
        (source, opened)
    }

    fn push_fetch(&self, result: SourceResult<Vec<SessionRecord>>) {
        self.fetches.lock().unwrap().push_back(result);
    }

    fn push_channel(&self) -> mpsc::UnboundedSender<SourceResult<ChannelEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels.lock().unwrap().push_back(rx);
        tx
    }

    fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

impl SessionSource for ScriptedSource {
    fn fetch_sessions(&self) -> BoxFuture<'_, SourceResult<Vec<SessionRecord>>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { next })
    }

    fn open_channel(&self) -> BoxFuture<'_, SourceResult<ChannelStream>> {
        let _ = self.opens.send(Instant::now());
        let script = self.channels.lock().unwrap().pop_front();
        Box::pin(async move {
            let rx = script.ok_or_else(|| {
                SourceError::new(SourceErrorKind::Transport, "Connection failed: refused")
            })?;
            let stream = futures_util::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|event| (event, rx))
            });
            Ok(stream.boxed())
        })
    }
}

fn record(id: u64, state: i64) -> SessionRecord {
    SessionRecord {
        id: SessionId::from(id),
        protocol: "socks5".into(),
        state: SessionState::from(state),
        host: format!("host-{id}:443"),
        origin: "127.0.0.1:5000".into(),
        started_at: 1_700_000_000_000,
    }
}

fn transport_error() -> SourceError {
    SourceError::new(SourceErrorKind::Transport, "Connection failed: refused")
}

fn options(on_fetch_error: FetchFailurePolicy) -> SyncOptions {
    SyncOptions {
        backoff: DEFAULT_BACKOFF,
        on_fetch_error,
    }
}

async fn next_event(sub: &mut Subscription) -> StoreEvent {
    timeout(Duration::from_secs(5), sub.recv())
        .await
        .expect("timed out waiting for store event")
        .expect("store dropped")
}

async fn next_snapshot(sub: &mut Subscription) -> Vec<SessionRecord> {
    match next_event(sub).await {
        StoreEvent::Update(snapshot) => snapshot.to_vec(),
        other => panic!("expected update, got {other:?}"),
    }
}

/// Skips snapshot updates and returns the next connectivity change.
async fn next_connectivity(sub: &mut Subscription) -> StoreEvent {
    loop {
        let event = next_event(sub).await;
        if !matches!(event, StoreEvent::Update(_)) {
            return event;
        }
    }
}

#[tokio::test]
async fn test_failed_fetch_publishes_empty_snapshot_then_recovers() {
    let (source, _opened) = ScriptedSource::new();
    source.push_fetch(Err(transport_error()));
    source.push_fetch(Ok(vec![record(1, 2)]));
    let channel = source.push_channel();

    let store = LiveStore::new(source.clone(), options(FetchFailurePolicy::Clear));
    let mut sub = store.subscribe();
    let handle = store.start();

    assert!(next_snapshot(&mut sub).await.is_empty());

    channel.send(Ok(ChannelEvent::Init)).unwrap();
    assert_eq!(next_event(&mut sub).await, StoreEvent::Active);

    channel.send(Ok(ChannelEvent::Update)).unwrap();
    assert_eq!(next_snapshot(&mut sub).await, vec![record(1, 2)]);
    assert_eq!(store.snapshot().to_vec(), vec![record(1, 2)]);
    assert_eq!(store.connectivity(), Connectivity::Active);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_keep_last_policy_publishes_nothing_on_failure() {
    let (source, _opened) = ScriptedSource::new();
    source.push_fetch(Ok(vec![record(1, 0)]));
    source.push_fetch(Err(transport_error()));
    source.push_fetch(Ok(vec![record(2, 1)]));
    let channel = source.push_channel();

    let store = LiveStore::new(source.clone(), options(FetchFailurePolicy::KeepLast));
    let mut sub = store.subscribe();
    let handle = store.start();

    assert_eq!(next_snapshot(&mut sub).await, vec![record(1, 0)]);
    channel.send(Ok(ChannelEvent::Init)).unwrap();
    assert_eq!(next_event(&mut sub).await, StoreEvent::Active);

    // First refetch fails, second succeeds; only the success is published.
    channel.send(Ok(ChannelEvent::Update)).unwrap();
    channel.send(Ok(ChannelEvent::Update)).unwrap();
    assert_eq!(next_snapshot(&mut sub).await, vec![record(2, 1)]);
    assert_eq!(source.fetch_calls(), 3);
    assert_eq!(sub.try_recv(), None);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_burst_of_updates_coalesces_into_two_fetches() {
    let (source, _opened) = ScriptedSource::new();
    source.push_fetch(Ok(vec![record(1, 0)]));
    source.push_fetch(Ok(vec![record(1, 1)]));
    source.push_fetch(Ok(vec![record(1, 2)]));
    let channel = source.push_channel();

    let store = LiveStore::new(source.clone(), SyncOptions::default());
    let mut sub = store.subscribe();
    let handle = store.start();

    assert_eq!(next_snapshot(&mut sub).await, vec![record(1, 0)]);
    channel.send(Ok(ChannelEvent::Init)).unwrap();
    assert_eq!(next_event(&mut sub).await, StoreEvent::Active);

    for _ in 0..5 {
        channel.send(Ok(ChannelEvent::Update)).unwrap();
    }

    assert_eq!(next_snapshot(&mut sub).await, vec![record(1, 1)]);
    assert_eq!(next_snapshot(&mut sub).await, vec![record(1, 2)]);
    assert_eq!(store.refresh_executions(), 3);
    assert_eq!(source.fetch_calls(), 3);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_unknown_channel_events_are_ignored() {
    let (source, _opened) = ScriptedSource::new();
    let channel = source.push_channel();

    let store = LiveStore::new(source.clone(), SyncOptions::default());
    let mut sub = store.subscribe();
    let handle = store.start();

    assert!(next_snapshot(&mut sub).await.is_empty());
    channel.send(Ok(ChannelEvent::Other("ping".into()))).unwrap();
    channel.send(Ok(ChannelEvent::Init)).unwrap();
    channel.send(Ok(ChannelEvent::Init)).unwrap();

    assert_eq!(next_event(&mut sub).await, StoreEvent::Active);
    tokio::task::yield_now().await;
    assert_eq!(sub.try_recv(), None);
    assert_eq!(source.fetch_calls(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_dead_channel_goes_inactive_and_reopens_after_backoff() {
    let (source, mut opened) = ScriptedSource::new();
    let first = source.push_channel();
    let _second = source.push_channel();

    let store = LiveStore::new(source.clone(), SyncOptions::default());
    let mut sub = store.subscribe();
    let handle = store.start();

    let first_open = opened.recv().await.unwrap();
    first.send(Ok(ChannelEvent::Init)).unwrap();
    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Active);

    first
        .send(Err(SourceError::new(SourceErrorKind::Stream, "reset")))
        .unwrap();
    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Inactive);
    assert_eq!(store.connectivity(), Connectivity::Inactive);

    let second_open = opened.recv().await.unwrap();
    assert!(second_open - first_open >= DEFAULT_BACKOFF);
    // Every cycle starts with a fresh snapshot.
    tokio::task::yield_now().await;
    assert_eq!(source.fetch_calls(), 2);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_server_closing_channel_counts_as_failure() {
    let (source, mut opened) = ScriptedSource::new();
    let channel = source.push_channel();
    let _next = source.push_channel();

    let store = LiveStore::new(source.clone(), SyncOptions::default());
    let mut sub = store.subscribe();
    let handle = store.start();

    opened.recv().await.unwrap();
    channel.send(Ok(ChannelEvent::Init)).unwrap();
    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Active);

    drop(channel);
    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Inactive);
    opened.recv().await.unwrap();

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_channel_is_inactive_on_every_attempt() {
    let (source, mut opened) = ScriptedSource::new();

    let store = LiveStore::new(source.clone(), SyncOptions::default());
    let mut sub = store.subscribe();
    let handle = store.start();

    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Inactive);
    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Inactive);

    let first = opened.recv().await.unwrap();
    let second = opened.recv().await.unwrap();
    assert!(second - first >= DEFAULT_BACKOFF);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_reconnecting() {
    let (source, mut opened) = ScriptedSource::new();

    let store = LiveStore::new(source.clone(), SyncOptions::default());
    let mut sub = store.subscribe();
    let handle = store.start();
    assert!(handle.is_running());

    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Inactive);
    handle.shutdown().await;

    tokio::time::sleep(Duration::from_secs(10)).await;

    let mut attempts = 0;
    while opened.try_recv().is_ok() {
        attempts += 1;
    }
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn test_shutdown_closes_open_channel() {
    let (source, _opened) = ScriptedSource::new();
    let channel = source.push_channel();

    let store = LiveStore::new(source.clone(), SyncOptions::default());
    let mut sub = store.subscribe();
    let handle = store.start();

    assert!(next_snapshot(&mut sub).await.is_empty());
    channel.send(Ok(ChannelEvent::Init)).unwrap();
    assert_eq!(next_event(&mut sub).await, StoreEvent::Active);

    handle.shutdown().await;

    // The stream is dropped once the channel task sees the cancellation.
    timeout(Duration::from_secs(5), channel.closed())
        .await
        .expect("channel was not released");
}

#[tokio::test]
async fn test_store_restarts_after_shutdown() {
    let (source, _opened) = ScriptedSource::new();
    let first = source.push_channel();
    let second = source.push_channel();

    let store = LiveStore::new(source.clone(), SyncOptions::default());
    let mut sub = store.subscribe();

    let handle = store.start();
    first.send(Ok(ChannelEvent::Init)).unwrap();
    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Active);
    handle.shutdown().await;
    timeout(Duration::from_secs(5), first.closed())
        .await
        .expect("first channel was not released");

    let handle = store.start();
    second.send(Ok(ChannelEvent::Init)).unwrap();
    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Active);
    assert!(handle.is_running());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_second_start_replaces_running_loop() {
    let (source, _opened) = ScriptedSource::new();
    let first = source.push_channel();
    let second = source.push_channel();

    let store = LiveStore::new(source.clone(), SyncOptions::default());
    let mut sub = store.subscribe();

    let old = store.start();
    first.send(Ok(ChannelEvent::Init)).unwrap();
    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Active);

    let current = store.start();
    timeout(Duration::from_secs(5), first.closed())
        .await
        .expect("previous run kept its channel open");

    second.send(Ok(ChannelEvent::Init)).unwrap();
    assert_eq!(next_connectivity(&mut sub).await, StoreEvent::Active);

    old.shutdown().await;
    assert!(current.is_running());
    current.shutdown().await;
}

#[tokio::test]
async fn test_manual_refresh_coalesces_without_loop() {
    let (source, _opened) = ScriptedSource::new();
    source.push_fetch(Ok(vec![record(1, 0)]));
    source.push_fetch(Ok(vec![record(1, 0), record(2, 1)]));

    let store = LiveStore::new(source.clone(), SyncOptions::default());
    let mut sub = store.subscribe();

    let first = store.refresh();
    let second = store.refresh();
    let third = store.refresh();

    assert_eq!(first.await, Some(Ok(1)));
    assert_eq!(second.await, Some(Ok(2)));
    assert_eq!(third.await, Some(Ok(2)));
    assert_eq!(store.refresh_executions(), 2);

    assert_eq!(next_snapshot(&mut sub).await.len(), 1);
    assert_eq!(next_snapshot(&mut sub).await.len(), 2);
    assert_eq!(store.snapshot().len(), 2);
    assert_eq!(store.connectivity(), Connectivity::Unknown);
}
