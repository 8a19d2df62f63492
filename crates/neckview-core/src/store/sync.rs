//! The sync loop and the two operations it coalesces.

use std::sync::Arc;

use futures_util::{FutureExt, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{
    ChannelOutcome, FetchFailurePolicy, LiveStore, RefreshOutcome, StoreEvent, StoreShared,
};
use crate::single_flight::SingleFlight;
use crate::source::{ChannelEvent, SessionSource, SourceError};

/// Runs refresh / stream / back off cycles until `cancel` fires.
pub(super) async fn run(store: LiveStore, cancel: CancellationToken) {
    debug!(backoff_ms = store.options.backoff.as_millis() as u64, "sync loop started");
    loop {
        let cycle = async {
            // Not awaited: the channel is opened while the fetch is in flight.
            drop(store.refresh.trigger());
            if let Some(Err(err)) = store.channel.trigger().await {
                debug!(%err, "channel cycle ended");
            }
            tokio::time::sleep(store.options.backoff).await;
        };
        tokio::select! {
            () = cancel.cancelled() => break,
            () = cycle => {}
        }
    }
    debug!("sync loop stopped");
}

pub(super) fn refresh_flight(
    source: Arc<dyn SessionSource>,
    shared: Arc<StoreShared>,
    policy: FetchFailurePolicy,
) -> SingleFlight<RefreshOutcome> {
    SingleFlight::new(move || {
        let source = Arc::clone(&source);
        let shared = Arc::clone(&shared);
        async move { fetch_and_publish(source.as_ref(), &shared, policy).await }.boxed()
    })
}

pub(super) fn channel_flight(
    source: Arc<dyn SessionSource>,
    shared: Arc<StoreShared>,
    refresh: SingleFlight<RefreshOutcome>,
) -> SingleFlight<ChannelOutcome> {
    SingleFlight::new(move || {
        let source = Arc::clone(&source);
        let shared = Arc::clone(&shared);
        let refresh = refresh.clone();
        async move {
            // Bound to the run that is current when the channel opens.
            let cancel = shared.run_token();
            stream_channel(source.as_ref(), &shared, &refresh, &cancel).await
        }
        .boxed()
    })
}

/// Fetches the full list and publishes it.
async fn fetch_and_publish(
    source: &dyn SessionSource,
    shared: &StoreShared,
    policy: FetchFailurePolicy,
) -> RefreshOutcome {
    match source.fetch_sessions().await {
        Ok(records) => {
            let count = records.len();
            debug!(count, "snapshot fetched");
            shared.publish(records);
            Ok(count)
        }
        Err(err) => {
            warn!(%err, "session fetch failed");
            if policy == FetchFailurePolicy::Clear {
                shared.publish(Vec::new());
            }
            Err(err)
        }
    }
}

/// Holds one push channel open until it fails, closes, or the store shuts down.
async fn stream_channel(
    source: &dyn SessionSource,
    shared: &StoreShared,
    refresh: &SingleFlight<RefreshOutcome>,
    cancel: &CancellationToken,
) -> ChannelOutcome {
    let opened = tokio::select! {
        () = cancel.cancelled() => return Ok(()),
        opened = source.open_channel() => opened,
    };
    let mut channel = match opened {
        Ok(channel) => channel,
        Err(err) => {
            warn!(%err, "failed to open event channel");
            shared.dispatch(StoreEvent::Inactive);
            return Err(err);
        }
    };

    let mut confirmed = false;
    let err = loop {
        let next = tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            next = channel.next() => next,
        };
        match next {
            Some(Ok(ChannelEvent::Init)) => {
                if !confirmed {
                    confirmed = true;
                    shared.dispatch(StoreEvent::Active);
                }
            }
            Some(Ok(ChannelEvent::Update)) => {
                // The payload is not trusted; refetch the whole list instead.
                drop(refresh.trigger());
            }
            Some(Ok(ChannelEvent::Other(name))) => trace!(event = %name, "ignoring channel event"),
            Some(Err(err)) => break err,
            None => break SourceError::closed(),
        }
    };

    warn!(%err, "event channel terminated");
    shared.dispatch(StoreEvent::Inactive);
    Err(err)
}
