use std::pin::Pin;
use std::task::{Context, Poll};

use eventsource_stream::{EventStream, Eventsource};
use futures_util::Stream;

use super::{ChannelEvent, SourceError, SourceErrorKind, SourceResult};

/// SSE parser that turns the `/api/events` byte stream into `ChannelEvent`s.
///
/// Payloads are ignored on purpose: an `update` only means "refetch".
pub struct ChannelParser<S> {
    inner: EventStream<S>,
}

impl<S> ChannelParser<S> {
    pub fn new(stream: S) -> Self
    where
        S: Eventsource,
    {
        Self {
            inner: stream.eventsource(),
        }
    }
}

impl<S, E> Stream for ChannelParser<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = SourceResult<ChannelEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(event))) => {
                Poll::Ready(Some(Ok(ChannelEvent::from_name(&event.event))))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(SourceError::new(
                SourceErrorKind::Stream,
                format!("SSE stream error: {e}"),
            )))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
