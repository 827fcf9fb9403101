//! Server-sent event feeds over the workspace change feed.

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use brokerdesk_application::ChangeEvent;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

/// Turns change events into SSE frames.
///
/// `select` drops events the subscriber must not see and renders the rest.
/// A subscriber that fell behind receives a `lagged` frame and should
/// refetch.
pub fn event_stream<F>(
    receiver: broadcast::Receiver<ChangeEvent>,
    mut select: F,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    F: FnMut(ChangeEvent) -> Option<Event> + Send + 'static,
{
    let stream = BroadcastStream::new(receiver).filter_map(move |received| match received {
        Ok(event) => select(event).map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "live subscriber lagged");
            Some(Ok(Event::default()
                .event("lagged")
                .data(skipped.to_string())))
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Renders a JSON frame, skipping values that fail to serialize.
pub fn json_event(name: &'static str, value: &impl serde::Serialize) -> Option<Event> {
    Event::default().event(name).json_data(value).ok()
}
