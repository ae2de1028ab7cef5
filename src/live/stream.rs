use axum::body::Bytes;
use futures_util::Stream;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::registry::ConnectionRegistry;
use super::sink::{encode_frame, DeliveryOutcome, EventSink};
use crate::models::LiveEvent;

#[derive(Debug, Clone, Copy)]
pub struct StreamSettings {
    pub heartbeat_interval: Duration,
    pub buffer: usize,
}

/// Connection ids are the user id plus a nanosecond timestamp
pub fn connection_id(user_id: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{}-{}", user_id, nanos)
}

/// Response body of one live connection.
///
/// Yields frames until the registry drops the connection's sink. Dropping the
/// stream (client went away) unregisters the connection.
pub struct LiveStream {
    id: String,
    registry: Arc<ConnectionRegistry>,
    rx: mpsc::Receiver<Bytes>,
}

impl LiveStream {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Stream for LiveStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx).map(|frame| frame.map(Ok))
    }
}

impl Drop for LiveStream {
    fn drop(&mut self) {
        if self.registry.unregister(&self.id) {
            info!("Cleaning up connection: {}", self.id);
        }
    }
}

/// Registers a connection, queues its `connected` event and starts its heartbeat.
pub fn open(
    registry: &Arc<ConnectionRegistry>,
    session_id: &str,
    user_id: &str,
    settings: StreamSettings,
) -> LiveStream {
    open_with(registry, session_id, user_id, &LiveEvent::connected(session_id, user_id), settings)
}

/// Same as [`open`] with a caller supplied first event
pub fn open_with(
    registry: &Arc<ConnectionRegistry>,
    session_id: &str,
    user_id: &str,
    first: &LiveEvent,
    settings: StreamSettings,
) -> LiveStream {
    let id = connection_id(user_id);
    info!("Creating live connection: {}", id);

    let (sink, rx) = EventSink::channel(settings.buffer);
    match encode_frame(first) {
        Ok(frame) => {
            if let Err(e) = sink.write(frame) {
                error!("Error sending initial message to {}: {}", id, e);
            }
        }
        Err(e) => error!("Failed to encode initial message for {}: {}", id, e),
    }

    registry.register(&id, session_id, user_id, sink);

    let heartbeat = tokio::spawn(heartbeat_loop(registry.clone(), id.clone(), settings.heartbeat_interval));
    registry.attach_heartbeat(&id, heartbeat.abort_handle());

    LiveStream {
        id,
        registry: registry.clone(),
        rx,
    }
}

async fn heartbeat_loop(registry: Arc<ConnectionRegistry>, id: String, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if !registry.exists(&id) {
            debug!("Connection {} no longer registered, stopping heartbeat", id);
            return;
        }

        let frame = match encode_frame(&LiveEvent::heartbeat()) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to encode heartbeat for {}: {}", id, e);
                continue;
            }
        };

        match registry.deliver(&id, frame) {
            Some(DeliveryOutcome::Delivered) => {}
            Some(DeliveryOutcome::Evicted(e)) => {
                warn!("Heartbeat failed for {}, cleaning up: {}", id, e);
                return;
            }
            None => return,
        }
    }
}
