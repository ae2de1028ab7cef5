use axum::body::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::models::LiveEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("stream closed by client")]
    Closed,
    #[error("stream buffer full")]
    Full,
}

/// Result of one attempted write to one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Evicted(DeliveryError),
}

/// Write half of a live stream. The read half is the HTTP response body.
#[derive(Debug)]
pub struct EventSink {
    tx: mpsc::Sender<Bytes>,
}

impl EventSink {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }

    /// Never waits: a full buffer is a failed write.
    pub fn write(&self, frame: Bytes) -> Result<(), DeliveryError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Encode an event as one `data: <json>\n\n` block
pub fn encode_frame(event: &LiveEvent) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(event)?;
    Ok(Bytes::from(format!("data: {}\n\n", json)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_is_data_line_with_blank_terminator() {
        let frame = encode_frame(&LiveEvent::heartbeat()).unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.starts_with("data: {\"type\":\"heartbeat\""));
        assert!(text.ends_with("}\n\n"));
    }

    #[test]
    fn write_reports_closed_and_full() {
        let (sink, rx) = EventSink::channel(1);
        assert_eq!(sink.write(Bytes::from_static(b"a")), Ok(()));
        assert_eq!(sink.write(Bytes::from_static(b"b")), Err(DeliveryError::Full));
        drop(rx);
        assert_eq!(sink.write(Bytes::from_static(b"c")), Err(DeliveryError::Closed));
    }
}
