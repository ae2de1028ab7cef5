use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

use super::broadcaster::{BroadcastReport, Broadcaster};
use super::registry::ConnectionRegistry;
use super::stream::{self, LiveStream, StreamSettings};
use crate::models::{LiveEvent, TextSnapshot, TextType};

/// Registry scope shared by every text sync connection
pub const TEXT_SYNC_CHANNEL: &str = "realtime-sync";

/// Connections on the text channel are anonymous
const TEXT_SYNC_USER: &str = "anonymous";

/// The two process-wide texts behind the realtime sync endpoint.
///
/// Opening a stream and applying an update both hold the text lock while they
/// touch the registry, so a new connection sees either the old snapshot plus
/// the update event or the new snapshot, never neither.
#[derive(Debug, Default)]
pub struct TextSync {
    texts: Mutex<TextSnapshot>,
}

impl TextSync {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TextSnapshot> {
        self.texts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> TextSnapshot {
        self.lock().clone()
    }

    /// Opens a stream whose first event carries both current texts
    pub fn open_stream(&self, registry: &Arc<ConnectionRegistry>, settings: StreamSettings) -> LiveStream {
        let texts = self.lock();
        let first = LiveEvent::text_sync_connected(&texts);
        stream::open_with(registry, TEXT_SYNC_CHANNEL, TEXT_SYNC_USER, &first, settings)
    }

    /// Stores one text and pushes it to every open text sync connection
    pub fn update(
        &self,
        broadcaster: &Broadcaster,
        text_type: TextType,
        content: &str,
    ) -> (TextSnapshot, BroadcastReport) {
        let mut texts = self.lock();
        match text_type {
            TextType::Original => texts.original_text = content.to_string(),
            TextType::Changed => texts.changed_text = content.to_string(),
        }
        info!("Updated {:?} text ({} bytes)", text_type, content.len());
        let report = broadcaster.broadcast_text_update(TEXT_SYNC_CHANNEL, text_type, content);
        (texts.clone(), report)
    }
}
