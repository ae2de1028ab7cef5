use std::sync::Arc;
use tracing::{error, info, warn};

use super::registry::ConnectionRegistry;
use super::sink::{encode_frame, DeliveryOutcome};
use crate::models::{CodeType, LiveEvent, TextType, UserSummary};

/// Per-recipient outcomes of one broadcast
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub outcomes: Vec<(String, DeliveryOutcome)>,
}

impl BroadcastReport {
    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == DeliveryOutcome::Delivered)
            .count()
    }

    pub fn evicted(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }

    pub fn evicted_ids(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|(id, outcome)| match outcome {
            DeliveryOutcome::Evicted(_) => Some(id.as_str()),
            DeliveryOutcome::Delivered => None,
        })
    }
}

/// Fans events out to every connection of a session
#[derive(Clone, Debug)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Attempts every connection registered for the session. A failed write
    /// evicts that connection and delivery continues with the rest.
    pub fn broadcast(&self, session_id: &str, event: &LiveEvent) -> BroadcastReport {
        let frame = match encode_frame(event) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to encode {} event for session {}: {}", event.kind(), session_id, e);
                return BroadcastReport::default();
            }
        };

        let mut report = BroadcastReport::default();
        self.registry.for_each_in_session(session_id, |id, conn| {
            match conn.write(frame.clone()) {
                Ok(()) => report.outcomes.push((id.to_string(), DeliveryOutcome::Delivered)),
                Err(e) => {
                    warn!("Failed to send {} to connection {}: {}", event.kind(), id, e);
                    report.outcomes.push((id.to_string(), DeliveryOutcome::Evicted(e)));
                }
            }
        });

        // Evict outside the iteration so the registry lock is not re-entered
        for id in report.evicted_ids() {
            self.registry.unregister(id);
        }

        info!(
            "Broadcast {} to session {} complete: {} successful, {} failed",
            event.kind(),
            session_id,
            report.delivered(),
            report.evicted()
        );
        report
    }

    pub fn broadcast_code_update(
        &self,
        session_id: &str,
        code_type: CodeType,
        content: &str,
        student_id: Option<&str>,
    ) -> BroadcastReport {
        let event = LiveEvent::code_update(session_id, code_type, content, student_id);
        self.broadcast(session_id, &event)
    }

    pub fn broadcast_student_joined(&self, session_id: &str, student: UserSummary) -> BroadcastReport {
        info!("Broadcasting student {} joined to session {}", student.id, session_id);
        let event = LiveEvent::student_joined(session_id, student);
        self.broadcast(session_id, &event)
    }

    pub fn broadcast_text_update(&self, channel: &str, text_type: TextType, content: &str) -> BroadcastReport {
        self.broadcast(channel, &LiveEvent::text_update(text_type, content))
    }
}
