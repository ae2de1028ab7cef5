use axum::body::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use super::sink::{DeliveryError, DeliveryOutcome, EventSink};

/// One open client stream
#[derive(Debug)]
pub struct Connection {
    pub session_id: String,
    pub user_id: String,
    sink: EventSink,
    heartbeat: Option<AbortHandle>,
    seq: u64,
}

impl Connection {
    pub fn write(&self, frame: Bytes) -> Result<(), DeliveryError> {
        self.sink.write(frame)
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_seq: u64,
    entries: HashMap<String, Connection>,
}

/// Open live streams keyed by connection id.
///
/// Every mutation goes through one mutex. Callbacks run while it is held, so
/// they must not call back into the registry and nothing awaits under it.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: Mutex<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a connection. A colliding id replaces the previous entry.
    pub fn register(&self, id: &str, session_id: &str, user_id: &str, sink: EventSink) {
        let replaced = {
            let mut inner = self.lock();
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.entries.insert(id.to_string(), Connection {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
                sink,
                heartbeat: None,
                seq,
            })
        };
        if let Some(old) = replaced {
            warn!("Connection id {} registered twice, replacing previous stream", id);
            if let Some(handle) = old.heartbeat {
                handle.abort();
            }
        }
        debug!("Registered connection {} for session {}", id, session_id);
    }

    /// Removes a connection, stops its heartbeat and drops its sink.
    /// Returns false when the id was not registered.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.lock().entries.remove(id);
        match removed {
            Some(conn) => {
                if let Some(handle) = conn.heartbeat {
                    handle.abort();
                }
                debug!("Unregistered connection {} from session {}", id, conn.session_id);
                true
            }
            None => false,
        }
    }

    pub fn exists(&self, id: &str) -> bool {
        self.lock().entries.contains_key(id)
    }

    /// Stores the heartbeat task for a connection. Aborts it right away if
    /// the connection is already gone.
    pub fn attach_heartbeat(&self, id: &str, handle: AbortHandle) {
        let mut inner = self.lock();
        match inner.entries.get_mut(id) {
            Some(conn) => {
                if let Some(previous) = conn.heartbeat.replace(handle) {
                    previous.abort();
                }
            }
            None => handle.abort(),
        }
    }

    /// Calls `f` for each connection of the session in registration order.
    pub fn for_each_in_session<F>(&self, session_id: &str, mut f: F)
    where
        F: FnMut(&str, &Connection),
    {
        let inner = self.lock();
        let mut matching: Vec<(&String, &Connection)> = inner
            .entries
            .iter()
            .filter(|(_, conn)| conn.session_id == session_id)
            .collect();
        matching.sort_by_key(|(_, conn)| conn.seq);
        for (id, conn) in matching {
            f(id, conn);
        }
    }

    /// Writes one frame to one connection, evicting it on failure.
    /// `None` when the connection is not registered.
    pub fn deliver(&self, id: &str, frame: Bytes) -> Option<DeliveryOutcome> {
        let result = {
            let inner = self.lock();
            let conn = inner.entries.get(id)?;
            conn.write(frame)
        };
        match result {
            Ok(()) => Some(DeliveryOutcome::Delivered),
            Err(e) => {
                self.unregister(id);
                Some(DeliveryOutcome::Evicted(e))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct sessions with at least one open connection
    pub fn session_count(&self) -> usize {
        let inner = self.lock();
        inner
            .entries
            .values()
            .map(|conn| conn.session_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn session_len(&self, session_id: &str) -> usize {
        self.lock()
            .entries
            .values()
            .filter(|conn| conn.session_id == session_id)
            .count()
    }
}
