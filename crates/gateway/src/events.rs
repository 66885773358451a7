//! Session lifecycle events.
//!
//! The gateway surfaces terminal session failures on a broadcast channel so a
//! frontend shell can show a blocking "session expired" notice without the
//! gateway knowing anything about presentation.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Session-level event emitted by the gateway.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The session could not be recovered; the user must log in again.
    Expired {
        reason: String,
        at: DateTime<Utc>,
    },
}

/// Broadcast fan-out for [`SessionEvent`]s.
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to session events. Each receiver sees events emitted after
    /// the subscription was created.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. Having no subscribers is not an error.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
