//! Shared handler context.
//!
//! DESIGN
//! ======
//! `AppState` is cloned into every handler task. It holds the API boundary
//! as a trait object, the session store, and the two outbound channels.
//! Receivers live with the embedding application; a dropped receiver only
//! logs — handlers never fail because nobody is listening.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::api::AuthApi;
use crate::intent::StateEvent;
use crate::notice::Notice;
use crate::session::SessionStore;

/// Receiving ends of the handler output channels.
pub struct StateStreams {
    pub events: mpsc::UnboundedReceiver<StateEvent>,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

/// Shared context injected into handlers. Clone is cheap — all fields are
/// Arc-backed or channel senders.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn AuthApi>,
    pub sessions: SessionStore,
    events: mpsc::UnboundedSender<StateEvent>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl AppState {
    /// Wire up a state and the receiving ends of its output channels.
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, sessions: SessionStore) -> (Self, StateStreams) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let state = Self { api, sessions, events: events_tx, notices: notices_tx };
        (state, StateStreams { events: events_rx, notices: notices_rx })
    }

    pub(crate) fn emit(&self, event: StateEvent) {
        if self.events.send(event).is_err() {
            warn!("state event receiver dropped");
        }
    }

    pub(crate) fn notify_error(&self, text: &str) {
        if self.notices.send(Notice::error(text)).is_err() {
            warn!("notice receiver dropped");
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::session::{MemorySlot, SessionUser};

    /// State over the given API with an in-memory session slot.
    #[must_use]
    pub fn test_state(api: Arc<dyn AuthApi>) -> (AppState, StateStreams) {
        AppState::new(api, SessionStore::new(Arc::new(MemorySlot::new())))
    }

    #[must_use]
    pub fn sample_user() -> SessionUser {
        SessionUser {
            id: 7,
            username: "grace".into(),
            email: "grace@example.com".into(),
            admin: false,
            name: Some("Grace".into()),
            description: None,
            department: Some("analytics".into()),
        }
    }
}
