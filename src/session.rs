//! Authentication-state signal and cross-context session notifications.
//!
//! The storefront core does not authenticate anyone itself; it observes an
//! external session. Login/logout (and storage-change notifications from
//! other browsing contexts sharing the session) are published over a
//! broadcast channel so every subscriber refreshes, rather than polling.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated { customer_id: Uuid },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// A session-boundary change. Any such change notifies all subscribers to
/// refresh (or force-empty, on logout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
    /// Another browsing context sharing this session changed it.
    StorageChanged,
}

struct SessionInner {
    state: watch::Sender<AuthState>,
    events: broadcast::Sender<SessionEvent>,
}

/// Shared handle to the authenticated-session signal.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

impl AuthSession {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Anonymous);
        let (events, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(SessionInner { state, events }),
        }
    }

    pub fn login(&self, customer_id: Uuid) {
        self.inner
            .state
            .send_replace(AuthState::Authenticated { customer_id });
        let _ = self.inner.events.send(SessionEvent::LoggedIn);
        info!(%customer_id, "Session authenticated");
    }

    pub fn logout(&self) {
        self.inner.state.send_replace(AuthState::Anonymous);
        let _ = self.inner.events.send(SessionEvent::LoggedOut);
        info!("Session ended");
    }

    /// Publishes a storage-change notification, as raised when another
    /// context sharing the session storage mutates it.
    pub fn notify_storage_changed(&self) {
        let _ = self.inner.events.send(SessionEvent::StorageChanged);
    }

    pub fn current(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// A receiver tracking the current authentication state.
    pub fn state(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Subscribes to session-boundary change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}
