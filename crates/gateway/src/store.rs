//! In-memory credential store.
//!
//! Holds the current access token and the identity fields that arrive with a
//! login. Mutations go through `set_session` (login), `set_access_token`
//! (silent refresh) and `clear` (logout / teardown); every mutation notifies
//! registered observers synchronously before the call returns, so an observer
//! that reads the store back always sees the new state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Identity fields attached to a logged-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub nickname: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Whether the identity carries the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Point-in-time copy of the store contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub access_token: Option<String>,
    pub identity: Option<Identity>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Whether the snapshot holds a usable credential.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A single store mutation, as delivered to observers.
#[derive(Debug, Clone)]
pub enum CredentialChange {
    /// A full session was established (login or hydration).
    LoggedIn(SessionSnapshot),
    /// The access token was replaced by a silent refresh; identity unchanged.
    Refreshed(SessionSnapshot),
    /// The session was discarded.
    Cleared,
}

/// Observer invoked synchronously on every store mutation.
pub trait CredentialObserver: Send + Sync {
    fn on_change(&self, change: &CredentialChange);
}

/// Handle returned by [`CredentialStore::observe`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
    identity: Option<Identity>,
}

/// Owner of the session credential.
///
/// The refresh flow writes new tokens through `set_access_token` and nothing
/// else; callers read the token at injection time rather than caching it.
pub struct CredentialStore {
    state: RwLock<SessionState>,
    observers: RwLock<Vec<(u64, Arc<dyn CredentialObserver>)>>,
    next_observer: AtomicU64,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            observers: RwLock::new(Vec::new()),
            next_observer: AtomicU64::new(1),
        }
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.state.read().access_token.clone()
    }

    /// Current identity, if a session is established.
    pub fn identity(&self) -> Option<Identity> {
        self.state.read().identity.clone()
    }

    /// Whether a non-empty credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .access_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            access_token: state.access_token.clone(),
            identity: state.identity.clone(),
            updated_at: Utc::now(),
        }
    }

    /// Establish a full session (login or hydration from disk).
    pub fn set_session(&self, access_token: String, identity: Identity) {
        let snapshot = {
            let mut state = self.state.write();
            state.access_token = Some(access_token);
            state.identity = Some(identity);
            Self::snapshot_locked(&state)
        };
        self.notify(&CredentialChange::LoggedIn(snapshot));
    }

    /// Replace the access token, keeping identity fields.
    ///
    /// This is the single mutation point used by the refresh flow.
    pub fn set_access_token(&self, access_token: String) {
        let snapshot = {
            let mut state = self.state.write();
            state.access_token = Some(access_token);
            Self::snapshot_locked(&state)
        };
        self.notify(&CredentialChange::Refreshed(snapshot));
    }

    /// Discard the session.
    pub fn clear(&self) {
        {
            let mut state = self.state.write();
            state.access_token = None;
            state.identity = None;
        }
        self.notify(&CredentialChange::Cleared);
    }

    /// Register an observer; it will see every subsequent mutation.
    pub fn observe(&self, observer: Arc<dyn CredentialObserver>) -> ObserverId {
        let id = self.next_observer.fetch_add(1, Ordering::Relaxed);
        self.observers.write().push((id, observer));
        ObserverId(id)
    }

    /// Unregister a previously registered observer.
    pub fn unobserve(&self, id: ObserverId) {
        self.observers.write().retain(|(oid, _)| *oid != id.0);
    }

    fn snapshot_locked(state: &SessionState) -> SessionSnapshot {
        SessionSnapshot {
            access_token: state.access_token.clone(),
            identity: state.identity.clone(),
            updated_at: Utc::now(),
        }
    }

    // Observers run outside the state lock: they may read the store back.
    fn notify(&self, change: &CredentialChange) {
        let observers: Vec<_> = self.observers.read().iter().cloned().collect();
        for (_, observer) in observers {
            observer.on_change(change);
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}
