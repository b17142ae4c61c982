use std::collections::HashMap;

use tokio::sync::watch;

use crate::role::Role;

/// Storage key holding the opaque bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the role tag returned alongside the token.
pub const ROLE_KEY: &str = "user_type";

/// SessionStorage
///
/// The client-local persistent store the session lives in. Reads are point-in-time:
/// nothing here observes changes made elsewhere (another tab, another request).
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// MemoryStorage
///
/// Plain in-memory store, used by tests and anywhere a browser is not involved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Session
///
/// The persisted `(token, role tag)` pair. The role tag is only meaningful while a
/// token is present, so a session loaded without a token never carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub role_tag: Option<String>,
}

impl Session {
    /// Reads the session out of storage. Empty values are treated as absent.
    pub fn load<S: SessionStorage + ?Sized>(storage: &S) -> Self {
        let token = storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let role_tag = token
            .as_ref()
            .and_then(|_| storage.get(ROLE_KEY))
            .filter(|r| !r.is_empty());
        Self { token, role_tag }
    }

    pub fn access_state(&self) -> AccessState {
        match (&self.token, &self.role_tag) {
            (None, _) => AccessState::Unauthenticated,
            (Some(_), Some(tag)) => match Role::from_tag(tag) {
                Some(role) => AccessState::Authenticated(role),
                None => AccessState::UnknownRole,
            },
            (Some(_), None) => AccessState::UnknownRole,
        }
    }
}

/// AccessState
///
/// Routing-relevant view of a session. `UnknownRole` holds a token whose role tag is
/// missing or unrecognised; it routes exactly like `Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Unauthenticated,
    Authenticated(Role),
    UnknownRole,
}

impl AccessState {
    pub fn role(self) -> Option<Role> {
        match self {
            AccessState::Authenticated(role) => Some(role),
            _ => None,
        }
    }

    pub fn is_authenticated(self) -> bool {
        self.role().is_some()
    }
}

/// SessionProvider
///
/// Owns the session storage and is the only place the session is mutated.
/// The initial state is derived from storage, so a reload reconstructs the same state
/// instead of forcing a new login. Every mutation is published to subscribers.
pub struct SessionProvider<S: SessionStorage> {
    storage: S,
    session: Session,
    state_tx: watch::Sender<AccessState>,
}

impl<S: SessionStorage> SessionProvider<S> {
    pub fn new(storage: S) -> Self {
        let session = Session::load(&storage);
        let (state_tx, _) = watch::channel(session.access_state());
        Self {
            storage,
            session,
            state_tx,
        }
    }

    pub fn state(&self) -> AccessState {
        *self.state_tx.borrow()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    /// Receiver that observes every subsequent transition.
    pub fn subscribe(&self) -> watch::Receiver<AccessState> {
        self.state_tx.subscribe()
    }

    /// establish
    ///
    /// Persists a freshly granted session. Token and role tag are written together.
    /// An unrecognised role tag is stored as-is and yields `AccessState::UnknownRole`.
    /// The resulting state is read back from storage, so it is the state the next
    /// request will see.
    pub fn establish(&mut self, token: &str, role_tag: &str) -> AccessState {
        self.storage.set(TOKEN_KEY, token);
        self.storage.set(ROLE_KEY, role_tag);
        self.session = Session::load(&self.storage);
        self.publish()
    }

    /// clear
    ///
    /// Ends the session (logout or completed password change). Both values are removed
    /// regardless of whether the role tag was valid.
    pub fn clear(&mut self) -> AccessState {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(ROLE_KEY);
        self.session = Session::default();
        self.publish()
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn publish(&mut self) -> AccessState {
        let next = self.session.access_state();
        let previous = self.state_tx.send_replace(next);
        if previous != next {
            tracing::debug!(?previous, ?next, "session state changed");
        }
        next
    }
}
