use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use crate::{
    errors::SessionError,
    models::{Role, SignInRequest},
};

// --- Storage Keys ---

/// SessionKey
///
/// The three plain-string keys that make up a browser session. Their string names are
/// the storage contract shared with the front-end and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Token,
    UserRole,
    UserName,
}

impl SessionKey {
    /// Every key, in the order `Session::clear` removes them.
    pub const ALL: [SessionKey; 3] = [SessionKey::Token, SessionKey::UserRole, SessionKey::UserName];

    /// The storage key name.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKey::Token => "token",
            SessionKey::UserRole => "userRole",
            SessionKey::UserName => "userName",
        }
    }
}

// 1. SessionStore Contract
/// SessionStore
///
/// Abstract key-value storage holding the session. The guard and the request decoration
/// only ever see this trait, so tests can swap the persisted store for an in-memory one.
///
/// Stores give no cross-writer guarantees: two holders of the same persisted store
/// (two tabs, two processes) race and the last write wins.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: SessionKey) -> Option<String>;
    fn set(&self, key: SessionKey, value: &str);
    fn remove(&self, key: SessionKey);
}

/// SessionState
///
/// Type alias for the shared, thread-safe store handle.
pub type SessionState = Arc<dyn SessionStore>;

// 2. In-Memory Store
/// MemorySessionStore
///
/// Lives as long as the process. Used for tests and for session-scoped state that
/// should not outlive the program.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&key).cloned()
    }

    fn set(&self, key: SessionKey, value: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, value.to_string());
    }

    fn remove(&self, key: SessionKey) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&key);
    }
}

// 3. Persisted Store
/// FileSessionStore
///
/// Persists the session as a flat JSON object of strings, rewriting the whole file on
/// every mutation. Keys it does not know about are preserved.
///
/// A failed write is logged and otherwise ignored: the in-memory copy stays
/// authoritative for this process.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// open
    ///
    /// Loads the file at `path`. A missing file is an empty session, not an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        let result = serde_json::to_string_pretty(entries)
            .map_err(std::io::Error::from)
            .and_then(|json| fs::write(&self.path, json));

        if let Err(e) = result {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to persist session file"
            );
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key.as_str()).cloned()
    }

    fn set(&self, key: SessionKey, value: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.as_str().to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: SessionKey) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key.as_str()).is_some() {
            self.persist(&entries);
        }
    }
}

// --- Typed Accessor ---

/// Session
///
/// The single session accessor handed to the guard, the navigator and the API client.
/// Cloning is cheap and every clone reads and writes the same store.
#[derive(Clone)]
pub struct Session {
    store: SessionState,
}

impl Session {
    pub fn new(store: SessionState) -> Self {
        Self { store }
    }

    /// A fresh session over a `MemorySessionStore`.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// The stored token. An empty string counts as no token.
    pub fn token(&self) -> Option<String> {
        self.store
            .get(SessionKey::Token)
            .filter(|token| !token.is_empty())
    }

    /// The stored role, if it is one of the recognised values.
    pub fn role(&self) -> Option<Role> {
        self.store
            .get(SessionKey::UserRole)
            .and_then(|raw| raw.parse().ok())
    }

    /// Display name saved at sign-in. Not consulted by the guard.
    pub fn user_name(&self) -> Option<String> {
        self.store.get(SessionKey::UserName)
    }

    /// Token presence is all "authenticated" means here; the token is never inspected.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The `Authorization` header value for outgoing requests.
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {token}"))
    }

    /// sign_in
    ///
    /// Writes the token, role and user name. Keys are written one by one; a concurrent
    /// reader may briefly see a token without its role.
    pub fn sign_in(&self, credential: &SignInRequest) {
        self.store.set(SessionKey::Token, &credential.token);
        self.store.set(SessionKey::UserRole, credential.role.as_str());
        self.store.set(SessionKey::UserName, &credential.user_name);
    }

    /// Removes all three keys. Used for sign-out and after a 401.
    pub fn clear(&self) {
        for key in SessionKey::ALL {
            self.store.remove(key);
        }
    }

    /// Raw access to the underlying store.
    pub fn store(&self) -> &SessionState {
        &self.store
    }
}
