use std::{
    fs,
    path::PathBuf,
};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ClientError;
use crate::auth::Role;

/// What survives between runs: the bearer token and who it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub username: String,
    /// Advisory only, for hiding admin screens. The server re-checks.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Durable key-value backing for a [`Session`].
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionData>, ClientError>;
    fn save(&self, data: &SessionData) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// Keeps the session as a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionData>, ClientError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, data: &SessionData) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json =
            serde_json::to_vec_pretty(data).map_err(|e| ClientError::Decode(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<SessionData>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionData>, ClientError> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, data: &SessionData) -> Result<(), ClientError> {
        *self.inner.lock() = Some(data.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.inner.lock() = None;
        Ok(())
    }
}

/// The current login, shared by every component that needs it as
/// `Arc<Session>`. Reads come from memory and writes go through to the store.
pub struct Session {
    store: Box<dyn SessionStore>,
    current: RwLock<Option<SessionData>>,
}

impl Session {
    /// Opens a session, restoring whatever the store holds.
    pub fn open(store: impl SessionStore + 'static) -> Result<Self, ClientError> {
        let current = store.load()?;
        debug!(restored = current.is_some(), "session opened");
        Ok(Self {
            store: Box::new(store),
            current: RwLock::new(current),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemorySessionStore::default()),
            current: RwLock::new(None),
        }
    }

    pub fn read(&self) -> Option<SessionData> {
        self.current.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self.current.read().as_ref().and_then(|s| s.role),
            Some(Role::Admin)
        )
    }

    pub fn write(&self, data: SessionData) -> Result<(), ClientError> {
        self.store.save(&data)?;
        *self.current.write() = Some(data);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        *self.current.write() = None;
        self.store.clear()
    }
}
