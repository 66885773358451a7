//! Session persistence for hydration on restart.
//!
//! `SessionFile` is a [`CredentialObserver`] that mirrors every store change
//! to a JSON file, and can load that file back at startup. Persistence stays
//! a pluggable collaborator: the gateway itself never touches the filesystem.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use crate::store::{CredentialChange, CredentialObserver, SessionSnapshot};

/// Errors reading or writing the session file.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON-file-backed session persistence.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load a previously persisted snapshot, if the file exists.
    pub fn load(&self) -> Result<Option<SessionSnapshot>, PersistError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Persist a snapshot. Writes to a sibling temp file first so a crash
    /// mid-write cannot leave a truncated session file.
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(snapshot)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Remove the persisted session, ignoring an already-missing file.
    pub fn remove(&self) -> Result<(), PersistError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialObserver for SessionFile {
    // Persistence is best-effort: a full disk must not fail a login.
    fn on_change(&self, change: &CredentialChange) {
        let result = match change {
            CredentialChange::LoggedIn(snapshot) | CredentialChange::Refreshed(snapshot) => {
                self.save(snapshot)
            }
            CredentialChange::Cleared => self.remove(),
        };
        match result {
            Ok(()) => debug!(path = %self.path.display(), "session file updated"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "session file update failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CredentialStore, Identity};
    use std::sync::Arc;

    fn identity() -> Identity {
        Identity {
            username: "minho".to_string(),
            nickname: "Minho".to_string(),
            roles: vec!["USER".to_string(), "ADMIN".to_string()],
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));

        assert!(file.load().unwrap().is_none());

        let store = CredentialStore::new();
        store.set_session("tok-1".to_string(), identity());
        file.save(&store.snapshot()).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("tok-1"));
        assert_eq!(loaded.identity.unwrap().username, "minho");
    }

    #[test]
    fn test_observer_mirrors_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = CredentialStore::new();
        store.observe(Arc::new(SessionFile::new(path.clone())));

        store.set_session("tok-1".to_string(), identity());
        assert!(path.exists());

        store.set_access_token("tok-2".to_string());
        let loaded = SessionFile::new(path.clone()).load().unwrap().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("tok-2"));

        store.clear();
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("absent.json"));
        file.remove().unwrap();
    }
}
