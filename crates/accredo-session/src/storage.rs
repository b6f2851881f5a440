use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use accredo_core::{Session, SESSION_STORAGE_KEY};
use thiserror::Error;
use tracing::debug;

const KEYRING_SERVICE: &str = "accredo";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage holds an unreadable record: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("keyring error: {message}")]
    Keyring { message: String },
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Persisted copy of the session, read once at startup.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<Session>, StorageError>;
    fn save(&self, session: &Session) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON file holding the session under [`SESSION_STORAGE_KEY`].
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let mut record: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&contents)?;
        let Some(value) = record.remove(SESSION_STORAGE_KEY) else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(value)?))
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut record = serde_json::Map::new();
        record.insert(
            SESSION_STORAGE_KEY.to_string(),
            serde_json::to_value(session)?,
        );
        let contents = serde_json::to_string_pretty(&record)?;
        write_private(&self.path, contents.as_bytes())?;
        debug!(event = "session_persisted", path = %self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Owner-only from creation; a file left over with wider bits is narrowed first.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    if path.exists() {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    fs::write(path, contents)?;
    Ok(())
}

/// OS keychain entry under service `accredo`, account [`SESSION_STORAGE_KEY`].
pub struct KeyringSessionStorage;

impl KeyringSessionStorage {
    fn entry(&self) -> Result<keyring::Entry, StorageError> {
        keyring::Entry::new(KEYRING_SERVICE, SESSION_STORAGE_KEY).map_err(keyring_error)
    }
}

fn keyring_error(err: keyring::Error) -> StorageError {
    StorageError::Keyring {
        message: err.to_string(),
    }
}

impl SessionStorage for KeyringSessionStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        match self.entry()?.get_password() {
            Ok(value) => Ok(Some(serde_json::from_str(&value)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(keyring_error(err)),
        }
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        let value = serde_json::to_string(session)?;
        self.entry()?.set_password(&value).map_err(keyring_error)
    }

    fn clear(&self) -> Result<(), StorageError> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(keyring_error(err)),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStorage {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        Ok(self
            .session
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .clone())
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        *self.session.lock().map_err(|_| StorageError::Poisoned)? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.session.lock().map_err(|_| StorageError::Poisoned)? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accredo_core::{TokenPair, UserProfile};
    use tempfile::tempdir;

    fn session() -> Session {
        Session::new(
            TokenPair {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
            },
            UserProfile {
                id: "1".to_string(),
                slug: Some("ada".to_string()),
                email: Some("a@b.com".to_string()),
                name: None,
                first_name: None,
                last_name: None,
            },
        )
    }

    #[test]
    fn file_storage_persists_under_fixed_key() {
        let dir = tempdir().expect("tempdir");
        let storage = FileSessionStorage::in_dir(dir.path());
        assert!(storage.load().expect("load").is_none());

        storage.save(&session()).expect("save");
        let raw = fs::read_to_string(storage.path()).expect("read");
        assert!(raw.contains(SESSION_STORAGE_KEY));
        assert_eq!(storage.load().expect("load"), Some(session()));

        storage.clear().expect("clear");
        assert!(storage.load().expect("load").is_none());
        storage.clear().expect("clear twice");
    }

    #[cfg(unix)]
    #[test]
    fn file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().expect("tempdir");
        let storage = FileSessionStorage::in_dir(dir.path());
        storage.save(&session()).expect("save");
        let mode = fs::metadata(storage.path())
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[cfg(unix)]
    #[test]
    fn file_storage_narrows_existing_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().expect("tempdir");
        let storage = FileSessionStorage::in_dir(dir.path());
        fs::write(storage.path(), "{}").expect("seed");
        fs::set_permissions(storage.path(), fs::Permissions::from_mode(0o644)).expect("chmod");

        storage.save(&session()).expect("save");
        let mode = fs::metadata(storage.path())
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(storage.load().expect("load"), Some(session()));
    }

    #[test]
    fn file_storage_reports_corrupt_record() {
        let dir = tempdir().expect("tempdir");
        let storage = FileSessionStorage::in_dir(dir.path());
        fs::write(storage.path(), "not json").expect("write");
        assert!(matches!(storage.load(), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn memory_storage_roundtrip() {
        let storage = MemorySessionStorage::new();
        storage.save(&session()).expect("save");
        assert_eq!(storage.load().expect("load"), Some(session()));
        storage.clear().expect("clear");
        assert!(storage.load().expect("load").is_none());
    }
}
