//! Key-value persistence. Values are JSON strings; keys live in one of two
//! scopes. Local entries persist indefinitely, session entries only until the
//! session is reset (`clear`).

use crate::error::StorageError;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const QUOTES_KEY: &str = "quotes";
pub const LAST_VIEWED_KEY: &str = "last_viewed";
pub const FILTER_KEY: &str = "category_filter";

const SESSION_DIR: &str = "session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Local,
    Session,
}

pub trait KeyValueStore {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StorageError>;
    fn set(
        &mut self,
        scope: Scope,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError>;
    fn remove(&mut self, scope: Scope, key: &str) -> Result<(), StorageError>;
    fn clear_scope(&mut self, scope: Scope) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key under the data directory; session keys go
/// in a `session/` subdirectory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: &Path) -> io::Result<Self> {
        ensure_dir(root)?;
        Ok(Self { root: root.to_path_buf() })
    }

    fn scope_dir(&self, scope: Scope) -> PathBuf {
        match scope {
            Scope::Local => self.root.clone(),
            Scope::Session => self.root.join(SESSION_DIR),
        }
    }

    pub fn key_path(&self, scope: Scope, key: &str) -> PathBuf {
        self.scope_dir(scope).join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(scope, key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(
        &mut self,
        scope: Scope,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        let dir = self.scope_dir(scope);
        ensure_dir(&dir).map_err(map_write_error)?;
        let path = self.key_path(scope, key);
        let tmp = dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value).map_err(map_write_error)?;
        fs::rename(&tmp, &path).map_err(map_write_error)?;
        debug!("event=store_write key={key} bytes={}", value.len());
        Ok(())
    }

    fn remove(&mut self, scope: Scope, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.key_path(scope, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear_scope(&mut self, scope: Scope) -> Result<(), StorageError> {
        let dir = self.scope_dir(scope);
        if !dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file()
                && entry.path().extension().and_then(|s| s.to_str())
                    == Some("json")
            {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

fn map_write_error(err: io::Error) -> StorageError {
    if err.kind() == io::ErrorKind::StorageFull {
        StorageError::QuotaExceeded
    } else {
        StorageError::Io(err)
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// In-process store for tests and embedders. `fail_writes` simulates a full
/// backing store, `fail_reads` an unreadable one.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<(Scope, String), String>,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail_writes: true, ..Self::default() }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(io::Error::other("simulated read failure").into());
        }
        Ok(self.entries.get(&(scope, key.to_string())).cloned())
    }

    fn set(
        &mut self,
        scope: Scope,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded);
        }
        self.entries.insert((scope, key.to_string()), value.to_string());
        Ok(())
    }

    fn remove(&mut self, scope: Scope, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded);
        }
        self.entries.remove(&(scope, key.to_string()));
        Ok(())
    }

    fn clear_scope(&mut self, scope: Scope) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded);
        }
        self.entries.retain(|(s, _), _| *s != scope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip_and_missing() {
        let tmp = tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        assert_eq!(store.get(Scope::Local, "k").unwrap(), None);

        store.set(Scope::Local, "k", "[1]").unwrap();
        assert_eq!(store.get(Scope::Local, "k").unwrap().as_deref(), Some("[1]"));
        assert!(tmp.path().join("k.json").exists());

        store.remove(Scope::Local, "k").unwrap();
        assert_eq!(store.get(Scope::Local, "k").unwrap(), None);
        // Removing twice is fine.
        store.remove(Scope::Local, "k").unwrap();
    }

    #[test]
    fn test_file_store_session_scope_is_separate() {
        let tmp = tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        store.set(Scope::Session, "last_viewed", "2").unwrap();
        store.set(Scope::Local, "quotes", "[]").unwrap();
        assert!(tmp.path().join("session").join("last_viewed.json").exists());

        store.clear_scope(Scope::Session).unwrap();
        assert_eq!(store.get(Scope::Session, "last_viewed").unwrap(), None);
        assert_eq!(store.get(Scope::Local, "quotes").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_store_failing_writes() {
        let mut store = MemoryStore::failing();
        let err = store.set(Scope::Local, "quotes", "[]").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded));
        assert_eq!(store.get(Scope::Local, "quotes").unwrap(), None);
        assert!(store.clear_scope(Scope::Session).is_err());
    }

    #[test]
    fn test_memory_store_failing_reads() {
        let mut store = MemoryStore::new();
        store.set(Scope::Local, "quotes", "[]").unwrap();
        store.fail_reads = true;
        assert!(matches!(
            store.get(Scope::Local, "quotes").unwrap_err(),
            StorageError::Io(_)
        ));
    }
}
