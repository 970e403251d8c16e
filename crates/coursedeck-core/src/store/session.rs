// ── Process-durable key/value storage ──
//
// One JSON file per key inside a directory. Writes go through a
// temporary file and a rename so a crash never leaves a torn value.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CoreError;

/// Durable storage for small session values (e.g. the logged-in user).
#[derive(Debug, Clone)]
pub struct SessionStorage {
    dir: PathBuf,
}

impl SessionStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read the value stored under `key`, or `None` if there is none.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CoreError> {
        let raw = match std::fs::read_to_string(self.path(key)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        std::fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        std::fs::rename(&tmp, &path)?;

        debug!(key, path = %path.display(), "session value stored");
        Ok(())
    }

    /// Delete the value under `key`. Missing values are not an error.
    pub fn remove(&self, key: &str) -> Result<(), CoreError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => {
                debug!(key, "session value removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path());
        assert_eq!(storage.load::<String>("nothing").unwrap(), None);
    }

    #[test]
    fn store_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("nested"));

        storage.store("k", &vec![1, 2, 3]).unwrap();
        assert_eq!(storage.load::<Vec<i32>>("k").unwrap(), Some(vec![1, 2, 3]));

        storage.remove("k").unwrap();
        assert_eq!(storage.load::<Vec<i32>>("k").unwrap(), None);
        storage.remove("k").unwrap();
    }

    #[test]
    fn corrupt_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("k.json"), "{not json").unwrap();
        let storage = SessionStorage::new(dir.path());
        assert!(matches!(
            storage.load::<Vec<i32>>("k"),
            Err(CoreError::Storage { .. })
        ));
    }
}
