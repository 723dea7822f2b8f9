//! File-backed storage

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::persistence::storage::{Storage, StorageError};

/// Storage keeping one `<key>.json` file per key inside a directory.
///
/// Other processes sharing the directory see writes only by re-reading, so
/// pair this with [`crate::sync::StoragePoller`] to observe them.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored keys.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir)?;
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn round_trips_values() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get_item("cart-items")?, None);

        storage.set_item("cart-items", "[]")?;

        assert_eq!(storage.get_item("cart-items")?.as_deref(), Some("[]"));
        assert!(dir.path().join("nested/cart-items.json").exists());

        Ok(())
    }

    #[test]
    fn removing_missing_key_is_not_an_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path());

        storage.remove_item("cart-items")?;
        storage.set_item("cart-items", "[]")?;
        storage.remove_item("cart-items")?;

        assert_eq!(storage.get_item("cart-items")?, None);

        Ok(())
    }

    #[test]
    fn rejects_keys_escaping_the_directory() {
        let storage = FileStorage::new("unused");

        for key in ["", "../cart", "a/b", ".hidden"] {
            assert!(
                matches!(storage.get_item(key), Err(StorageError::InvalidKey(_))),
                "expected {key:?} to be rejected"
            );
        }
    }
}
