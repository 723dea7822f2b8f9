//! Key-value storage

use std::io;

use thiserror::Error;

/// Errors raised by a storage back end.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error from a file-backed store
    #[error("storage IO failed: {0}")]
    Io(#[from] io::Error),

    /// Writing would exceed the storage quota
    #[error("storage quota of {limit} bytes exceeded ({attempted} bytes requested)")]
    QuotaExceeded {
        /// Quota in bytes
        limit: usize,
        /// Bytes the write would have used
        attempted: usize,
    },

    /// Storage is disabled or otherwise unreachable
    #[error("storage is unavailable")]
    Unavailable,

    /// The key cannot be used by this back end
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// String key-value storage shaped like the browser's `localStorage`.
pub trait Storage {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the back end cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the back end cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}
