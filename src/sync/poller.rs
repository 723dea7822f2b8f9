//! Polling backstop
//!
//! Storage events are the primary way other tabs learn about cart changes.
//! Some back ends raise none (files shared between processes), and events can
//! be missed, so the stored value is also re-read on a timer and compared
//! with what was last seen.

use std::{hash::BuildHasher, time::Duration};

use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::{
    persistence::{Storage, StorageError},
    sync::{ChangeOrigin, SyncChannel},
};

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Detects changes to a stored key by fingerprinting its raw value.
#[derive(Debug, Clone)]
pub struct StoragePoller {
    key: String,
    fingerprint: Option<u64>,
}

impl StoragePoller {
    /// Creates a poller for `key` that has seen nothing yet.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fingerprint: None,
        }
    }

    /// Records the current value without reporting it as a change.
    pub fn prime<S: Storage>(&mut self, storage: &S) {
        if let Ok(fingerprint) = self.read(storage) {
            self.fingerprint = fingerprint;
        }
    }

    /// Re-reads the key, returning `true` if it changed since the last poll.
    ///
    /// Unreadable storage counts as unchanged.
    pub fn poll<S: Storage>(&mut self, storage: &S) -> bool {
        let Ok(fingerprint) = self.read(storage) else {
            return false;
        };

        if fingerprint == self.fingerprint {
            return false;
        }

        self.fingerprint = fingerprint;

        true
    }

    /// Polls and queues a [`ChangeOrigin::Poll`] signal on change.
    pub fn poll_into<S: Storage>(&mut self, storage: &S, channel: &SyncChannel) -> bool {
        let changed = self.poll(storage);

        if changed {
            channel.notify_from(ChangeOrigin::Poll);
        }

        changed
    }

    fn read<S: Storage>(&self, storage: &S) -> Result<Option<u64>, StorageError> {
        let raw = storage.get_item(&self.key).inspect_err(|error| {
            debug!(key = %self.key, %error, "poll could not read storage");
        })?;

        Ok(raw.map(|value| FxBuildHasher.hash_one(value)))
    }
}
