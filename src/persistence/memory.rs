//! In-memory storage shared between tabs

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::persistence::storage::{Storage, StorageError};

new_key_type! {
    /// Storage watcher key
    pub struct WatcherKey;
}

/// Native change notification raised in every tab except the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that changed
    pub key: String,

    /// Value before the change
    pub old_value: Option<String>,

    /// Value after the change, `None` when the key was removed
    pub new_value: Option<String>,
}

type Watcher = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

struct Backing {
    items: FxHashMap<String, String>,
    watchers: SlotMap<WatcherKey, (u64, Watcher)>,
    quota: Option<usize>,
    available: bool,
    next_tab: u64,
}

impl Backing {
    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

/// Storage kept in memory and shared by every tab opened from it.
///
/// Each handle is a tab: writes through one handle raise [`StorageEvent`]s
/// in the watchers of all other tabs, never in the writer's own.
#[derive(Clone)]
pub struct MemoryStorage {
    backing: Arc<Mutex<Backing>>,
    tab: u64,
}

impl MemoryStorage {
    /// Creates empty storage and returns its first tab.
    pub fn new() -> Self {
        Self {
            backing: Arc::new(Mutex::new(Backing {
                items: FxHashMap::default(),
                watchers: SlotMap::with_key(),
                quota: None,
                available: true,
                next_tab: 1,
            })),
            tab: 0,
        }
    }

    /// Creates empty storage limited to `bytes` of keys and values.
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::new();
        storage.lock().quota = Some(bytes);
        storage
    }

    /// Opens another tab over the same storage.
    #[must_use]
    pub fn open_tab(&self) -> Self {
        let mut backing = self.lock();
        let tab = backing.next_tab;
        backing.next_tab += 1;

        Self {
            backing: Arc::clone(&self.backing),
            tab,
        }
    }

    /// Enables or disables the storage for every tab.
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Registers a watcher for changes made by other tabs.
    pub fn on_external_change(
        &self,
        watcher: impl Fn(&StorageEvent) + Send + Sync + 'static,
    ) -> WatcherKey {
        self.lock().watchers.insert((self.tab, Arc::new(watcher)))
    }

    /// Removes a watcher, returning `true` if it was registered.
    pub fn remove_watcher(&self, key: WatcherKey) -> bool {
        self.lock().watchers.remove(key).is_some()
    }

    /// Whether `key` currently holds a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().items.contains_key(key)
    }

    fn lock(&self) -> MutexGuard<'_, Backing> {
        self.backing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn other_tabs(&self, backing: &Backing) -> SmallVec<[Watcher; 4]> {
        backing
            .watchers
            .values()
            .filter(|(tab, _)| *tab != self.tab)
            .map(|(_, watcher)| Arc::clone(watcher))
            .collect()
    }
}

fn dispatch(watchers: SmallVec<[Watcher; 4]>, event: &StorageEvent) {
    for watcher in watchers {
        watcher(event);
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for MemoryStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let backing = self.lock();

        f.debug_struct("MemoryStorage")
            .field("tab", &self.tab)
            .field("keys", &backing.items.len())
            .field("watchers", &backing.watchers.len())
            .field("available", &backing.available)
            .finish()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let backing = self.lock();

        if !backing.available {
            return Err(StorageError::Unavailable);
        }

        Ok(backing.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let (watchers, event) = {
            let mut backing = self.lock();

            if !backing.available {
                return Err(StorageError::Unavailable);
            }

            if let Some(limit) = backing.quota {
                let attempted = backing.used_bytes_without(key) + key.len() + value.len();

                if attempted > limit {
                    return Err(StorageError::QuotaExceeded { limit, attempted });
                }
            }

            let old_value = backing.items.insert(key.to_string(), value.to_string());

            if old_value.as_deref() == Some(value) {
                return Ok(());
            }

            let event = StorageEvent {
                key: key.to_string(),
                old_value,
                new_value: Some(value.to_string()),
            };

            (self.other_tabs(&backing), event)
        };

        dispatch(watchers, &event);

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let (watchers, event) = {
            let mut backing = self.lock();

            if !backing.available {
                return Err(StorageError::Unavailable);
            }

            let Some(old_value) = backing.items.remove(key) else {
                return Ok(());
            };

            let event = StorageEvent {
                key: key.to_string(),
                old_value: Some(old_value),
                new_value: None,
            };

            (self.other_tabs(&backing), event)
        };

        dispatch(watchers, &event);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn tabs_share_values() -> TestResult {
        let first = MemoryStorage::new();
        let second = first.open_tab();

        first.set_item("cart", "[]")?;

        assert_eq!(second.get_item("cart")?.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn writes_notify_other_tabs_only() -> TestResult {
        let first = MemoryStorage::new();
        let second = first.open_tab();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for (name, tab) in [("first", &first), ("second", &second)] {
            let seen = Arc::clone(&seen);

            tab.on_external_change(move |event| {
                seen.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((name, event.key.clone()));
            });
        }

        first.set_item("cart", "[1]")?;

        let seen = seen.lock().unwrap_or_else(PoisonError::into_inner).clone();
        assert_eq!(seen, vec![("second", "cart".to_string())]);

        Ok(())
    }

    #[test]
    fn unchanged_writes_and_missing_removals_are_silent() -> TestResult {
        let first = MemoryStorage::new();
        let second = first.open_tab();
        let events = Arc::new(Mutex::new(0_usize));

        let counter = Arc::clone(&events);
        second.on_external_change(move |_| {
            *counter.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        });

        first.set_item("cart", "[1]")?;
        first.set_item("cart", "[1]")?;
        first.remove_item("missing")?;

        assert_eq!(*events.lock().unwrap_or_else(PoisonError::into_inner), 1);

        Ok(())
    }

    #[test]
    fn removed_watchers_stop_receiving() -> TestResult {
        let first = MemoryStorage::new();
        let second = first.open_tab();
        let events = Arc::new(Mutex::new(0_usize));

        let counter = Arc::clone(&events);
        let key = second.on_external_change(move |_| {
            *counter.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        });

        assert!(second.remove_watcher(key));
        first.set_item("cart", "[1]")?;

        assert_eq!(*events.lock().unwrap_or_else(PoisonError::into_inner), 0);

        Ok(())
    }

    #[test]
    fn quota_rejects_oversized_writes() -> TestResult {
        let storage = MemoryStorage::with_quota(10);

        storage.set_item("k", "short")?;

        let result = storage.set_item("k", "far too long for the quota");

        assert!(matches!(
            result,
            Err(StorageError::QuotaExceeded { limit: 10, .. })
        ));
        assert_eq!(storage.get_item("k")?.as_deref(), Some("short"));

        Ok(())
    }

    #[test]
    fn unavailable_storage_rejects_everything() {
        let storage = MemoryStorage::new();
        storage.set_available(false);

        assert!(matches!(storage.get_item("k"), Err(StorageError::Unavailable)));
        assert!(matches!(
            storage.set_item("k", "v"),
            Err(StorageError::Unavailable)
        ));
        assert!(matches!(storage.remove_item("k"), Err(StorageError::Unavailable)));
    }
}
