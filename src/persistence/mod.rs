//! Cart persistence
//!
//! Round-trips the cart to a single storage key as a JSON array of entries.
//! Keys written by earlier generations of the cart are deleted on every load;
//! their contents are never migrated.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::entries::CartEntry;

pub mod file;
pub mod memory;
pub mod storage;

pub use file::FileStorage;
pub use memory::{MemoryStorage, StorageEvent, WatcherKey};
pub use storage::{Storage, StorageError};

/// Key holding the current cart.
pub const DEFAULT_STORAGE_KEY: &str = "cart-items";

/// Keys used by earlier versions of the cart.
pub const LEGACY_STORAGE_KEYS: [&str; 2] = ["cart", "cartItems"];

/// Errors reading the persisted cart.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The storage back end failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The stored value is not a JSON array of cart entries
    #[error("malformed cart data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Outcome of writing the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    /// The entries were written under the cart key.
    Written,

    /// The cart was empty, so the key was deleted.
    Cleared,

    /// The storage rejected the write; details were logged.
    Failed,
}

/// Reads and writes the cart under one storage key.
#[derive(Debug, Clone)]
pub struct CartPersistence<S: Storage> {
    storage: S,
    key: String,
    legacy_keys: SmallVec<[String; 2]>,
}

impl<S: Storage> CartPersistence<S> {
    /// Persistence under [`DEFAULT_STORAGE_KEY`], cleaning up [`LEGACY_STORAGE_KEYS`].
    pub fn new(storage: S) -> Self {
        Self::with_keys(storage, DEFAULT_STORAGE_KEY, LEGACY_STORAGE_KEYS)
    }

    /// Persistence under a custom key and legacy key list.
    pub fn with_keys<K: Into<String>>(
        storage: S,
        key: impl Into<String>,
        legacy_keys: impl IntoIterator<Item = K>,
    ) -> Self {
        let key = key.into();

        Self {
            legacy_keys: legacy_keys
                .into_iter()
                .map(Into::into)
                .filter(|legacy| *legacy != key)
                .collect(),
            storage,
            key,
        }
    }

    /// Key the cart is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Loads the cart, treating any failure as an empty cart.
    pub fn load(&self) -> Vec<CartEntry> {
        self.read().unwrap_or_else(|error| {
            warn!(key = %self.key, %error, "could not load cart, starting empty");
            Vec::new()
        })
    }

    /// Loads the cart, reporting why it could not be read.
    ///
    /// Legacy keys are deleted whether or not the read succeeds. Rows without
    /// an id or units, rows repeating an id and rows that would overflow the
    /// cart total are dropped; configuration-equal rows are folded into the
    /// first of them.
    ///
    /// # Errors
    ///
    /// - [`PersistenceError::Storage`]: the storage could not be read.
    /// - [`PersistenceError::Malformed`]: the stored value is not a list of entries.
    pub fn read(&self) -> Result<Vec<CartEntry>, PersistenceError> {
        self.remove_legacy_keys();

        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(Vec::new());
        };

        let entries: Vec<CartEntry> = serde_json::from_str(&raw)?;

        Ok(sanitize(entries))
    }

    /// Writes the cart. An empty cart deletes the key instead.
    pub fn save(&self, entries: &[CartEntry]) -> Persisted {
        if entries.is_empty() {
            return match self.storage.remove_item(&self.key) {
                Ok(()) => Persisted::Cleared,
                Err(error) => {
                    warn!(key = %self.key, %error, "could not clear stored cart");
                    Persisted::Failed
                }
            };
        }

        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(error) => {
                warn!(key = %self.key, %error, "could not serialize cart");
                return Persisted::Failed;
            }
        };

        match self.storage.set_item(&self.key, &json) {
            Ok(()) => Persisted::Written,
            Err(error) => {
                warn!(key = %self.key, %error, "could not save cart");
                Persisted::Failed
            }
        }
    }

    fn remove_legacy_keys(&self) {
        for legacy in &self.legacy_keys {
            if let Err(error) = self.storage.remove_item(legacy) {
                debug!(key = %legacy, %error, "could not remove legacy cart key");
            }
        }
    }
}

fn sanitize(entries: Vec<CartEntry>) -> Vec<CartEntry> {
    let mut seen = FxHashSet::default();
    let mut running_total = Decimal::ZERO;
    let mut kept: Vec<CartEntry> = Vec::with_capacity(entries.len());

    for mut entry in entries {
        if entry.id.is_empty() || !entry.normalize() {
            warn!(id = %entry.id, "dropping stored cart entry without id or quantity");
            continue;
        }

        if !seen.insert(entry.id.clone()) {
            warn!(id = %entry.id, "dropping stored cart entry with duplicate id");
            continue;
        }

        let Some(total) = running_total.checked_add(entry.total_price) else {
            warn!(
                id = %entry.id,
                "dropping stored cart entry whose price overflows the cart total"
            );
            continue;
        };

        running_total = total;

        if let Some(existing) = kept
            .iter_mut()
            .find(|existing| existing.is_configuration_equal(&entry))
        {
            debug!(id = %existing.id, absorbed = %entry.id, "folding equal stored cart entries");
            existing.absorb(&entry);
            continue;
        }

        kept.push(entry);
    }

    kept
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use testresult::TestResult;

    use crate::{
        configurator::{Selections, configure},
        products::ProductDefinition,
    };

    use super::*;

    fn store_raw(storage: &MemoryStorage, entries: &[CartEntry]) -> TestResult {
        storage.set_item(DEFAULT_STORAGE_KEY, &serde_json::to_string(entries)?)?;

        Ok(())
    }

    fn plain(id: &str, quantity: u32) -> CartEntry {
        let product = ProductDefinition::new("burger", "Burger", dec!(20));

        configure(&product, Selections::new().quantity(quantity).existing_id(id))
    }

    /// A row whose note makes it distinct from every other id.
    fn entry(id: &str, quantity: u32) -> CartEntry {
        let mut entry = plain(id, quantity);
        entry.observation = format!("for {id}");
        entry
    }

    #[test]
    fn missing_key_loads_empty_cart() {
        let persistence = CartPersistence::new(MemoryStorage::new());

        assert!(persistence.load().is_empty());
    }

    #[test]
    fn malformed_values_load_empty_cart() -> TestResult {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::new(&storage);

        for raw in ["not json", r#"{"id":"x"}"#, r#"[{"id":"x"}]"#, "42"] {
            storage.set_item(DEFAULT_STORAGE_KEY, raw)?;

            assert!(
                matches!(persistence.read(), Err(PersistenceError::Malformed(_))),
                "expected {raw:?} to be rejected"
            );
            assert!(persistence.load().is_empty());
        }

        Ok(())
    }

    #[test]
    fn unavailable_storage_loads_empty_cart() {
        let storage = MemoryStorage::new();
        storage.set_available(false);
        let persistence = CartPersistence::new(&storage);

        assert!(matches!(
            persistence.read(),
            Err(PersistenceError::Storage(StorageError::Unavailable))
        ));
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let persistence = CartPersistence::new(MemoryStorage::new());
        let entries = vec![entry("a", 1), entry("b", 2)];

        assert_eq!(persistence.save(&entries), Persisted::Written);
        assert_eq!(persistence.load(), entries);
    }

    #[test]
    fn saving_loaded_cart_is_a_fixed_point() -> TestResult {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::new(&storage);

        persistence.save(&[entry("a", 1), entry("b", 3)]);
        let before = storage.get_item(DEFAULT_STORAGE_KEY)?;

        persistence.save(&persistence.load());

        assert_eq!(storage.get_item(DEFAULT_STORAGE_KEY)?, before);

        Ok(())
    }

    #[test]
    fn empty_cart_deletes_the_key() {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::new(&storage);

        persistence.save(&[entry("a", 1)]);

        assert_eq!(persistence.save(&[]), Persisted::Cleared);
        assert!(!storage.contains_key(DEFAULT_STORAGE_KEY));
    }

    #[test]
    fn load_deletes_legacy_keys() -> TestResult {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::new(&storage);

        storage.set_item("cart", "garbage")?;
        storage.set_item("cartItems", "[]")?;

        persistence.load();

        assert!(!storage.contains_key("cart"));
        assert!(!storage.contains_key("cartItems"));

        Ok(())
    }

    #[test]
    fn current_key_is_never_treated_as_legacy() {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::with_keys(&storage, "cart", ["cart", "old"]);

        persistence.save(&[entry("a", 1)]);

        assert_eq!(persistence.load().len(), 1);
        assert!(storage.contains_key("cart"));
    }

    #[test]
    fn failed_write_is_reported_not_raised() {
        let storage = MemoryStorage::with_quota(16);
        let persistence = CartPersistence::new(&storage);

        assert_eq!(persistence.save(&[entry("a", 1)]), Persisted::Failed);
    }

    #[test]
    fn load_drops_invalid_and_duplicate_rows() -> TestResult {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::new(&storage);

        let mut zero = entry("zero", 1);
        zero.quantity = 0;

        let raw = serde_json::to_string(&[entry("a", 1), zero, entry("a", 2), entry("", 1)])?;
        storage.set_item(DEFAULT_STORAGE_KEY, &raw)?;

        let loaded = persistence.load();

        assert_eq!(loaded, vec![entry("a", 1)]);

        Ok(())
    }

    #[test]
    fn load_folds_configuration_equal_rows() -> TestResult {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::new(&storage);

        store_raw(&storage, &[plain("r1", 1), plain("r2", 2)])?;

        let loaded = persistence.load();

        assert_eq!(loaded.len(), 1, "equal rows should be folded: {loaded:?}");

        let row = loaded.first().ok_or("no rows loaded")?;

        assert_eq!(row.id, "r1");
        assert_eq!(row.quantity, 3);
        assert_eq!(row.total_price, dec!(60));

        Ok(())
    }

    #[test]
    fn load_drops_rows_that_overflow_the_total() -> TestResult {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::new(&storage);

        let mut first = serde_json::to_value(entry("a", 1))?;
        let mut second = serde_json::to_value(entry("b", 1))?;

        first["totalPrice"] = serde_json::json!(5e28);
        second["totalPrice"] = serde_json::json!(5e28);

        storage.set_item(
            DEFAULT_STORAGE_KEY,
            &serde_json::to_string(&[first, second])?,
        )?;

        let loaded = persistence.load();

        assert_eq!(
            loaded.iter().map(|row| row.id.as_str()).collect::<Vec<_>>(),
            ["a"]
        );
        assert!(crate::pricing::checked_total_price(&loaded).is_some());

        Ok(())
    }
}
