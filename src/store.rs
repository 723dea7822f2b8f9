//! Cart store
//!
//! Owns the ordered list of cart entries. Every mutation re-reads the stored
//! cart, applies the change, writes it back and queues a change signal, so
//! fragments holding their own store over the same storage converge on the
//! last write. None of the operations fail: unknown ids are no-ops, quantities
//! below one remove the row, and storage failures are logged.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use tracing::{debug, warn};

use crate::{
    entries::CartEntry,
    persistence::{
        CartPersistence, MemoryStorage, Persisted, PersistenceError, Storage, WatcherKey,
    },
    pricing::{PricingError, scale_total, to_money, total_price},
    sync::{ChangeOrigin, SyncChannel},
};

/// Currency used when none is configured.
pub const DEFAULT_CURRENCY: &Currency = iso::BRL;

/// Cart store
#[derive(Debug)]
pub struct CartStore<S: Storage> {
    entries: Vec<CartEntry>,
    persistence: CartPersistence<S>,
    channel: SyncChannel,
    currency: &'static Currency,
    degraded: bool,
}

impl<S: Storage> CartStore<S> {
    /// Opens the cart stored under the default key.
    pub fn open(storage: S, channel: SyncChannel) -> Self {
        Self::new(CartPersistence::new(storage), channel, DEFAULT_CURRENCY)
    }

    /// Creates a store and loads the persisted cart.
    pub fn new(
        persistence: CartPersistence<S>,
        channel: SyncChannel,
        currency: &'static Currency,
    ) -> Self {
        let entries = persistence.load();

        CartStore {
            entries,
            persistence,
            channel,
            currency,
            degraded: false,
        }
    }

    /// Re-reads the stored cart.
    ///
    /// While the last write has failed the in-memory entries stay
    /// authoritative and this does nothing; the next mutation writes them
    /// again. An unreadable storage also keeps them; a malformed stored cart
    /// empties them.
    pub fn refresh(&mut self) {
        if self.degraded {
            return;
        }

        match self.persistence.read() {
            Ok(entries) => self.entries = entries,
            Err(PersistenceError::Malformed(error)) => {
                warn!(%error, "stored cart is malformed, treating it as empty");
                self.entries.clear();
            }
            Err(PersistenceError::Storage(error)) => {
                warn!(%error, "could not read stored cart, keeping in-memory entries");
            }
        }
    }

    /// Adds an entry, merging it into a configuration-equal row if present.
    ///
    /// Returns the id of the row that now holds the entry, or `None` if the
    /// entry had no units and was ignored.
    pub fn add(&mut self, mut entry: CartEntry) -> Option<String> {
        self.refresh();

        let id = if entry.normalize() {
            Some(self.insert_or_merge(entry))
        } else {
            warn!(product = %entry.product.id, "ignoring cart entry without units");
            None
        };

        self.commit();

        id
    }

    fn insert_or_merge(&mut self, mut entry: CartEntry) -> String {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|existing| existing.is_configuration_equal(&entry))
        {
            existing.absorb(&entry);

            debug!(
                id = %existing.id,
                quantity = existing.quantity,
                "merged into existing cart row"
            );

            return existing.id.clone();
        }

        if entry.id.is_empty() || self.get(&entry.id).is_some() {
            entry.id = self.next_id(&entry.product.id);
        }

        let id = entry.id.clone();
        self.entries.push(entry);

        id
    }

    /// Removes the row with the given id, returning `true` if it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.refresh();

        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;

        self.commit();

        removed
    }

    /// Replaces the row with the given id, keeping its id.
    ///
    /// Another row that becomes configuration-equal to the edited one is
    /// folded into it. A replacement without units removes the row. Returns
    /// `true` if the row existed.
    pub fn update(&mut self, id: &str, mut entry: CartEntry) -> bool {
        self.refresh();

        let exists = self.get(id).is_some();

        if exists {
            if entry.normalize() {
                entry.id = id.to_string();
                self.replace(entry);
            } else {
                self.entries.retain(|existing| existing.id != id);
            }
        }

        self.commit();

        exists
    }

    fn replace(&mut self, mut edited: CartEntry) {
        self.entries.retain(|other| {
            if other.id != edited.id && other.is_configuration_equal(&edited) {
                debug!(id = %edited.id, absorbed = %other.id, "edited row absorbed an equal row");
                edited.absorb(other);
                false
            } else {
                true
            }
        });

        if let Some(slot) = self.entries.iter_mut().find(|entry| entry.id == edited.id) {
            *slot = edited;
        }
    }

    /// Sets the number of units of a row, rescaling its price.
    ///
    /// Quantities below one remove the row. Returns `true` if the row existed.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> bool {
        if quantity < 1 {
            return self.remove(id);
        }

        self.refresh();

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let found = match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.total_price = scale_total(entry.total_price, entry.quantity, quantity);
                entry.quantity = quantity;
                true
            }
            None => false,
        };

        self.commit();

        found
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.commit();
    }

    /// Sum of every row's price.
    pub fn total_price(&self) -> Decimal {
        total_price(&self.entries)
    }

    /// Sum of every row's price in the store currency.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the total does not fit the currency's minor units.
    pub fn total_money(&self) -> Result<Money<'static, Currency>, PricingError> {
        to_money(self.total_price(), self.currency)
    }

    /// Number of units across all rows.
    pub fn total_item_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0_u32, |count, entry| count.saturating_add(entry.quantity))
    }

    /// Number of distinct rows.
    pub fn line_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows in insertion order.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Looks up a row by id.
    pub fn get(&self, id: &str) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Currency totals are presented in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Channel change signals are queued on.
    pub fn channel(&self) -> &SyncChannel {
        &self.channel
    }

    /// Persistence the store writes through.
    pub fn persistence(&self) -> &CartPersistence<S> {
        &self.persistence
    }

    /// Whether the last write failed, leaving storage behind the in-memory cart.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn commit(&mut self) {
        let failed = self.persistence.save(&self.entries) == Persisted::Failed;

        if failed && !self.degraded {
            warn!("cart write failed, keeping the cart in memory until a write succeeds");
        } else if !failed && self.degraded {
            debug!("cart write succeeded again, storage is back in sync");
        }

        self.degraded = failed;
        self.channel.notify();
    }

    fn next_id(&self, product_id: &str) -> String {
        let base = format!("{product_id}-{}", Timestamp::now().as_millisecond());

        if self.get(&base).is_none() {
            return base;
        }

        (1_u32..)
            .map(|suffix| format!("{base}-{suffix}"))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or(base)
    }
}

impl CartStore<MemoryStorage> {
    /// Signals this store's channel whenever another tab writes the cart key.
    pub fn watch_other_tabs(&self) -> WatcherKey {
        watch_storage(self.persistence.storage(), self.persistence.key(), &self.channel)
    }
}

/// Bridges native storage events for `key` into `channel`.
pub fn watch_storage(
    storage: &MemoryStorage,
    key: impl Into<String>,
    channel: &SyncChannel,
) -> WatcherKey {
    let key = key.into();
    let channel = channel.clone();

    storage.on_external_change(move |event| {
        if event.key == key {
            channel.notify_from(ChangeOrigin::Storage);
        }
    })
}
