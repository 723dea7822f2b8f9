//! Cartkit prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    configurator::{Selections, configure},
    entries::{AddonSet, CartEntry, OptionQuantities},
    fixtures::{Catalog, FixtureError},
    persistence::{
        CartPersistence, FileStorage, MemoryStorage, Persisted, PersistenceError, Storage,
        StorageError, StorageEvent,
    },
    pricing::PricingError,
    products::{OptionDefinition, OptionKind, ProductDefinition},
    store::{CartStore, watch_storage},
    summary::{SummaryError, write_summary},
    sync::{ChangeOrigin, StoragePoller, SubscriptionKey, SyncChannel},
};
