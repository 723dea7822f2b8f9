//! Cart Config

use std::{path::PathBuf, time::Duration};

use clap::Args;
use rusty_money::iso::Currency;

use crate::{
    fixtures::{Catalog, FixtureError, products::parse_currency},
    persistence::{CartPersistence, DEFAULT_STORAGE_KEY, FileStorage, LEGACY_STORAGE_KEYS},
    store::CartStore,
    sync::{StoragePoller, SyncChannel},
};

/// Cart storage and presentation settings.
#[derive(Debug, Args)]
pub struct CartConfig {
    /// Directory the cart is stored in
    #[arg(long, env = "CART_STORAGE_DIR", default_value = ".cart")]
    pub storage_dir: PathBuf,

    /// Storage key holding the cart
    #[arg(long, env = "CART_STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Storage keys from earlier cart versions, deleted on load
    #[arg(
        long,
        env = "CART_LEGACY_KEYS",
        value_delimiter = ',',
        default_values = LEGACY_STORAGE_KEYS
    )]
    pub legacy_keys: Vec<String>,

    /// ISO currency code totals are shown in
    #[arg(long, env = "CART_CURRENCY", default_value = "BRL", value_parser = currency_arg)]
    pub currency: &'static Currency,

    /// Milliseconds between storage polls while watching
    #[arg(long, env = "CART_POLL_INTERVAL_MS", default_value_t = 1_000_u64)]
    pub poll_interval_ms: u64,

    /// Directory holding `catalog/<name>.yml` fixtures
    #[arg(long, env = "CART_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Catalog fixture name
    #[arg(long, env = "CART_CATALOG", default_value = "demo")]
    pub catalog: String,
}

fn currency_arg(code: &str) -> Result<&'static Currency, String> {
    parse_currency(code).map_err(|error| error.to_string())
}

impl CartConfig {
    /// File storage rooted at the configured directory.
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.storage_dir)
    }

    /// Persistence for the configured key and legacy keys.
    pub fn persistence(&self) -> CartPersistence<FileStorage> {
        CartPersistence::with_keys(self.storage(), &self.storage_key, &self.legacy_keys)
    }

    /// Opens the configured cart.
    pub fn open_store(&self, channel: SyncChannel) -> CartStore<FileStorage> {
        CartStore::new(self.persistence(), channel, self.currency)
    }

    /// Poller for the configured key.
    pub fn poller(&self) -> StoragePoller {
        StoragePoller::new(&self.storage_key)
    }

    /// Interval between storage polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Loads the configured catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the catalog cannot be loaded.
    pub fn load_catalog(&self) -> Result<Catalog, FixtureError> {
        let mut catalog = Catalog::with_base_path(&self.fixtures_dir);

        catalog.load_products(&self.catalog)?;

        Ok(catalog)
    }
}
