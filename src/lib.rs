//! Cartkit
//!
//! Cart state and pricing engine for a food-ordering storefront: configured
//! items, merge rules, cached line prices, persistence to browser-style
//! storage and change signals for fragments that do not share a store.

pub mod config;
pub mod configurator;
pub mod entries;
pub mod fixtures;
pub mod observability;
pub mod persistence;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod store;
pub mod summary;
pub mod sync;
