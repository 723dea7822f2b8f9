//! Fixtures
//!
//! Product catalogs described in YAML, used to drive the CLI and tests.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::products::ProductDefinition;

pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}

/// Product catalog loaded from fixtures
#[derive(Debug)]
pub struct Catalog {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Product id -> definition
    products: FxHashMap<String, ProductDefinition>,

    /// Currency shared by every product
    currency: Option<&'static Currency>,
}

impl Catalog {
    /// Create a new empty catalog with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty catalog with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            currency: None,
        }
    }

    /// Load products from `<base>/catalog/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalog").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.load_yaml(&contents)
    }

    /// Load products from YAML source
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or if there are currency mismatches.
    pub fn load_yaml(&mut self, contents: &str) -> Result<&mut Self, FixtureError> {
        let fixture: products::ProductsFixture = serde_norway::from_str(contents)?;

        for (id, product_fixture) in fixture.products {
            let (product, currency) = product_fixture.into_product(id.clone())?;

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.products.insert(id, product);
        }

        Ok(self)
    }

    /// Load a named catalog from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut catalog = Self::new();

        catalog.load_products(name)?;

        Ok(catalog)
    }

    /// Get a product by id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&ProductDefinition, FixtureError> {
        self.products
            .get(id)
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }

    /// All products, ordered by id
    pub fn products(&self) -> Vec<&ProductDefinition> {
        let mut products: Vec<_> = self.products.values().collect();
        products.sort_by(|left, right| left.id.cmp(&right.id));
        products
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::dec;
    use rusty_money::iso::BRL;
    use testresult::TestResult;

    use crate::products::OptionKind;

    use super::*;

    #[test]
    fn catalog_loads_demo_set() -> TestResult {
        let catalog = Catalog::from_set("demo")?;

        let burger = catalog.product("x-burger")?;

        assert_eq!(burger.name, "X-Burger");
        assert_eq!(burger.price, dec!(20));
        assert_eq!(
            burger.option(OptionKind::Extra, "bacon").map(|o| o.price),
            Some(dec!(5))
        );
        assert_eq!(catalog.currency()?, BRL);

        Ok(())
    }

    #[test]
    fn catalog_lists_products_by_id() -> TestResult {
        let catalog = Catalog::from_set("demo")?;

        let ids: Vec<&str> = catalog.products().iter().map(|p| p.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();

        assert_eq!(ids, sorted);
        assert!(!ids.is_empty());

        Ok(())
    }

    #[test]
    fn catalog_rejects_mixed_currencies_across_files() -> TestResult {
        let dir = tempfile::tempdir()?;
        let catalog_dir = dir.path().join("catalog");

        fs::create_dir_all(&catalog_dir)?;
        fs::write(
            catalog_dir.join("a.yml"),
            "products:\n  soda:\n    name: Soda\n    price: 5.00 BRL\n",
        )?;
        fs::write(
            catalog_dir.join("b.yml"),
            "products:\n  cola:\n    name: Cola\n    price: 2.00 USD\n",
        )?;

        let mut catalog = Catalog::with_base_path(dir.path());
        catalog.load_products("a")?;

        let result = catalog.load_products("b");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn catalog_product_not_found_returns_error() {
        let catalog = Catalog::new();
        let result = catalog.product("nonexistent");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(_))));
    }

    #[test]
    fn catalog_no_currency_returns_error() {
        let catalog = Catalog::new();

        assert!(matches!(catalog.currency(), Err(FixtureError::NoCurrency)));
    }
}
