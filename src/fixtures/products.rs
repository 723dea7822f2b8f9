//! Product Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::{BRL, Currency, EUR, GBP, USD};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    pricing::round_money,
    products::{OptionDefinition, ProductDefinition},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product price (e.g., "20.00 BRL")
    pub price: String,

    /// Category name
    #[serde(default)]
    pub category: String,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Repeatable extras
    #[serde(default)]
    pub extras: Vec<OptionFixture>,

    /// Single-select sides
    #[serde(default)]
    pub sides: Vec<OptionFixture>,

    /// Repeatable sauces
    #[serde(default)]
    pub sauces: Vec<OptionFixture>,

    /// Multi-select addons
    #[serde(default)]
    pub addons: Vec<OptionFixture>,
}

/// Option Fixture
#[derive(Debug, Deserialize)]
pub struct OptionFixture {
    /// Option id
    pub id: String,

    /// Option name
    pub name: String,

    /// Option price (e.g., "5.00 BRL")
    pub price: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

impl ProductFixture {
    /// Builds the product definition, checking every price shares one currency.
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be parsed or uses a different currency.
    pub fn into_product(
        self,
        id: String,
    ) -> Result<(ProductDefinition, &'static Currency), FixtureError> {
        let (price, currency) = parse_price(&self.price)?;

        let options = |fixtures: Vec<OptionFixture>| {
            fixtures
                .into_iter()
                .map(|fixture| {
                    let (price, option_currency) = parse_price(&fixture.price)?;

                    if option_currency != currency {
                        return Err(FixtureError::CurrencyMismatch(
                            currency.iso_alpha_code.to_string(),
                            option_currency.iso_alpha_code.to_string(),
                        ));
                    }

                    Ok(OptionDefinition {
                        id: fixture.id,
                        name: fixture.name,
                        price,
                        description: fixture.description,
                        image: None,
                    })
                })
                .collect::<Result<Vec<OptionDefinition>, FixtureError>>()
        };

        let product = ProductDefinition {
            id,
            name: self.name,
            price,
            image: self.image,
            category: self.category,
            extras: options(self.extras)?,
            sides: options(self.sides)?,
            sauces: options(self.sauces)?,
            addons: options(self.addons)?,
        };

        Ok((product, currency))
    }
}

/// Parse price string (e.g., "20.00 BRL") into a decimal amount and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a non-negative decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((round_money(amount), parse_currency(currency_code)?))
}

/// Resolve a supported ISO currency code
///
/// # Errors
///
/// Returns an error if the code is not one of the supported currencies.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "BRL" => Ok(BRL),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99BRL");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_negative_amounts() {
        let result = parse_price("-1.00 BRL");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_accepts_known_currencies() -> Result<(), FixtureError> {
        let (brl_amount, brl) = parse_price("20 BRL")?;
        let (eur_amount, eur) = parse_price("2.505 EUR")?;

        assert_eq!(brl_amount, dec!(20));
        assert_eq!(brl, BRL);
        assert_eq!(eur_amount, dec!(2.51));
        assert_eq!(eur, EUR);

        Ok(())
    }

    #[test]
    fn into_product_rejects_mixed_currencies() -> Result<(), serde_norway::Error> {
        let fixture: ProductFixture = serde_norway::from_str(
            "name: Burger\n\
             price: 20.00 BRL\n\
             extras:\n  - { id: bacon, name: Bacon, price: 5.00 USD }\n",
        )?;

        let result = fixture.into_product("burger".to_string());

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }
}
