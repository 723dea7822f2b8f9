//! Products

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The four groups of options a product can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    /// Repeatable, priced per unit.
    Extra,

    /// Single select.
    Side,

    /// Repeatable, priced per unit.
    Sauce,

    /// Multi-select set, no repeat quantity.
    Addon,
}

/// A catalog-supplied choice with its own price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDefinition {
    /// Option identifier, unique within its group
    pub id: String,

    /// Display name
    pub name: String,

    /// Option price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OptionDefinition {
    /// Creates an option with the given id, name and price.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            description: None,
            image: None,
        }
    }
}

/// Product definition as supplied by the catalog.
///
/// Cart entries keep their own copy of this, so later catalog edits never
/// reach items already in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDefinition {
    /// Product identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Base price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Category name
    #[serde(default)]
    pub category: String,

    /// Repeatable extras
    #[serde(default)]
    pub extras: Vec<OptionDefinition>,

    /// Single-select sides
    #[serde(default)]
    pub sides: Vec<OptionDefinition>,

    /// Repeatable sauces
    #[serde(default)]
    pub sauces: Vec<OptionDefinition>,

    /// Multi-select addons
    #[serde(default)]
    pub addons: Vec<OptionDefinition>,
}

impl ProductDefinition {
    /// Creates a product with no options.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: String::new(),
            category: String::new(),
            extras: Vec::new(),
            sides: Vec::new(),
            sauces: Vec::new(),
            addons: Vec::new(),
        }
    }

    /// Adds an option to the given group.
    #[must_use]
    pub fn with_option(mut self, kind: OptionKind, option: OptionDefinition) -> Self {
        self.options_mut(kind).push(option);
        self
    }

    /// Returns the options of the given group.
    pub fn options(&self, kind: OptionKind) -> &[OptionDefinition] {
        match kind {
            OptionKind::Extra => &self.extras,
            OptionKind::Side => &self.sides,
            OptionKind::Sauce => &self.sauces,
            OptionKind::Addon => &self.addons,
        }
    }

    fn options_mut(&mut self, kind: OptionKind) -> &mut Vec<OptionDefinition> {
        match kind {
            OptionKind::Extra => &mut self.extras,
            OptionKind::Side => &mut self.sides,
            OptionKind::Sauce => &mut self.sauces,
            OptionKind::Addon => &mut self.addons,
        }
    }

    /// Looks up an option by id within a group.
    pub fn option(&self, kind: OptionKind, id: &str) -> Option<&OptionDefinition> {
        self.options(kind).iter().find(|option| option.id == id)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn option_lookup_is_scoped_to_group() {
        let product = ProductDefinition::new("burger", "Burger", dec!(20))
            .with_option(
                OptionKind::Extra,
                OptionDefinition::new("bacon", "Bacon", dec!(5)),
            )
            .with_option(
                OptionKind::Side,
                OptionDefinition::new("fries", "Fries", dec!(8)),
            );

        assert!(product.option(OptionKind::Extra, "bacon").is_some());
        assert!(product.option(OptionKind::Side, "bacon").is_none());
        assert_eq!(product.options(OptionKind::Side).len(), 1);
        assert!(product.options(OptionKind::Sauce).is_empty());
    }

    #[test]
    fn deserializes_without_option_groups() -> Result<(), serde_json::Error> {
        let product: ProductDefinition =
            serde_json::from_str(r#"{"id":"a","name":"A","price":12.5}"#)?;

        assert_eq!(product.price, dec!(12.5));
        assert!(product.extras.is_empty());
        assert!(product.addons.is_empty());

        Ok(())
    }
}
