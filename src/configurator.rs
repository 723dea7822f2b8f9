//! Item configurator
//!
//! Turns a product and the customer's selections into a priced [`CartEntry`].

use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    entries::{AddonSet, CartEntry, OptionQuantities},
    pricing::{line_total, round_money},
    products::{OptionKind, ProductDefinition},
};

/// Selections made on the product page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    quantity: u32,
    side: Option<String>,
    extras: OptionQuantities,
    sauces: OptionQuantities,
    addons: AddonSet,
    observation: String,
    existing_id: Option<String>,
}

impl Selections {
    /// Empty selections for a single unit.
    pub fn new() -> Self {
        Self {
            quantity: 1,
            ..Self::default()
        }
    }

    /// Pre-fills selections from an existing cart row for the edit flow.
    pub fn from_entry(entry: &CartEntry) -> Self {
        Self {
            quantity: entry.quantity,
            side: entry.selected_side.clone(),
            extras: entry.selected_extras.clone(),
            sauces: entry.selected_sauces.clone(),
            addons: entry.selected_addons.clone(),
            observation: entry.observation.clone(),
            existing_id: Some(entry.id.clone()),
        }
    }

    /// Sets the number of units.
    #[must_use]
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Selects a side, or none.
    #[must_use]
    pub fn side(mut self, side: Option<&str>) -> Self {
        self.side = side.map(str::to_string);
        self
    }

    /// Sets the quantity of an extra. Zero deselects it.
    #[must_use]
    pub fn extra(mut self, id: impl Into<String>, quantity: u32) -> Self {
        set_quantity(&mut self.extras, id.into(), quantity);
        self
    }

    /// Sets the quantity of a sauce. Zero deselects it.
    #[must_use]
    pub fn sauce(mut self, id: impl Into<String>, quantity: u32) -> Self {
        set_quantity(&mut self.sauces, id.into(), quantity);
        self
    }

    /// Adds an addon to the set.
    #[must_use]
    pub fn addon(mut self, id: impl Into<String>) -> Self {
        self.addons.insert(id);
        self
    }

    /// Removes an addon from the set.
    #[must_use]
    pub fn without_addon(mut self, id: &str) -> Self {
        self.addons.remove(id);
        self
    }

    /// Sets the free-text note.
    #[must_use]
    pub fn observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = observation.into();
        self
    }

    /// Keeps the id of the row being edited.
    #[must_use]
    pub fn existing_id(mut self, id: impl Into<String>) -> Self {
        self.existing_id = Some(id.into());
        self
    }
}

fn set_quantity(quantities: &mut OptionQuantities, id: String, quantity: u32) {
    if quantity == 0 {
        quantities.remove(&id);
    } else {
        quantities.insert(id, quantity);
    }
}

/// Price of one unit: base price plus priced extras, side and sauces.
///
/// Addons do not contribute to the price.
pub fn unit_price(
    product: &ProductDefinition,
    extras: &OptionQuantities,
    side: Option<&str>,
    sauces: &OptionQuantities,
) -> Decimal {
    let priced = |kind: OptionKind, quantities: &OptionQuantities| -> Decimal {
        quantities
            .iter()
            .filter_map(|(id, quantity)| {
                product
                    .option(kind, id)
                    .map(|option| option.price.saturating_mul(Decimal::from(*quantity)))
            })
            .fold(Decimal::ZERO, Decimal::saturating_add)
    };

    let side_price = side
        .and_then(|id| product.option(OptionKind::Side, id))
        .map_or(Decimal::ZERO, |option| option.price);

    round_money(
        product
            .price
            .saturating_add(priced(OptionKind::Extra, extras))
            .saturating_add(side_price)
            .saturating_add(priced(OptionKind::Sauce, sauces)),
    )
}

/// Builds a priced cart entry.
///
/// Quantities below one are clamped to one, and selections the product does
/// not offer are dropped.
pub fn configure(product: &ProductDefinition, selections: Selections) -> CartEntry {
    let Selections {
        quantity,
        side,
        mut extras,
        mut sauces,
        mut addons,
        observation,
        existing_id,
    } = selections;

    let quantity = quantity.max(1);

    retain_offered(product, OptionKind::Extra, &mut extras);
    retain_offered(product, OptionKind::Sauce, &mut sauces);

    addons.retain(|id| {
        let offered = product.option(OptionKind::Addon, id).is_some();

        if !offered {
            debug!(
                product = %product.id,
                addon = id,
                "dropping addon not offered by product"
            );
        }

        offered
    });

    let side = side.filter(|id| {
        let offered = product.option(OptionKind::Side, id).is_some();

        if !offered {
            debug!(product = %product.id, side = %id, "dropping side not offered by product");
        }

        offered
    });

    let unit = unit_price(product, &extras, side.as_deref(), &sauces);

    CartEntry {
        id: existing_id.unwrap_or_default(),
        product: product.clone(),
        quantity,
        selected_extras: extras,
        selected_side: side,
        selected_sauces: sauces,
        selected_addons: addons,
        observation,
        total_price: line_total(unit, quantity),
    }
}

fn retain_offered(
    product: &ProductDefinition,
    kind: OptionKind,
    quantities: &mut OptionQuantities,
) {
    quantities.retain(|id, quantity| {
        let offered = product.option(kind, id).is_some();

        if !offered {
            debug!(
                product = %product.id,
                option = %id,
                ?kind,
                "dropping option not offered by product"
            );
        }

        offered && *quantity > 0
    });
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use crate::products::OptionDefinition;

    use super::*;

    fn burger() -> ProductDefinition {
        ProductDefinition::new("burger", "Burger", dec!(20))
            .with_option(OptionKind::Extra, OptionDefinition::new("bacon", "Bacon", dec!(5)))
            .with_option(OptionKind::Side, OptionDefinition::new("fries", "Fries", dec!(8)))
            .with_option(OptionKind::Sauce, OptionDefinition::new("bbq", "BBQ", dec!(1.5)))
            .with_option(
                OptionKind::Addon,
                OptionDefinition::new("cutlery", "Cutlery", dec!(0.5)),
            )
    }

    #[test]
    fn prices_base_product() {
        let entry = configure(&burger(), Selections::new());

        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.total_price, dec!(20));
        assert_eq!(entry.id, "");
    }

    #[test]
    fn prices_every_option_group_times_quantity() {
        let selections = Selections::new()
            .quantity(2)
            .extra("bacon", 2)
            .side(Some("fries"))
            .sauce("bbq", 1)
            .addon("cutlery");

        let entry = configure(&burger(), selections);

        // (20 + 2*5 + 8 + 1.5) * 2
        assert_eq!(entry.total_price, dec!(79));
        assert!(entry.selected_addons.contains("cutlery"));
    }

    #[test]
    fn clamps_quantity_to_one() {
        let entry = configure(&burger(), Selections::new().quantity(0));

        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.total_price, dec!(20));
    }

    #[test]
    fn omits_zero_quantities() {
        let selections = Selections::new().extra("bacon", 3).extra("bacon", 0);

        let entry = configure(&burger(), selections);

        assert!(entry.selected_extras.is_empty());
    }

    #[test]
    fn drops_options_the_product_does_not_offer() {
        let selections = Selections::new()
            .extra("truffle", 1)
            .side(Some("salad"))
            .addon("gift-wrap");

        let entry = configure(&burger(), selections);

        assert!(entry.selected_extras.is_empty());
        assert_eq!(entry.selected_side, None);
        assert!(entry.selected_addons.is_empty());
        assert_eq!(entry.total_price, dec!(20));
    }

    #[test]
    fn edit_mode_keeps_existing_id() {
        let original = configure(&burger(), Selections::new().existing_id("burger-1"));

        let edited = configure(
            &burger(),
            Selections::from_entry(&original).side(Some("fries")),
        );

        assert_eq!(edited.id, "burger-1");
        assert_eq!(edited.total_price, dec!(28));
    }
}
