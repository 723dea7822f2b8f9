//! Cart entries

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    pricing::{add_totals, round_money},
    products::ProductDefinition,
};

pub mod addons;

pub use addons::AddonSet;

/// Option id → selected quantity. Zero quantities are never stored.
pub type OptionQuantities = BTreeMap<String, u32>;

/// One configured line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    /// Row identity, unique within a cart. Empty until the store assigns one.
    pub id: String,

    /// Snapshot of the product at the time the entry was configured
    pub product: ProductDefinition,

    /// Number of units, at least one
    pub quantity: u32,

    /// Selected extras and their quantities
    #[serde(default)]
    pub selected_extras: OptionQuantities,

    /// Selected side, serialized as `"none"` when absent
    #[serde(default, with = "side")]
    pub selected_side: Option<String>,

    /// Selected sauces and their quantities
    #[serde(default)]
    pub selected_sauces: OptionQuantities,

    /// Selected addons
    #[serde(default)]
    pub selected_addons: AddonSet,

    /// Free-text note for the kitchen
    #[serde(default)]
    pub observation: String,

    /// Price of the whole line (unit price × quantity)
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl CartEntry {
    /// Whether both entries would read the same on a receipt, quantity aside.
    pub fn is_configuration_equal(&self, other: &Self) -> bool {
        self.product.id == other.product.id
            && self.selected_side == other.selected_side
            && self.selected_extras == other.selected_extras
            && self.selected_sauces == other.selected_sauces
            && self.selected_addons == other.selected_addons
            && self.observation == other.observation
    }

    /// Price of a single unit as baked into [`CartEntry::total_price`].
    pub fn unit_price(&self) -> Decimal {
        if self.quantity == 0 {
            return self.total_price;
        }

        round_money(self.total_price / Decimal::from(self.quantity))
    }

    /// Folds another line's units and price into this one.
    pub(crate) fn absorb(&mut self, other: &Self) {
        self.quantity = self.quantity.saturating_add(other.quantity);
        self.total_price = add_totals(self.total_price, other.total_price);
    }

    /// Drops zero quantities and duplicate addons and rounds the price.
    ///
    /// Returns `false` if the entry cannot be kept at all.
    pub(crate) fn normalize(&mut self) -> bool {
        self.selected_extras.retain(|_, quantity| *quantity > 0);
        self.selected_sauces.retain(|_, quantity| *quantity > 0);
        self.selected_addons.dedup();
        self.total_price = round_money(self.total_price);

        self.quantity > 0
    }
}

/// The side is stored as its option id or the literal `"none"`.
mod side {
    use serde::{Deserialize, Deserializer, Serializer};

    const NONE: &str = "none";

    #[expect(
        clippy::ref_option,
        reason = "serde `with` modules receive a reference to the field."
    )]
    pub(super) fn serialize<S: Serializer>(
        side: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(side.as_deref().unwrap_or(NONE))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let side = Option::<String>::deserialize(deserializer)?;

        Ok(side.filter(|id| !id.is_empty() && id != NONE))
    }
}
