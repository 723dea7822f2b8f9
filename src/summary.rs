//! Cart summary

use std::io;

use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    entries::{CartEntry, OptionQuantities},
    pricing::{PricingError, to_money, total_price},
    products::{OptionKind, ProductDefinition},
};

/// Errors that can occur when writing a cart summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// An amount could not be presented in the currency.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The summary could not be written.
    #[error("failed to write cart summary: {0}")]
    Io(#[from] io::Error),
}

/// Writes the cart as a table followed by the item count and total.
///
/// # Errors
///
/// - [`SummaryError::Pricing`]: an amount overflows the currency's minor units.
/// - [`SummaryError::Io`]: the output could not be written.
pub fn write_summary(
    mut out: impl io::Write,
    entries: &[CartEntry],
    currency: &'static Currency,
) -> Result<(), SummaryError> {
    if entries.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["", "Row", "Item", "Options", "Qty", "Unit Price", "Total"]);

    for (idx, entry) in entries.iter().enumerate() {
        builder.push_record([
            format!("#{:<2}", idx + 1),
            entry.id.clone(),
            entry.product.name.clone(),
            describe_options(entry),
            entry.quantity.to_string(),
            to_money(entry.unit_price(), currency)?.to_string(),
            to_money(entry.total_price, currency)?.to_string(),
        ]);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(4..7), Alignment::right());

    writeln!(out, "{table}")?;

    let count = entries
        .iter()
        .fold(0_u32, |count, entry| count.saturating_add(entry.quantity));

    writeln!(
        out,
        " Items: {count}  Total: {}",
        to_money(total_price(entries), currency)?
    )?;

    Ok(())
}

/// One-line description of a row's selections, including its note.
pub fn describe_options(entry: &CartEntry) -> String {
    let product = &entry.product;
    let mut parts = Vec::new();

    if let Some(side) = &entry.selected_side {
        parts.push(option_name(product, OptionKind::Side, side));
    }

    push_quantities(&mut parts, product, OptionKind::Extra, &entry.selected_extras);
    push_quantities(&mut parts, product, OptionKind::Sauce, &entry.selected_sauces);

    parts.extend(
        entry
            .selected_addons
            .iter()
            .map(|id| option_name(product, OptionKind::Addon, id)),
    );

    if !entry.observation.is_empty() {
        parts.push(format!("\"{}\"", entry.observation));
    }

    parts.join(", ")
}

fn push_quantities(
    parts: &mut Vec<String>,
    product: &ProductDefinition,
    kind: OptionKind,
    quantities: &OptionQuantities,
) {
    for (id, quantity) in quantities {
        let name = option_name(product, kind, id);

        if *quantity == 1 {
            parts.push(name);
        } else {
            parts.push(format!("{quantity}x {name}"));
        }
    }
}

fn option_name(product: &ProductDefinition, kind: OptionKind, id: &str) -> String {
    product
        .option(kind, id)
        .map_or_else(|| id.to_string(), |option| option.name.clone())
}
