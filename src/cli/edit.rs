use std::io::Write;

use clap::Args;
use tracing::warn;

use cartkit::{
    config::CartConfig,
    configurator::{Selections, configure},
    summary::describe_options,
    sync::SyncChannel,
};

use super::{CliError, selections::SelectionArgs};

#[derive(Debug, Args)]
pub(super) struct EditArgs {
    /// Row id
    id: String,

    /// Number of units
    #[arg(long, short)]
    quantity: Option<u32>,

    #[command(flatten)]
    selections: SelectionArgs,
}

pub(super) fn run(
    args: EditArgs,
    config: &CartConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut store = config.open_store(SyncChannel::new());

    let existing = store
        .get(&args.id)
        .cloned()
        .ok_or_else(|| CliError::UnknownRow(args.id.clone()))?;

    // Re-price against the current catalog when the product is still listed.
    let product = config
        .load_catalog()
        .and_then(|catalog| catalog.product(&existing.product.id).cloned())
        .unwrap_or_else(|error| {
            warn!(%error, product = %existing.product.id, "pricing edit from the stored product");
            existing.product.clone()
        });

    let mut selections = args.selections.apply(Selections::from_entry(&existing));

    if let Some(quantity) = args.quantity {
        selections = selections.quantity(quantity);
    }

    store.update(&args.id, configure(&product, selections));

    match store.get(&args.id) {
        Some(entry) => writeln!(
            out,
            "{}: {} x{} {}",
            entry.id,
            entry.product.name,
            entry.quantity,
            describe_options(entry)
        )?,
        None => writeln!(out, "{} removed", args.id)?,
    }

    Ok(())
}
