use std::io::Write;

use clap::Args;

use cartkit::{
    config::CartConfig,
    configurator::{Selections, configure},
    sync::SyncChannel,
};

use super::{CliError, selections::SelectionArgs};

#[derive(Debug, Args)]
pub(super) struct AddArgs {
    /// Catalog product id
    product: String,

    /// Number of units
    #[arg(long, short, default_value_t = 1)]
    quantity: u32,

    #[command(flatten)]
    selections: SelectionArgs,
}

pub(super) fn run(
    args: AddArgs,
    config: &CartConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let catalog = config.load_catalog()?;
    let product = catalog.product(&args.product)?;

    let selections = args.selections.apply(Selections::new().quantity(args.quantity));
    let entry = configure(product, selections);

    let mut store = config.open_store(SyncChannel::new());

    match store.add(entry) {
        Some(id) => {
            let quantity = store.get(&id).map_or(0, |entry| entry.quantity);
            writeln!(out, "{id}: {} x{quantity}", product.name)?;
        }
        None => writeln!(out, "Nothing added")?,
    }

    Ok(())
}
