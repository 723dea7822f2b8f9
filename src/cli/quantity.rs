use std::io::Write;

use clap::Args;

use cartkit::{config::CartConfig, sync::SyncChannel};

use super::CliError;

#[derive(Debug, Args)]
pub(super) struct QuantityArgs {
    /// Row id
    id: String,

    /// New number of units; below 1 removes the row
    #[arg(allow_negative_numbers = true)]
    quantity: i64,
}

pub(super) fn run(
    args: &QuantityArgs,
    config: &CartConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut store = config.open_store(SyncChannel::new());

    if !store.update_quantity(&args.id, args.quantity) {
        return Err(CliError::UnknownRow(args.id.clone()));
    }

    match store.get(&args.id) {
        Some(entry) => writeln!(
            out,
            "{}: x{} {}",
            entry.id,
            entry.quantity,
            store.total_money()?
        )?,
        None => writeln!(out, "{} removed", args.id)?,
    }

    Ok(())
}
