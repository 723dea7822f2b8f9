use std::io::Write;

use clap::Args;

use cartkit::{config::CartConfig, sync::SyncChannel};

use super::CliError;

#[derive(Debug, Args)]
pub(super) struct RemoveArgs {
    /// Row id
    id: String,
}

pub(super) fn run(
    args: &RemoveArgs,
    config: &CartConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut store = config.open_store(SyncChannel::new());

    if store.remove(&args.id) {
        writeln!(out, "{} removed", args.id)?;
    } else {
        writeln!(out, "{} was not in the cart", args.id)?;
    }

    Ok(())
}
