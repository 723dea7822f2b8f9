use std::io::Write;

use cartkit::{config::CartConfig, sync::SyncChannel};

use super::CliError;

pub(super) fn run(config: &CartConfig, out: &mut impl Write) -> Result<(), CliError> {
    let mut store = config.open_store(SyncChannel::new());
    let lines = store.line_count();

    store.clear();

    writeln!(out, "Cleared {lines} rows")?;

    Ok(())
}
