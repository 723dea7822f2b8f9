use std::io::Write;

use cartkit::{config::CartConfig, summary::write_summary, sync::SyncChannel};

use super::CliError;

pub(super) fn run(config: &CartConfig, out: &mut impl Write) -> Result<(), CliError> {
    let store = config.open_store(SyncChannel::new());

    write_summary(out, store.entries(), store.currency())?;

    Ok(())
}
