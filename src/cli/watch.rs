use std::{io::Write, sync::mpsc, thread};

use clap::Args;
use tracing::info;

use cartkit::{
    config::CartConfig,
    persistence::Storage,
    store::CartStore,
    sync::{ChangeOrigin, SyncChannel},
};

use super::CliError;

#[derive(Debug, Args)]
pub(super) struct WatchArgs {
    /// Stop after this many polls instead of running until interrupted
    #[arg(long)]
    polls: Option<u64>,
}

pub(super) fn run(
    args: &WatchArgs,
    config: &CartConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let channel = SyncChannel::new();
    let storage = config.storage();
    let mut store = config.open_store(channel.clone());
    let mut poller = config.poller();

    poller.prime(&storage);

    let (sender, changes) = mpsc::channel();
    let subscription = channel.subscribe(move |origin| {
        _ = sender.send(origin);
    });

    info!(key = %config.storage_key, interval = ?config.poll_interval(), "watching cart");

    write_badge(out, &store, None)?;

    for _ in 0..args.polls.unwrap_or(u64::MAX) {
        thread::sleep(config.poll_interval());

        poller.poll_into(&storage, &channel);
        channel.pump();

        for origin in changes.try_iter() {
            store.refresh();
            write_badge(out, &store, Some(origin))?;
        }
    }

    channel.unsubscribe(subscription);

    Ok(())
}

fn write_badge<S: Storage>(
    out: &mut impl Write,
    store: &CartStore<S>,
    origin: Option<ChangeOrigin>,
) -> Result<(), CliError> {
    let total = store.total_money()?;
    let count = store.total_item_count();

    match origin {
        Some(origin) => writeln!(out, "[{origin}] {count} items, {total}")?,
        None => writeln!(out, "{count} items, {total}")?,
    }

    out.flush()?;

    Ok(())
}
