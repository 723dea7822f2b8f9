use std::io::{self, Write};

use clap::{Parser, Subcommand};
use thiserror::Error;

use cartkit::{
    config::{CartConfig, LoggingConfig},
    fixtures::FixtureError,
    pricing::PricingError,
    summary::SummaryError,
};

mod add;
mod catalog;
mod clear;
mod edit;
mod quantity;
mod remove;
mod selections;
mod show;
mod watch;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("no cart row with id {0}")]
    UnknownRow(String),
}

#[derive(Debug, Parser)]
#[command(name = "cartkit", about = "Storefront cart CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) cart: CartConfig,

    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the products on offer
    Catalog,

    /// List the cart rows and totals
    Show,

    /// Add a configured product
    Add(add::AddArgs),

    /// Re-configure an existing row in place
    Edit(edit::EditArgs),

    /// Remove a row
    Remove(remove::RemoveArgs),

    /// Set the number of units of a row
    Quantity(quantity::QuantityArgs),

    /// Empty the cart
    Clear,

    /// Print the badge whenever the stored cart changes
    Watch(watch::WatchArgs),
}

impl Cli {
    pub(crate) fn run(self) -> Result<(), CliError> {
        let mut out = io::stdout().lock();

        match self.command {
            Commands::Catalog => catalog::run(&self.cart, &mut out),
            Commands::Show => show::run(&self.cart, &mut out),
            Commands::Add(args) => add::run(args, &self.cart, &mut out),
            Commands::Edit(args) => edit::run(args, &self.cart, &mut out),
            Commands::Remove(args) => remove::run(&args, &self.cart, &mut out),
            Commands::Quantity(args) => quantity::run(&args, &self.cart, &mut out),
            Commands::Clear => clear::run(&self.cart, &mut out),
            Commands::Watch(args) => watch::run(&args, &self.cart, &mut out),
        }?;

        out.flush()?;

        Ok(())
    }
}
