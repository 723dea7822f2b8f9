//! Cartkit CLI
//!
//! Inspects and edits a cart stored on disk, the way storefront fragments do
//! through the library.

use std::process::ExitCode;

use clap::Parser;

use cartkit::{config, observability};

use crate::cli::Cli;

mod cli;

fn main() -> ExitCode {
    config::load_dotenv();

    let cli = Cli::parse();

    if let Err(init_error) = observability::init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("Logging error: {init_error}");
        }

        return ExitCode::FAILURE;
    }

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(command_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "command errors are reported to the user regardless of log level"
            )]
            {
                eprintln!("Error: {command_error}");
            }

            ExitCode::FAILURE
        }
    }
}
