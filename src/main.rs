mod backend;
mod cli;
mod clipboard;
mod command;
mod entry;
mod error;
mod explorer;
mod favourites;
mod intent;
mod logging;
mod navigation;
mod selection;
mod store;
mod tui;
mod utils;
mod worker;
mod workflow;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // Handle daemon mode first. This should stay in main.rs as it's an early exit.
    if clipboard::check_and_run_daemon_if_requested()? {
        return Ok(());
    }

    let cli_args = cli::Cli::parse();
    logging::init(cli_args.log_file.as_deref())?;

    // Delegate the main application logic to the workflow module
    workflow::run_filedeck(cli_args)
}
