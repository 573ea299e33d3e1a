use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::backend::LocalBackend;
use crate::explorer::Explorer;
use crate::store::{self, SettingsStore};
use crate::{cli, tui, worker};

// Main orchestrator for the filedeck application logic.
pub fn run_filedeck(cli_args: cli::Cli) -> Result<()> {
    // Step 1: Resolve the starting directory.
    let start_dir = cli_args
        .dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve directory {}", cli_args.dir.display()))?;
    if !start_dir.is_dir() {
        bail!("{} is not a directory", start_dir.display());
    }

    // Step 2: Load the settings store (favourites, pane layout, scripts).
    let store_path = match cli_args.store {
        Some(path) => path,
        None => store::default_store_path(),
    };
    tracing::info!(store = %store_path.display(), "starting");
    let settings_store = SettingsStore::load(store_path);

    // Step 3: Spawn the backend worker. The bin directory sits next to the
    // settings file so move-to-bin stays within the per-user state dir.
    let trash_dir = settings_store
        .path()
        .parent()
        .map(|p| p.join("trash"))
        .unwrap_or_else(|| PathBuf::from("trash"));
    let backend = LocalBackend::new(
        cli_args.show_hidden,
        trash_dir,
        settings_store.path().to_path_buf(),
    );
    let (requests, completions, worker_handle) = worker::spawn(Box::new(backend));

    // Step 4: Build the explorer core and queue the startup fetches.
    let mut explorer = Explorer::new(settings_store, cli_args.limit);
    explorer.start(start_dir);

    // Step 5: Run the TUI until the user quits.
    tui::run(explorer, requests, completions)?;

    // The TUI dropped its request sender on the way out, which is what stops
    // the worker loop.
    let _ = worker_handle.join();

    Ok(())
}
