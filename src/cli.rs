use clap::Parser;
use std::path::PathBuf;

/// filedeck – a keyboard-driven two-pane file explorer for the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to open (defaults to CWD)
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// List dotfiles too
    #[arg(long)]
    pub show_hidden: bool,

    /// Cap directory listings at N entries (unset means unlimited)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Settings file to use instead of the per-user default.
    /// Favourites, pane layout and scripts live here.
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Write tracing output to FILE (the terminal itself is taken by the TUI)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
