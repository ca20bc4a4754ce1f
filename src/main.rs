//! Binary entry point that glues the key-value store, the book store, and the
//! TUI together: parse flags, start logging, build the app, then drive the
//! Ratatui event loop until the user exits.
use bookshelf::bootstrap::build_app;
use bookshelf::config::{Args, Config};
use bookshelf::logging;
use bookshelf::run_app;
use clap::Parser;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::resolve(Args::parse())?;
    let logging_to_file = logging::init(&config.log_path, config.log_level.as_deref());
    info!(data_dir = %config.data_dir.display(), logging_to_file, "starting bookshelf");

    let mut app = build_app(&config);
    run_app(&mut app)
}
