//! Payload work-directory maintenance CLI commands.

use clap::Subcommand;
use netgauge::config::ConfigFile;
use netgauge::store::PayloadStore;

use crate::error::CliError;

/// Store action subcommands.
#[derive(Debug, Subcommand)]
pub enum StoreAction {
    /// Remove all persisted payload files
    Clear,
    /// Show payload file statistics
    Stats,
}

/// Run a store subcommand.
pub fn run(action: StoreAction) -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    let settings = &config.gauge.store;
    let store = PayloadStore::open(
        settings.directory.clone(),
        settings.stem.clone(),
        settings.extension.clone(),
    )?;

    match action {
        StoreAction::Clear => {
            println!("Clearing payload store at: {}", store.directory().display());
            let removed = store.clear()?;
            println!("Deleted {}", removed);
            Ok(())
        }
        StoreAction::Stats => {
            println!("Payload store: {}", store.directory().display());
            let stats = store.stats()?;
            println!("  Files: {}", stats.files);
            println!("  Bytes: {}", stats.bytes);
            Ok(())
        }
    }
}
