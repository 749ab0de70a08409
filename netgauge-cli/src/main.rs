//! NetGauge CLI - simulated panel host and maintenance commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use netgauge::logging::{init_logging, LogConfig};

mod commands;
mod error;
mod surface;

/// Network-backed panel gauges for flight-simulator add-ons.
#[derive(Debug, Parser)]
#[command(name = "netgauge", version, about)]
struct Cli {
    /// Write logs to daily-rolled files in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the gauge under a simulated panel host
    Run(commands::run::RunArgs),

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },

    /// Payload work-directory maintenance
    Store {
        #[command(subcommand)]
        action: commands::store::StoreAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let _log_guard = init_logging(&LogConfig {
        directory: cli.log_dir.clone(),
        ..LogConfig::default()
    });

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Config { command } => commands::config::run(command),
        Commands::Store { action } => commands::store::run(action),
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}
