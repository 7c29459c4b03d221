//! Shop Scenario - end-to-end browser checks for the QA workshop shop
//!
//! Registers a user, shops, edits inventory and cleans up, asserting on
//! what the page shows after every step.

use std::path::PathBuf;

use clap::Parser;
use shop_scenario::commands::Commands;
use shop_scenario::common::{config::Config, logging};
use shop_scenario::{cli, Result};

#[derive(Parser)]
#[command(name = "shop-scenario", about = "End-to-end scenario runner for the QA workshop shop")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write debug logs to a file (default: platform data dir)
    #[arg(long, global = true, value_name = "PATH", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_path = match &cli.log_file {
        Some(Some(path)) => Some(path.clone()),
        Some(None) => logging::default_log_path(),
        None => None,
    };

    // Held until exit so the file writer flushes
    let log_guard = match &log_path {
        Some(path) => match logging::init_with_file(cli.verbose, path) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Warning: Could not open log file {}: {}", path.display(), e);
                logging::init_cli(cli.verbose);
                None
            }
        },
        None => {
            logging::init_cli(cli.verbose);
            None
        }
    };

    let result = match load_config(cli.config.as_ref()) {
        Ok(config) => cli::dispatch(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        drop(log_guard);
        std::process::exit(1);
    }
}
