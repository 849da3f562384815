mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use clap::Parser;
use statmech_glass::core::io::loader::DataLoader;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("smg v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let settings = Settings::load(cli.config.as_deref())?;
    let data_dir = settings.data_dir(cli.data_dir.as_deref());
    info!("Using data directory {:?}", data_dir);
    let loader = DataLoader::new(data_dir);

    let command_result = match cli.command {
        Commands::Structure(args) => {
            info!("Dispatching to 'structure' command.");
            commands::structure::run(args, &settings, &loader)
        }
        Commands::Series(args) => {
            info!("Dispatching to 'series' command.");
            commands::series::run(args, &settings, &loader)
        }
        Commands::FitBinary(args) => {
            info!("Dispatching to 'fit-binary' command.");
            commands::fit::run_binary(args, &settings, &loader)
        }
        Commands::FitTernary(args) => {
            info!("Dispatching to 'fit-ternary' command.");
            commands::fit::run_ternary(args, &settings, &loader)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }
    command_result
}
