use crate::cli::SeriesArgs;
use crate::config::Settings;
use crate::error::{CliError, Result};
use anyhow::Context;
use statmech_glass::{core::io::loader::DataLoader, workflows::series};
use tracing::{info, warn};

pub fn run(args: SeriesArgs, settings: &Settings, loader: &DataLoader) -> Result<()> {
    let tg = settings.tg(args.tg)?;
    if args.composition.contains(&args.free) {
        warn!(
            "'{}' is part of the composition; its value is replaced by the sweep.",
            args.free
        );
    }
    info!(
        "Sweeping {} over 0..=100 in {} at Tg = {} K",
        args.free, args.composition, tg
    );

    match &args.out_dir {
        Some(out_dir) => {
            std::fs::create_dir_all(out_dir)?;
            let (table, path) =
                series::save_structure_series(&args.composition, &args.free, tg, loader, out_dir)?;
            if !table.skipped.is_empty() {
                println!(
                    "  {} step(s) without a network former were left out.",
                    table.skipped.len()
                );
            }
            println!(
                "✓ Series of {} steps ({} species) written to: {}",
                table.values.len(),
                table.columns.len(),
                path.display()
            );
        }
        None => {
            let table = series::structure_series(&args.composition, &args.free, tg, loader)?;
            table
                .write_to(std::io::stdout().lock())
                .context("Failed to print the series table")
                .map_err(CliError::Other)?;
        }
    }
    Ok(())
}
