use crate::cli::{FitBinaryArgs, FitTernaryArgs};
use crate::config::Settings;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use statmech_glass::{
    core::io::loader::DataLoader,
    engine::{optimize::FitOutcome, progress::ProgressReporter},
    workflows::{binary, ternary},
};
use tracing::{info, warn};

pub fn run_binary(args: FitBinaryArgs, settings: &Settings, loader: &DataLoader) -> Result<()> {
    let config = settings.fit_config(&args.fit)?;
    info!(
        "Fitting {}-{} enthalpies with {} basin hops",
        args.former, args.partner, config.iterations
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting binary fit of {} against {}...", args.former, args.partner);
    if args.save {
        let (fit, paths) =
            binary::fit_and_save_binary(&args.former, &args.partner, loader, &config, &reporter)?;
        print_outcome("H", &fit.outcome);
        for path in paths {
            println!("✓ Enthalpies written to: {}", path.display());
        }
    } else {
        let fit =
            binary::fit_binary_parameters(&args.former, &args.partner, loader, &config, &reporter)?;
        print_outcome("H", &fit.outcome);
    }
    Ok(())
}

pub fn run_ternary(args: FitTernaryArgs, settings: &Settings, loader: &DataLoader) -> Result<()> {
    let config = settings.fit_config(&args.fit)?;
    let pair = (args.first.as_str(), args.second.as_str());
    info!(
        "Fitting {}{} coupling in {} glasses with {} basin hops",
        pair.0, pair.1, args.modifier, config.iterations
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting ternary fit of {}-{} with {}...",
        pair.0, pair.1, args.modifier
    );
    if args.save {
        let (fit, (forward, reverse)) =
            ternary::fit_and_save_ternary(pair, &args.modifier, loader, &config, &reporter)?;
        print_outcome("p", &fit.outcome);
        println!("✓ Coupling written to: {}", forward.display());
        println!("✓ Inverse coupling written to: {}", reverse.display());
    } else {
        let fit = ternary::fit_ternary_coupling(pair, &args.modifier, loader, &config, &reporter)?;
        print_outcome("p", &fit.outcome);
    }
    Ok(())
}

fn print_outcome(label: &str, outcome: &FitOutcome) {
    for (i, value) in outcome.params.iter().enumerate() {
        println!("  {}[{}] = {:.6}", label, i, value);
    }
    println!(
        "  SSE = {:.6e} ({} evaluations, {} hops)",
        outcome.sse, outcome.nfev, outcome.hops
    );
    if !outcome.converged {
        warn!("Fit did not converge: {}", outcome.message);
        println!("Warning: the best local search did not converge ({}).", outcome.message);
    }
}
