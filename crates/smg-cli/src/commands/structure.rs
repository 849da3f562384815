use crate::cli::StructureArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::utils::table;
use statmech_glass::{core::io::loader::DataLoader, workflows};
use tracing::info;

pub fn run(args: StructureArgs, settings: &Settings, loader: &DataLoader) -> Result<()> {
    let tg = settings.tg(args.tg)?;
    info!("Solving {} at Tg = {} K", args.composition, tg);

    let state = workflows::structure::structure(&args.composition, tg, loader)?;
    print!("{}", table::render_state(&state));

    if let Some(path) = &args.output {
        table::save_state_csv(&state, path)?;
        println!("✓ Species populations written to: {}", path.display());
    }
    Ok(())
}
