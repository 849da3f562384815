use crate::core::composition::Composition;
use crate::core::io::loader::DataLoader;
use crate::core::registry::FormerRegistry;
use crate::core::species::SpeciesState;
use crate::engine::error::EngineError;
use crate::engine::solver::StructureSolver;
use tracing::{info, instrument};

/// Predicts the species distribution of `composition` at fictive temperature
/// `tg`, reading parameters from the data directory of `loader`.
#[instrument(skip_all, name = "structure_workflow", fields(tg = tg))]
pub fn structure(
    composition: &Composition,
    tg: f64,
    loader: &DataLoader,
) -> Result<SpeciesState, EngineError> {
    let registry = FormerRegistry::standard();
    let state = StructureSolver::new(&registry, loader).solve(composition, tg, None)?;
    info!(
        composition = %composition,
        groups = state.groups().len(),
        "Structure prediction finished."
    );
    Ok(state)
}
