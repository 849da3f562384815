use crate::core::formers::chain::sweep_content;
use crate::core::io::loader::DataLoader;
use crate::core::registry::{ComponentRole, FormerRegistry};
use crate::core::tg::TgPredictor;
use crate::engine::config::FitConfig;
use crate::engine::error::EngineError;
use crate::engine::optimize::FitOutcome;
use crate::engine::progress::ProgressReporter;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Number of draw indices in the binary sweep.
pub const SWEEP_POINTS: usize = 400;

/// Fitted enthalpies of one former against one partner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryFit {
    pub former: String,
    pub partner: String,
    pub outcome: FitOutcome,
}

impl BinaryFit {
    pub fn enthalpies(&self) -> &[f64] {
        &self.outcome.params
    }
}

/// Partner contents (mol %) of the sweep for a former with the given
/// atoms-per-formula divisor.
pub fn sweep_contents(atoms_per_formula: f64) -> Vec<f64> {
    (0..SWEEP_POINTS)
        .map(|i| sweep_content(i, atoms_per_formula))
        .collect()
}

/// Fits the interaction enthalpies of `former` against `partner` from
/// `Data/<dir>/<partner>.csv`, with Tg interpolated from
/// `Data/<dir>/<partner>_Tg.csv`.
///
/// Chain formers pair with a modifier; the aluminate intermediate pairs with
/// a true former. Non-convergence is reported in the outcome, not as an error.
#[instrument(skip_all, name = "binary_fit_workflow", fields(former = former, partner = partner))]
pub fn fit_binary_parameters(
    former: &str,
    partner: &str,
    loader: &DataLoader,
    config: &FitConfig,
    reporter: &ProgressReporter,
) -> Result<BinaryFit, EngineError> {
    let registry = FormerRegistry::standard();

    // === Phase 1: Load data ===
    let (engine, data, tg) = reporter.phase("Loading binary data", || -> Result<_, EngineError> {
        let (engine, data) = registry.lookup_with_data(former, partner, loader)?;
        let expected_partner = if engine.config().is_intermediate() {
            ComponentRole::Former
        } else {
            ComponentRole::Modifier
        };
        if registry.role_of(partner) != Some(expected_partner) {
            return Err(EngineError::InvalidFit(format!(
                "'{}' cannot be fitted against '{}': expected a {:?} partner",
                former, partner, expected_partner
            )));
        }

        let tg_columns =
            loader.load_columns(engine.config().data_dir, &format!("{}_Tg", partner), 2)?;
        let predictor = TgPredictor::fit(&tg_columns[0], &tg_columns[1])?;
        let tg = predictor.predict(&sweep_contents(engine.config().atoms_per_formula));
        Ok((engine, data, tg))
    })?;
    info!(rows = data.len(), "Binary dataset loaded.");

    // === Phase 2: Global fit ===
    let outcome = reporter.phase("Fitting enthalpies", || {
        engine.engine_fit(&data, &tg, config, reporter)
    })?;
    if !outcome.converged {
        warn!(message = %outcome.message, "Binary fit did not converge.");
    }
    info!(
        params = ?outcome.params,
        sse = outcome.sse,
        nfev = outcome.nfev,
        "Binary fit finished."
    );

    Ok(BinaryFit {
        former: former.to_string(),
        partner: partner.to_string(),
        outcome,
    })
}

/// Writes the fitted enthalpies to the parameter directory, one value per line.
pub fn save_binary_parameters(
    fit: &BinaryFit,
    loader: &DataLoader,
) -> Result<Vec<PathBuf>, EngineError> {
    let registry = FormerRegistry::standard();
    let engine = registry
        .lookup(&fit.former)
        .ok_or_else(|| EngineError::UnknownComponent(fit.former.clone()))?;

    let files = engine.persisted_parameters(
        &fit.partner,
        registry.config(&fit.partner),
        &fit.outcome.params,
    );
    let mut paths = Vec::with_capacity(files.len());
    for file in files {
        let path = loader.write_values(file.dir, &file.stem, &file.values)?;
        info!(path = %path.display(), values = ?file.values, "Parameters saved.");
        paths.push(path);
    }
    Ok(paths)
}

/// Fits and persists in one step; returns the fit and the written files.
pub fn fit_and_save_binary(
    former: &str,
    partner: &str,
    loader: &DataLoader,
    config: &FitConfig,
    reporter: &ProgressReporter,
) -> Result<(BinaryFit, Vec<PathBuf>), EngineError> {
    let fit = fit_binary_parameters(former, partner, loader, config, reporter)?;
    let paths = save_binary_parameters(&fit, loader)?;
    Ok((fit, paths))
}
