use crate::core::composition::Composition;
use crate::core::formers::FormerConfig;
use crate::core::io::loader::{COUPLING_DIR, DataLoader};
use crate::core::io::store::{ParameterStore, ParameterTable};
use crate::core::registry::{ComponentRole, FormerRegistry};
use crate::engine::config::FitConfig;
use crate::engine::error::EngineError;
use crate::engine::optimize::{self, FitOutcome};
use crate::engine::progress::ProgressReporter;
use crate::engine::solver::StructureSolver;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument, trace, warn};

/// Starting value of the coupling constant.
pub const INITIAL_COUPLING: f64 = 1.0;
/// Smallest coupling the local search may try.
pub const MIN_COUPLING: f64 = 1e-6;

const LEADING_COLUMNS: usize = 4;

/// One glass of a ternary dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TernaryRow {
    pub composition: Composition,
    pub tg: f64,
    /// Measured population per observable species, on the global scale.
    pub observed: Vec<(&'static str, f64)>,
}

/// Rows of `Data/<A><B>/<modifier>.csv`: modifier %, A %, B %, Tg, then the
/// observable species of A followed by those of B.
#[derive(Debug, Clone, PartialEq)]
pub struct TernaryDataset {
    pub pair: (String, String),
    pub modifier: String,
    pub rows: Vec<TernaryRow>,
}

impl TernaryDataset {
    pub fn load(
        registry: &FormerRegistry,
        pair: (&str, &str),
        modifier: &str,
        loader: &DataLoader,
    ) -> Result<Self, EngineError> {
        let (first, second) = pair_configs(registry, pair, modifier)?;
        let observables: Vec<&'static str> = first
            .observable_species
            .iter()
            .chain(second.observable_species)
            .copied()
            .collect();

        let dir = format!("Data/{}{}", pair.0, pair.1);
        let columns = loader.load_columns(&dir, modifier, LEADING_COLUMNS + observables.len())?;
        let rows = (0..columns[0].len())
            .map(|row| TernaryRow {
                composition: Composition::new()
                    .with(modifier, columns[0][row])
                    .with(pair.0, columns[1][row])
                    .with(pair.1, columns[2][row]),
                tg: columns[3][row],
                observed: observables
                    .iter()
                    .enumerate()
                    .map(|(i, species)| (*species, columns[LEADING_COLUMNS + i][row]))
                    .collect(),
            })
            .collect();

        Ok(Self {
            pair: (pair.0.to_string(), pair.1.to_string()),
            modifier: modifier.to_string(),
            rows,
        })
    }
}

fn pair_configs(
    registry: &FormerRegistry,
    pair: (&str, &str),
    modifier: &str,
) -> Result<(&'static FormerConfig, &'static FormerConfig), EngineError> {
    if pair.0 == pair.1 {
        return Err(EngineError::InvalidFit(format!(
            "a ternary pair needs two different formers, got '{}' twice",
            pair.0
        )));
    }
    if !registry.is_modifier(modifier) {
        return Err(EngineError::InvalidFit(format!(
            "'{}' is not a modifier",
            modifier
        )));
    }
    let config = |symbol: &str| {
        registry
            .config(symbol)
            .ok_or_else(|| EngineError::UnknownComponent(symbol.to_string()))
    };
    Ok((config(pair.0)?, config(pair.1)?))
}

/// Captures every parameter the solver reads for the dataset's glasses, so
/// the cost function never touches the file system.
pub fn preload_parameters(
    registry: &FormerRegistry,
    dataset: &TernaryDataset,
    source: &dyn ParameterStore,
) -> Result<ParameterTable, EngineError> {
    let (first, second) = pair_configs(
        registry,
        (dataset.pair.0.as_str(), dataset.pair.1.as_str()),
        &dataset.modifier,
    )?;
    let mut table = ParameterTable::new();
    for config in [first, second] {
        if config.channel_count() > 0 {
            table.capture(source, config, &dataset.modifier)?;
        }
    }
    for intermediate in [first, second].into_iter().filter(|c| c.is_intermediate()) {
        table.capture(source, intermediate, intermediate.symbol)?;
        for former in [first, second]
            .into_iter()
            .filter(|c| c.role == ComponentRole::Former)
        {
            table.capture(source, former, intermediate.symbol)?;
        }
    }
    Ok(table)
}

/// Sum of squared differences between measured and predicted populations
/// when every former-former coupling is `coupling`.
pub fn ternary_sse(
    coupling: f64,
    dataset: &TernaryDataset,
    solver: &StructureSolver,
) -> Result<f64, EngineError> {
    let mut sse = 0.0;
    for row in &dataset.rows {
        let state = solver.solve(&row.composition, row.tg, Some(coupling))?;
        for (species, measured) in &row.observed {
            let predicted = state.get(species).unwrap_or(0.0);
            sse += (measured - predicted).powi(2);
        }
    }
    Ok(sse)
}

/// Fitted coupling constant of an ordered former pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TernaryFit {
    pub pair: (String, String),
    pub modifier: String,
    pub outcome: FitOutcome,
}

impl TernaryFit {
    pub fn coupling(&self) -> f64 {
        self.outcome.params[0]
    }
}

/// Fits the coupling constant of `pair` from `Data/<A><B>/<modifier>.csv` by
/// basin hopping from p = 1 with the local search bounded to p > 0.
#[instrument(skip_all, name = "ternary_fit_workflow", fields(pair = ?pair, modifier = modifier))]
pub fn fit_ternary_coupling(
    pair: (&str, &str),
    modifier: &str,
    loader: &DataLoader,
    config: &FitConfig,
    reporter: &ProgressReporter,
) -> Result<TernaryFit, EngineError> {
    let registry = FormerRegistry::standard();

    // === Phase 1: Load data and parameters ===
    let (dataset, table) =
        reporter.phase("Loading ternary data", || -> Result<_, EngineError> {
            let dataset = TernaryDataset::load(&registry, pair, modifier, loader)?;
            let table = preload_parameters(&registry, &dataset, loader)?;
            Ok((dataset, table))
        })?;
    info!(rows = dataset.rows.len(), "Ternary dataset loaded.");

    let solver = StructureSolver::new(&registry, &table);
    // Surfaces data problems before the optimiser hides them as infinite costs.
    let initial_sse = ternary_sse(INITIAL_COUPLING, &dataset, &solver)?;
    info!(initial_sse, "Initial coupling evaluated.");

    // === Phase 2: Global fit ===
    let cost = |x: &[f64]| match ternary_sse(x[0], &dataset, &solver) {
        Ok(sse) => sse,
        Err(e) => {
            trace!(coupling = x[0], error = %e, "Cost evaluation failed.");
            f64::INFINITY
        }
    };
    let outcome = reporter.phase("Fitting coupling", || {
        optimize::basin_hopping(
            cost,
            &[INITIAL_COUPLING],
            &[(MIN_COUPLING, f64::INFINITY)],
            config,
            reporter,
        )
    });
    if !outcome.converged {
        warn!(message = %outcome.message, "Ternary fit did not converge.");
    }
    info!(coupling = outcome.params[0], sse = outcome.sse, "Ternary fit finished.");

    Ok(TernaryFit {
        pair: (pair.0.to_string(), pair.1.to_string()),
        modifier: modifier.to_string(),
        outcome,
    })
}

/// Orders a network pair the way the solver visits it: the member that comes
/// first in [`FormerRegistry::network_order`] leads.
fn leading_order<'p>(
    registry: &FormerRegistry,
    pair: (&'p str, &'p str),
) -> Result<(&'p str, &'p str), EngineError> {
    let order = registry.network_order();
    let rank = |symbol: &str| {
        order
            .iter()
            .position(|s| *s == symbol)
            .ok_or_else(|| EngineError::UnknownComponent(symbol.to_string()))
    };
    let (first, second) = (rank(pair.0)?, rank(pair.1)?);
    Ok(if second < first { (pair.1, pair.0) } else { pair })
}

/// Writes the fitted `p` to `Parameters/MF/<leading><other>.csv` and `1/p` to
/// `Parameters/MF/<other><leading>.csv`, where the leading former is the one
/// the solver visits first. The fitted value multiplies the other former's
/// weights, so the file names do not depend on the order the pair was given in.
pub fn save_ternary_coupling(
    fit: &TernaryFit,
    loader: &DataLoader,
) -> Result<(PathBuf, PathBuf), EngineError> {
    let p = fit.coupling();
    if !(p.is_finite() && p > 0.0) {
        return Err(EngineError::InvalidFit(format!(
            "cannot store non-positive coupling {}",
            p
        )));
    }
    let registry = FormerRegistry::standard();
    let (leading, other) =
        leading_order(&registry, (fit.pair.0.as_str(), fit.pair.1.as_str()))?;
    let forward = loader.write_values(COUPLING_DIR, &format!("{}{}", leading, other), &[p])?;
    let reverse =
        loader.write_values(COUPLING_DIR, &format!("{}{}", other, leading), &[1.0 / p])?;
    info!(forward = %forward.display(), reverse = %reverse.display(), p, "Coupling saved.");
    Ok((forward, reverse))
}

/// Fits and persists in one step.
pub fn fit_and_save_ternary(
    pair: (&str, &str),
    modifier: &str,
    loader: &DataLoader,
    config: &FitConfig,
    reporter: &ProgressReporter,
) -> Result<(TernaryFit, (PathBuf, PathBuf)), EngineError> {
    let fit = fit_ternary_coupling(pair, modifier, loader, config, reporter)?;
    let paths = save_ternary_coupling(&fit, loader)?;
    Ok((fit, paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::store::ParameterStore;
    use crate::engine::config::FitConfigBuilder;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const GLASSES: [(f64, f64, f64, f64); 4] = [
        (20.0, 40.0, 40.0, 750.0),
        (30.0, 35.0, 35.0, 780.0),
        (15.0, 60.0, 25.0, 720.0),
        (25.0, 25.0, 50.0, 760.0),
    ];

    fn write(base: &Path, relative: &str, content: &str) {
        let path = base.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Sodium borosilicate glasses generated by the model with p = 2, stored
    /// under `Data/SiB/Na.csv`.
    fn borosilicate_fixture(base: &Path) {
        borosilicate_fixture_as(base, ("Si", "B"));
    }

    /// Same glasses with the columns laid out for `pair` in the given order.
    fn borosilicate_fixture_as(base: &Path, pair: (&str, &str)) {
        write(base, "Parameters/SiO2/Na.csv", "20\n30\n40\n");
        write(base, "Parameters/B2O3/Na.csv", "5\n15\n25\n");

        let registry = FormerRegistry::standard();
        let loader = DataLoader::new(base);
        let solver = StructureSolver::new(&registry, &loader);
        let observables = |symbol: &str| registry.config(symbol).unwrap().observable_species;
        let mut rows = String::new();
        for (na, si, b, tg) in GLASSES {
            let composition = Composition::new()
                .with("Na", na)
                .with("Si", si)
                .with("B", b);
            let state = solver.solve(&composition, tg, Some(2.0)).unwrap();
            let mut fields = vec![
                na.to_string(),
                composition.get(pair.0).unwrap().to_string(),
                composition.get(pair.1).unwrap().to_string(),
                tg.to_string(),
            ];
            for species in observables(pair.0).iter().chain(observables(pair.1)) {
                fields.push(state.get(species).unwrap().to_string());
            }
            rows.push_str(&fields.join(","));
            rows.push('\n');
        }
        write(base, &format!("Data/{}{}/Na.csv", pair.0, pair.1), &rows);
    }

    #[test]
    fn dataset_maps_columns_to_observables() {
        let dir = tempdir().unwrap();
        borosilicate_fixture(dir.path());
        let loader = DataLoader::new(dir.path());
        let registry = FormerRegistry::standard();

        let dataset = TernaryDataset::load(&registry, ("Si", "B"), "Na", &loader).unwrap();
        assert_eq!(dataset.rows.len(), GLASSES.len());
        let row = &dataset.rows[2];
        assert_eq!(row.composition.get("B"), Some(25.0));
        assert_eq!(row.tg, 720.0);
        let species: Vec<&str> = row.observed.iter().map(|(s, _)| *s).collect();
        assert_eq!(species, ["Si4", "Si3", "Si2", "Si1", "Si0", "B4"]);
    }

    #[test]
    fn sse_vanishes_at_the_generating_coupling() {
        let dir = tempdir().unwrap();
        borosilicate_fixture(dir.path());
        let loader = DataLoader::new(dir.path());
        let registry = FormerRegistry::standard();
        let dataset = TernaryDataset::load(&registry, ("Si", "B"), "Na", &loader).unwrap();
        let table = preload_parameters(&registry, &dataset, &loader).unwrap();
        let solver = StructureSolver::new(&registry, &table);

        assert!(ternary_sse(2.0, &dataset, &solver).unwrap() < 1e-12);
        assert!(ternary_sse(1.0, &dataset, &solver).unwrap() > 1.0);
    }

    #[test]
    fn fit_recovers_the_coupling_and_stores_its_reciprocal() {
        let dir = tempdir().unwrap();
        borosilicate_fixture(dir.path());
        let loader = DataLoader::new(dir.path());
        let config = FitConfigBuilder::new().iterations(3).seed(5).build().unwrap();

        let (fit, (forward, reverse)) =
            fit_and_save_ternary(("Si", "B"), "Na", &loader, &config, &ProgressReporter::new())
                .unwrap();
        assert!((fit.coupling() - 2.0).abs() < 1e-3, "p = {}", fit.coupling());
        assert!(forward.ends_with("Parameters/MF/SiB.csv"));
        assert!(reverse.ends_with("Parameters/MF/BSi.csv"));

        let ab = loader.coupling("Si", "B").unwrap();
        let ba = loader.coupling("B", "Si").unwrap();
        assert!((ab * ba - 1.0).abs() < 1e-12);
    }

    #[test]
    fn coupling_is_stored_under_the_leading_former_whatever_the_pair_order() {
        let dir = tempdir().unwrap();
        borosilicate_fixture_as(dir.path(), ("B", "Si"));
        let loader = DataLoader::new(dir.path());
        let config = FitConfigBuilder::new().iterations(3).seed(5).build().unwrap();

        let (fit, (forward, reverse)) =
            fit_and_save_ternary(("B", "Si"), "Na", &loader, &config, &ProgressReporter::new())
                .unwrap();
        assert!((fit.coupling() - 2.0).abs() < 1e-3, "p = {}", fit.coupling());
        assert!(forward.ends_with("Parameters/MF/SiB.csv"));
        assert!(reverse.ends_with("Parameters/MF/BSi.csv"));
        assert!((loader.coupling("Si", "B").unwrap() - fit.coupling()).abs() < 1e-12);

        // The stored constant reproduces the fitted structure.
        let registry = FormerRegistry::standard();
        let solver = StructureSolver::new(&registry, &loader);
        let glass = Composition::new()
            .with("Na", 20.0)
            .with("B", 40.0)
            .with("Si", 40.0);
        let stored = crate::workflows::structure::structure(&glass, 750.0, &loader).unwrap();
        let fitted = solver.solve(&glass, 750.0, Some(fit.coupling())).unwrap();
        for ((name, a), (_, b)) in stored.iter().zip(fitted.iter()) {
            assert!((a - b).abs() < 1e-9, "{name}: {a} vs {b}");
        }
    }

    #[test]
    fn pair_order_follows_the_solver() {
        let registry = FormerRegistry::standard();
        assert_eq!(leading_order(&registry, ("B", "Si")).unwrap(), ("Si", "B"));
        assert_eq!(leading_order(&registry, ("Si", "B")).unwrap(), ("Si", "B"));
        assert_eq!(leading_order(&registry, ("Al", "P")).unwrap(), ("P", "Al"));
        assert!(matches!(
            leading_order(&registry, ("Si", "Na")),
            Err(EngineError::UnknownComponent(s)) if s == "Na"
        ));
    }

    #[test]
    fn preload_captures_intermediate_parameters() {
        let registry = FormerRegistry::standard();
        let source = ParameterTable::new()
            .with_enthalpies("Si", "Ca", &[20.0, 30.0, 40.0])
            .with_enthalpies("Si", "Al", &[4.0])
            .with_enthalpies("Al", "Al", &[9.0]);
        let dataset = TernaryDataset {
            pair: ("Al".into(), "Si".into()),
            modifier: "Ca".into(),
            rows: Vec::new(),
        };
        let table = preload_parameters(&registry, &dataset, &source).unwrap();
        let silicate = registry.config("Si").unwrap();
        let aluminate = registry.config("Al").unwrap();
        assert_eq!(table.enthalpies(silicate, "Al").unwrap(), vec![4.0]);
        assert_eq!(table.enthalpies(aluminate, "Al").unwrap(), vec![9.0]);
        assert_eq!(table.enthalpies(silicate, "Ca").unwrap().len(), 3);
    }

    #[test]
    fn invalid_pairs_are_rejected() {
        let dir = tempdir().unwrap();
        let loader = DataLoader::new(dir.path());
        let registry = FormerRegistry::standard();
        assert!(matches!(
            TernaryDataset::load(&registry, ("Si", "Si"), "Na", &loader),
            Err(EngineError::InvalidFit(_))
        ));
        assert!(matches!(
            TernaryDataset::load(&registry, ("Si", "B"), "P", &loader),
            Err(EngineError::InvalidFit(_))
        ));
        assert!(matches!(
            TernaryDataset::load(&registry, ("Si", "Ge"), "Na", &loader),
            Err(EngineError::UnknownComponent(_))
        ));
    }

    #[test]
    fn non_positive_coupling_is_not_stored() {
        let dir = tempdir().unwrap();
        let loader = DataLoader::new(dir.path());
        let fit = TernaryFit {
            pair: ("Si".into(), "B".into()),
            modifier: "Na".into(),
            outcome: FitOutcome {
                params: vec![0.0],
                sse: 0.0,
                nfev: 0,
                hops: 0,
                converged: true,
                message: String::new(),
            },
        };
        assert!(matches!(
            save_ternary_coupling(&fit, &loader),
            Err(EngineError::InvalidFit(_))
        ));
    }
}
