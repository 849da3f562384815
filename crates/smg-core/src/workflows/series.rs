use crate::core::composition::Composition;
use crate::core::io::loader::DataLoader;
use crate::core::registry::FormerRegistry;
use crate::engine::error::EngineError;
use crate::engine::solver::StructureSolver;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Number of steps of a series: the free component runs over 0, 1, ..., 100.
pub const SERIES_STEPS: usize = 101;

/// Species populations along a sweep of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesTable {
    pub free_component: String,
    /// Concentration of the free component at every solved step.
    pub values: Vec<f64>,
    /// Concentrations at which the glass had no network former; they have no row.
    pub skipped: Vec<f64>,
    /// One column per species, in solver group order.
    pub columns: Vec<(String, Vec<f64>)>,
}

impl SeriesTable {
    pub fn column(&self, species: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(name, _)| name == species)
            .map(|(_, values)| values.as_slice())
    }

    /// `<keys>_series.csv`, with the composition symbols concatenated in order.
    pub fn file_name(composition: &Composition) -> String {
        let keys: String = composition.symbols().collect();
        format!("{}_series.csv", keys)
    }

    /// Writes the table with a header row: the free component, then species.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = vec![self.free_component.clone()];
        header.extend(self.columns.iter().map(|(name, _)| name.clone()));
        writer.write_record(&header)?;

        for (row, value) in self.values.iter().enumerate() {
            let mut record = vec![value.to_string()];
            record.extend(self.columns.iter().map(|(_, v)| v[row].to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), EngineError> {
        let export_err = |e: csv::Error| EngineError::Export {
            path: path.to_string_lossy().to_string(),
            source: e,
        };
        let file = File::create(path).map_err(|e| export_err(csv::Error::from(e)))?;
        self.write_to(file).map_err(export_err)
    }
}

/// Solves `composition` for every integer concentration 0..=100 of
/// `free_component`, keeping the other components fixed. Steps without any
/// network former are skipped with a warning; every other error aborts.
#[instrument(skip_all, name = "series_workflow", fields(free = free_component, tg = tg))]
pub fn structure_series(
    composition: &Composition,
    free_component: &str,
    tg: f64,
    loader: &DataLoader,
) -> Result<SeriesTable, EngineError> {
    let registry = FormerRegistry::standard();
    if registry.role_of(free_component).is_none() {
        return Err(EngineError::UnknownComponent(free_component.to_string()));
    }
    let solver = StructureSolver::new(&registry, loader);

    let mut working = composition.clone();
    let mut values = Vec::with_capacity(SERIES_STEPS);
    let mut skipped = Vec::new();
    let mut columns: Vec<(String, Vec<f64>)> = Vec::new();
    for step in 0..SERIES_STEPS {
        let value = step as f64;
        working.set(free_component, value);
        let state = match solver.solve(&working, tg, None) {
            Ok(state) => state,
            Err(EngineError::NoFormers) => {
                warn!(step, free = free_component, "No network former at this step; skipped.");
                skipped.push(value);
                continue;
            }
            Err(e) => return Err(e),
        };

        if columns.is_empty() {
            columns = state
                .iter()
                .map(|(name, _)| (name.to_string(), Vec::with_capacity(SERIES_STEPS)))
                .collect();
        }
        for ((_, column), (_, population)) in columns.iter_mut().zip(state.iter()) {
            column.push(population);
        }
        values.push(value);
        debug!(step, "Series step solved.");
    }

    info!(
        steps = values.len(),
        skipped = skipped.len(),
        species = columns.len(),
        "Composition series finished."
    );
    Ok(SeriesTable {
        free_component: free_component.to_string(),
        values,
        skipped,
        columns,
    })
}

/// Runs [`structure_series`] and writes the table to `out_dir`, returning the
/// path of the CSV file.
pub fn save_structure_series(
    composition: &Composition,
    free_component: &str,
    tg: f64,
    loader: &DataLoader,
    out_dir: &Path,
) -> Result<(SeriesTable, PathBuf), EngineError> {
    let table = structure_series(composition, free_component, tg, loader)?;
    let mut named = composition.clone();
    named.set(free_component, 0.0);
    let path = out_dir.join(SeriesTable::file_name(&named));
    table.write_csv(&path)?;
    info!(path = %path.display(), "Series written.");
    Ok((table, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn phosphate_dir() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Parameters/P2O5")).unwrap();
        fs::write(dir.path().join("Parameters/P2O5/Na.csv"), "10\n20\n").unwrap();
        dir
    }

    #[test]
    fn series_sweeps_the_free_component() {
        let dir = phosphate_dir();
        let loader = DataLoader::new(dir.path());
        let composition = Composition::new().with("P", 50.0);

        let table = structure_series(&composition, "Na", 700.0, &loader).unwrap();
        assert_eq!(table.values.len(), SERIES_STEPS);
        assert!(table.skipped.is_empty());
        assert_eq!(table.values[100], 100.0);
        assert_eq!(table.columns.len(), 4);

        let p3 = table.column("p3").unwrap();
        assert_eq!(p3[0], 100.0);
        assert!(p3[50] < p3[10]);
        for row in 0..SERIES_STEPS {
            let total: f64 = table.columns.iter().map(|(_, v)| v[row]).sum();
            assert!((total - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn steps_without_a_former_are_skipped() {
        let dir = phosphate_dir();
        let loader = DataLoader::new(dir.path());
        let composition = Composition::new().with("Na", 30.0);

        let table = structure_series(&composition, "P", 700.0, &loader).unwrap();
        assert_eq!(table.skipped, vec![0.0]);
        assert_eq!(table.values.len(), SERIES_STEPS - 1);
        assert_eq!(table.values[0], 1.0);
        assert!(table.columns.iter().all(|(_, v)| v.len() == table.values.len()));
        // At 1 % P the modifier saturates the network.
        assert!((table.column("p0").unwrap()[0] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_free_component_is_rejected() {
        let dir = phosphate_dir();
        let loader = DataLoader::new(dir.path());
        let result = structure_series(&Composition::new().with("P", 50.0), "Zn", 700.0, &loader);
        assert!(matches!(result, Err(EngineError::UnknownComponent(_))));
    }

    #[test]
    fn saved_series_is_named_after_the_composition_keys() {
        let dir = phosphate_dir();
        let loader = DataLoader::new(dir.path());
        let out = tempdir().unwrap();
        let composition = Composition::new().with("P", 50.0);

        let (_, path) =
            save_structure_series(&composition, "Na", 700.0, &loader, out.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "NaP_series.csv");

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "Na,p3,p2,p1,p0");
        assert_eq!(lines.next().unwrap(), "0,100,0,0,0");
        assert_eq!(lines.count(), SERIES_STEPS - 1);
    }
}
