use super::loader::{COUPLING_DIR, DataLoadError, DataLoader};
use crate::core::formers::FormerConfig;
use std::collections::HashMap;

/// Source of interaction parameters for the structure solver.
pub trait ParameterStore {
    /// Reaction enthalpies (kJ/mol) of `former` against `partner`, which is a
    /// modifier symbol or, for intermediate first draws, another former.
    fn enthalpies(&self, former: &FormerConfig, partner: &str) -> Result<Vec<f64>, DataLoadError>;

    /// Coupling constant of the ordered former pair `(leading, other)`.
    fn coupling(&self, leading: &str, other: &str) -> Result<f64, DataLoadError>;
}

impl ParameterStore for DataLoader {
    fn enthalpies(&self, former: &FormerConfig, partner: &str) -> Result<Vec<f64>, DataLoadError> {
        self.load_column(former.parameter_dir, partner, 0)
    }

    fn coupling(&self, leading: &str, other: &str) -> Result<f64, DataLoadError> {
        let stem = format!("{}{}", leading, other);
        let values = self.load_column(COUPLING_DIR, &stem, 0)?;
        // load_column never returns an empty column
        Ok(values[0])
    }
}

/// In-memory parameter set.
///
/// Fitting loops evaluate the solver thousands of times; capturing the needed
/// parameters once avoids re-reading the same files on every draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTable {
    enthalpies: HashMap<(String, String), Vec<f64>>,
    couplings: HashMap<(String, String), f64>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_enthalpies(&mut self, former: &str, partner: &str, values: Vec<f64>) {
        self.enthalpies
            .insert((former.to_string(), partner.to_string()), values);
    }

    pub fn with_enthalpies(mut self, former: &str, partner: &str, values: &[f64]) -> Self {
        self.insert_enthalpies(former, partner, values.to_vec());
        self
    }

    pub fn insert_coupling(&mut self, leading: &str, other: &str, value: f64) {
        self.couplings
            .insert((leading.to_string(), other.to_string()), value);
    }

    pub fn with_coupling(mut self, leading: &str, other: &str, value: f64) -> Self {
        self.insert_coupling(leading, other, value);
        self
    }

    /// Copies the enthalpies of `(former, partner)` from another store.
    pub fn capture(
        &mut self,
        source: &dyn ParameterStore,
        former: &FormerConfig,
        partner: &str,
    ) -> Result<(), DataLoadError> {
        let values = source.enthalpies(former, partner)?;
        self.insert_enthalpies(former.symbol, partner, values);
        Ok(())
    }
}

impl ParameterStore for ParameterTable {
    fn enthalpies(&self, former: &FormerConfig, partner: &str) -> Result<Vec<f64>, DataLoadError> {
        self.enthalpies
            .get(&(former.symbol.to_string(), partner.to_string()))
            .cloned()
            .ok_or_else(|| DataLoadError::NotLoaded {
                kind: "enthalpy",
                key: format!("{}-{}", former.symbol, partner),
            })
    }

    fn coupling(&self, leading: &str, other: &str) -> Result<f64, DataLoadError> {
        self.couplings
            .get(&(leading.to_string(), other.to_string()))
            .copied()
            .ok_or_else(|| DataLoadError::NotLoaded {
                kind: "coupling",
                key: format!("{}{}", leading, other),
            })
    }
}
