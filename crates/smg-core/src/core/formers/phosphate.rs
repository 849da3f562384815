use super::{FormerConfig, FormerEngine};
use crate::core::registry::ComponentRole;

/// P2O5: Q-species from branching p3 to orthophosphate p0.
pub static PHOSPHATE: FormerConfig = FormerConfig {
    symbol: "P",
    role: ComponentRole::Former,
    parameter_dir: "Parameters/P2O5",
    data_dir: "Data/P2O5",
    starting_species: &[("p3", 100.0), ("p2", 0.0), ("p1", 0.0), ("p0", 0.0)],
    weight_labels: &["wp3", "wp2", "wp1"],
    atoms_per_formula: 1.0,
    observable_species: &["p3", "p2", "p1", "p0"],
    binary_observables: &["p3", "p2", "p1", "p0"],
    initial_enthalpies: &[10.0, 20.0],
};

#[derive(Debug, Default, Clone, Copy)]
pub struct PhosphateEngine;

impl FormerEngine for PhosphateEngine {
    fn config(&self) -> &'static FormerConfig {
        &PHOSPHATE
    }
}
