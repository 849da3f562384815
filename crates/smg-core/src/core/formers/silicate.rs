use super::{FormerConfig, FormerEngine};
use crate::core::registry::ComponentRole;

/// SiO2: Q-species from fully bridging Si4 to isolated Si0 tetrahedra.
pub static SILICATE: FormerConfig = FormerConfig {
    symbol: "Si",
    role: ComponentRole::Former,
    parameter_dir: "Parameters/SiO2",
    data_dir: "Data/SiO2",
    starting_species: &[
        ("Si4", 100.0),
        ("Si3", 0.0),
        ("Si2", 0.0),
        ("Si1", 0.0),
        ("Si0", 0.0),
    ],
    weight_labels: &["wSi4", "wSi3", "wSi2", "wSi1"],
    atoms_per_formula: 2.0,
    observable_species: &["Si4", "Si3", "Si2", "Si1", "Si0"],
    binary_observables: &["Si4", "Si3", "Si2", "Si1", "Si0"],
    initial_enthalpies: &[15.0, 30.0, 45.0],
};

#[derive(Debug, Default, Clone, Copy)]
pub struct SilicateEngine;

impl FormerEngine for SilicateEngine {
    fn config(&self) -> &'static FormerConfig {
        &SILICATE
    }
}
