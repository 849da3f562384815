use super::{FormerConfig, FormerEngine};
use crate::core::registry::ComponentRole;

/// B2O3: trigonal B3 converts into tetrahedral B4 first, then into
/// trigonal units carrying one to three non-bridging oxygens.
pub static BORATE: FormerConfig = FormerConfig {
    symbol: "B",
    role: ComponentRole::Former,
    parameter_dir: "Parameters/B2O3",
    data_dir: "Data/B2O3",
    starting_species: &[
        ("B3", 100.0),
        ("B4", 0.0),
        ("B2", 0.0),
        ("B1", 0.0),
        ("B0", 0.0),
    ],
    weight_labels: &["wb3", "wb4", "wb2", "wb1"],
    atoms_per_formula: 1.0,
    observable_species: &["B4"],
    binary_observables: &["B4"],
    initial_enthalpies: &[10.0, 20.0, 30.0],
};

#[derive(Debug, Default, Clone, Copy)]
pub struct BorateEngine;

impl FormerEngine for BorateEngine {
    fn config(&self) -> &'static FormerConfig {
        &BORATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formers::chain::binary_state;

    #[test]
    fn four_coordinated_boron_peaks_and_then_declines() {
        let params = [8.0, 16.0, 24.0];
        let b4 = |draws| binary_state(&BorateEngine, &params, 800.0, draws)[1];
        assert!(b4(30) > b4(5));
        assert!(b4(100) > b4(60));
        assert!(b4(200) < b4(100));
    }
}
