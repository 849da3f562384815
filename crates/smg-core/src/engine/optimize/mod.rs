//! Derivative-free optimisation used by the parameter fits.
//!
//! [`basin_hopping`] performs the global search; every hop ends in a bounded
//! Nelder–Mead descent from [`nelder_mead`], run through
//! argmin's simplex solver.

mod basin_hopping;
pub mod nelder_mead;

pub use basin_hopping::basin_hopping;

use serde::Serialize;

/// Inclusive `(lower, upper)` limits per coordinate. An empty slice means
/// unbounded; missing trailing entries leave those coordinates free.
pub type Bounds = [(f64, f64)];

/// Result of a global fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitOutcome {
    pub params: Vec<f64>,
    pub sse: f64,
    /// Cost function evaluations across all local searches.
    pub nfev: usize,
    pub hops: usize,
    /// Whether the local search that produced the best point converged.
    pub converged: bool,
    pub message: String,
}

pub(crate) fn project(x: &mut [f64], bounds: &Bounds) {
    for (value, &(lower, upper)) in x.iter_mut().zip(bounds) {
        if *value < lower {
            *value = lower;
        }
        if *value > upper {
            *value = upper;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_clamps_only_bounded_coordinates() {
        let mut x = [-1.0, 5.0, 9.0];
        project(&mut x, &[(0.0, 1.0), (0.0, 10.0)]);
        assert_eq!(x, [0.0, 5.0, 9.0]);
    }
}
