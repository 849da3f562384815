use super::{Bounds, project};
use crate::engine::config::LocalSearchConfig;
use argmin::core::{CostFunction, Error, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use tracing::{trace, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct LocalMinimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub nfev: usize,
    pub converged: bool,
}

/// Cost seen by the simplex: every vertex is projected onto the bounds before
/// evaluation and NaN counts as infinitely bad.
struct ProjectedCost<'a, F> {
    cost: &'a F,
    bounds: &'a Bounds,
}

impl<F: Fn(&[f64]) -> f64> ProjectedCost<'_, F> {
    fn evaluate(&self, x: &[f64]) -> (Vec<f64>, f64) {
        let mut point = x.to_vec();
        project(&mut point, self.bounds);
        let value = (self.cost)(&point);
        (point, if value.is_nan() { f64::INFINITY } else { value })
    }
}

impl<F: Fn(&[f64]) -> f64> CostFunction for ProjectedCost<'_, F> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.evaluate(param).1)
    }
}

/// Bounded Nelder–Mead descent from `x0`, run by argmin's simplex solver.
///
/// The initial simplex steps `initial_step` along each axis, flipping the step
/// when a bound would swallow it. The search converges once the standard
/// deviation of the vertex costs drops below `config.tolerance`.
pub fn minimize<F: Fn(&[f64]) -> f64>(
    cost: &F,
    x0: &[f64],
    bounds: &Bounds,
    config: &LocalSearchConfig,
) -> LocalMinimum {
    let problem = ProjectedCost { cost, bounds };
    let (start, start_value) = problem.evaluate(x0);
    if x0.is_empty() {
        return LocalMinimum {
            x: start,
            value: start_value,
            nfev: 1,
            converged: true,
        };
    }

    match run_simplex(&problem, &start, config) {
        Ok(minimum) => {
            trace!(
                nfev = minimum.nfev,
                value = minimum.value,
                converged = minimum.converged,
                "Local search finished."
            );
            minimum
        }
        Err(e) => {
            warn!(error = %e, "Simplex search failed; keeping the starting point.");
            LocalMinimum {
                x: start,
                value: start_value,
                nfev: 1,
                converged: false,
            }
        }
    }
}

fn initial_simplex(start: &[f64], bounds: &Bounds, step: f64) -> Vec<Vec<f64>> {
    let mut vertices = vec![start.to_vec()];
    for i in 0..start.len() {
        let mut vertex = start.to_vec();
        vertex[i] += step;
        project(&mut vertex, bounds);
        if vertex[i] == start[i] {
            vertex[i] -= step;
            project(&mut vertex, bounds);
        }
        vertices.push(vertex);
    }
    vertices
}

fn run_simplex<F: Fn(&[f64]) -> f64>(
    problem: &ProjectedCost<'_, F>,
    start: &[f64],
    config: &LocalSearchConfig,
) -> Result<LocalMinimum, Error> {
    let solver = NelderMead::new(initial_simplex(start, problem.bounds, config.initial_step))
        .with_sd_tolerance(config.tolerance)?;
    let result = Executor::new(
        ProjectedCost {
            cost: problem.cost,
            bounds: problem.bounds,
        },
        solver,
    )
    .configure(|state| state.max_iters(config.max_iterations as u64))
    .run()?;

    let state = result.state();
    let converged = matches!(
        state.get_termination_status(),
        TerminationStatus::Terminated(TerminationReason::SolverConverged)
    );
    let nfev = state
        .get_func_counts()
        .get("cost_count")
        .copied()
        .unwrap_or(0) as usize;
    let best = state.get_best_param().map_or_else(|| start.to_vec(), Clone::clone);
    let (x, value) = problem.evaluate(&best);
    // The start point and the projected best point are evaluated outside argmin.
    Ok(LocalMinimum {
        x,
        value,
        nfev: nfev + 2,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rosenbrock(x: &[f64]) -> f64 {
        (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2)
    }

    fn config(max_iterations: usize) -> LocalSearchConfig {
        LocalSearchConfig {
            max_iterations,
            tolerance: 1e-12,
            initial_step: 0.5,
        }
    }

    #[test]
    fn finds_the_minimum_of_a_quadratic_bowl() {
        let cost = |x: &[f64]| (x[0] - 3.0).powi(2) + 2.0 * (x[1] + 1.0).powi(2);
        let result = minimize(&cost, &[0.0, 0.0], &[], &config(2000));
        assert!(result.converged);
        assert!((result.x[0] - 3.0).abs() < 1e-4);
        assert!((result.x[1] + 1.0).abs() < 1e-4);
        assert!(result.nfev > 3);
    }

    #[test]
    fn descends_the_rosenbrock_valley() {
        let result = minimize(&rosenbrock, &[-1.2, 1.0], &[], &config(5000));
        assert!(result.value < 1e-6, "value {}", result.value);
    }

    #[test]
    fn respects_lower_bounds() {
        let cost = |x: &[f64]| (x[0] + 2.0).powi(2);
        let result = minimize(&cost, &[1.0], &[(1e-6, f64::INFINITY)], &config(500));
        assert!(result.x[0] >= 1e-6);
        assert!((result.x[0] - 1e-6).abs() < 1e-4);
    }

    #[test]
    fn initial_simplex_steps_away_from_an_active_bound() {
        let vertices = initial_simplex(&[0.0, 1.0], &[(f64::NEG_INFINITY, 0.0), (0.0, 5.0)], 0.5);
        assert_eq!(vertices, vec![vec![0.0, 1.0], vec![-0.5, 1.0], vec![0.0, 1.5]]);
    }

    #[test]
    fn stops_at_the_iteration_budget() {
        let result = minimize(&rosenbrock, &[-1.2, 1.0], &[], &config(20));
        assert!(!result.converged);
        assert!(result.value.is_finite());
    }

    #[test]
    fn nan_costs_are_avoided() {
        let cost = |x: &[f64]| if x[0] < 0.0 { f64::NAN } else { (x[0] - 1.0).powi(2) };
        let result = minimize(&cost, &[2.0], &[], &config(500));
        assert!((result.x[0] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn zero_dimensional_problems_evaluate_once() {
        let cost = |_: &[f64]| 4.0;
        let result = minimize(&cost, &[], &[], &config(10));
        assert_eq!(result.x, Vec::<f64>::new());
        assert_eq!(result.value, 4.0);
        assert!(result.converged);
    }
}
