use super::nelder_mead::{self, LocalMinimum};
use super::{Bounds, FitOutcome, project};
use crate::engine::config::FitConfig;
use crate::engine::progress::{Progress, ProgressReporter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

const TARGET_ACCEPT_RATE: f64 = 0.5;
const STEP_FACTOR: f64 = 0.9;

/// Basin-hopping global minimisation of `cost` starting from `x0`.
///
/// Each hop displaces the current minimum uniformly by up to `step_size` in
/// every coordinate, runs a local Nelder–Mead search and accepts the result by
/// the Metropolis criterion at `config.temperature`. Every `config.interval`
/// hops the step size grows when more than half of the hops were accepted and
/// shrinks otherwise. The lowest minimum seen is returned.
pub fn basin_hopping<F: Fn(&[f64]) -> f64>(
    cost: F,
    x0: &[f64],
    bounds: &Bounds,
    config: &FitConfig,
    reporter: &ProgressReporter,
) -> FitOutcome {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut current = nelder_mead::minimize(&cost, x0, bounds, &config.local);
    let mut nfev = current.nfev;
    let mut best = current.clone();
    debug!(sse = best.value, "Initial local minimisation finished.");

    let mut step_size = config.step_size;
    let mut accepted_in_window = 0usize;
    let mut hops_in_window = 0usize;

    reporter.report(Progress::TaskStart {
        total_steps: config.iterations as u64,
    });
    reporter.report(Progress::BestSse {
        hop: 0,
        sse: best.value,
    });
    for hop in 0..config.iterations {
        let mut trial: Vec<f64> = current
            .x
            .iter()
            .map(|&x| x + rng.gen_range(-step_size..=step_size))
            .collect();
        project(&mut trial, bounds);

        let candidate = nelder_mead::minimize(&cost, &trial, bounds, &config.local);
        nfev += candidate.nfev;

        let accept = candidate.converged && metropolis(&candidate, &current, config, &mut rng);
        trace!(hop, sse = candidate.value, accept, step_size, "Basin hop.");
        if accept {
            accepted_in_window += 1;
            if candidate.value < best.value {
                debug!(hop, sse = candidate.value, "New lowest minimum.");
                reporter.report(Progress::BestSse {
                    hop: hop + 1,
                    sse: candidate.value,
                });
                best = candidate.clone();
            }
            current = candidate;
        }

        hops_in_window += 1;
        if hops_in_window == config.interval {
            let rate = accepted_in_window as f64 / hops_in_window as f64;
            step_size = if rate > TARGET_ACCEPT_RATE {
                step_size / STEP_FACTOR
            } else {
                step_size * STEP_FACTOR
            };
            debug!(rate, step_size, "Adjusted basin-hopping step size.");
            accepted_in_window = 0;
            hops_in_window = 0;
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    let message = if best.converged {
        format!(
            "Requested number of basin-hopping iterations ({}) completed",
            config.iterations
        )
    } else {
        warn!(
            sse = best.value,
            "Local search for the best minimum did not converge."
        );
        "Local search for the best minimum did not converge".to_string()
    };

    FitOutcome {
        params: best.x,
        sse: best.value,
        nfev,
        hops: config.iterations,
        converged: best.converged,
        message,
    }
}

fn metropolis(
    candidate: &LocalMinimum,
    current: &LocalMinimum,
    config: &FitConfig,
    rng: &mut StdRng,
) -> bool {
    if candidate.value <= current.value {
        return true;
    }
    let weight = (-(candidate.value - current.value) / config.temperature).exp();
    weight >= rng.r#gen::<f64>()
}
