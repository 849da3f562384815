use super::{BinaryDataset, FormerEngine};
use crate::core::thermo::{boltzmann_weight, round_half_up};

/// Moves `draw` units of population along a linear species chain.
///
/// Species `k` converts into species `k + 1` when it absorbs a modifier. A
/// forward draw picks non-terminal species in proportion to
/// `weights[k] * concentrations[k]`; a back draw returns modifier, converting
/// species `k + 1` back into `k` in proportion to the population of `k + 1`.
/// Every transfer is clamped to the population available, so the group total
/// is conserved exactly and no population goes negative.
pub fn one_draw(weights: &[f64], concentrations: &[f64], draw: f64, back: bool) -> Vec<f64> {
    let mut next = concentrations.to_vec();
    let amount = draw.abs();
    let n = concentrations.len();
    if amount == 0.0 || n < 2 {
        return next;
    }
    let channels = (n - 1).min(weights.len());

    if back {
        let denom: f64 = concentrations[1..].iter().sum();
        if denom <= 0.0 {
            return next;
        }
        for k in 1..n {
            let moved = (amount * concentrations[k] / denom).min(concentrations[k]);
            next[k] -= moved;
            next[k - 1] += moved;
        }
    } else {
        let denom: f64 = (0..channels)
            .map(|k| weights[k] * concentrations[k])
            .sum();
        if denom <= 0.0 {
            return next;
        }
        for k in 0..channels {
            let moved = (amount * weights[k] * concentrations[k] / denom).min(concentrations[k]);
            next[k] -= moved;
            next[k + 1] += moved;
        }
    }
    next
}

/// Weights of a binary chain former at temperature `tg`: the reference label
/// is 1 and every further label is the Boltzmann factor of its enthalpy.
pub fn binary_weights(enthalpies: &[f64], tg: f64) -> Vec<f64> {
    std::iter::once(1.0)
        .chain(enthalpies.iter().map(|&h| boltzmann_weight(h, tg)))
        .collect()
}

/// Draws per 100 former atoms for a binary glass with `content` mol % partner.
pub fn draw_index(content: f64, atoms_per_formula: f64, max_index: usize) -> usize {
    if content >= 100.0 {
        return max_index;
    }
    let draws = atoms_per_formula * 100.0 * content.max(0.0) / (100.0 - content);
    round_half_up(draws).min(max_index)
}

/// Modifier content (mol %) reached after `index` draws.
pub fn sweep_content(index: usize, atoms_per_formula: f64) -> f64 {
    let per_atom = index as f64 / atoms_per_formula;
    per_atom / (100.0 + per_atom) * 100.0
}

/// Populations of a binary chain former after `draws` steps at a fixed Tg.
pub fn binary_state<E: FormerEngine + ?Sized>(
    engine: &E,
    enthalpies: &[f64],
    tg: f64,
    draws: usize,
) -> Vec<f64> {
    let weights = binary_weights(enthalpies, tg);
    let mut state: Vec<f64> = engine
        .config()
        .starting_species
        .iter()
        .map(|(_, v)| *v)
        .collect();
    for _ in 0..draws {
        state = engine.one_draw(&weights, &state, 1.0, false);
    }
    state
}

/// Binary SSE of a chain former. Each experimental row is simulated at the Tg
/// of its nearest sweep point and compared species by species.
pub fn trajectory_sse<E: FormerEngine + ?Sized>(
    engine: &E,
    params: &[f64],
    data: &BinaryDataset,
    tg: &[f64],
) -> f64 {
    let config = engine.config();
    if tg.is_empty() {
        return f64::INFINITY;
    }
    let max_index = tg.len() - 1;

    let mut sse = 0.0;
    for (row, &content) in data.content.iter().enumerate() {
        let draws = draw_index(content, config.atoms_per_formula, max_index);
        let state = binary_state(engine, params, tg[draws], draws);
        for (column, species) in config.binary_observables.iter().enumerate() {
            let Some(idx) = config.species_names().position(|s| s == *species) else {
                continue;
            };
            let residual = data.observed[column][row] - state[idx];
            sse += residual * residual;
        }
    }
    sse
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formers::phosphate::PhosphateEngine;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn forward_draw_conserves_population() {
        let next = one_draw(&[1.0, 0.5, 0.2], &[60.0, 30.0, 10.0, 0.0], 1.0, false);
        assert_close(next.iter().sum(), 100.0);
    }

    #[test]
    fn forward_draw_is_proportional_to_weighted_population() {
        // denom = 1*50 + 1*50 = 100, so each channel moves half a unit
        let next = one_draw(&[1.0, 1.0], &[50.0, 50.0, 0.0], 1.0, false);
        assert_close(next[0], 49.5);
        assert_close(next[1], 50.0);
        assert_close(next[2], 0.5);
    }

    #[test]
    fn fully_modified_chain_absorbs_nothing() {
        let next = one_draw(&[1.0, 1.0], &[0.0, 0.0, 100.0], 1.0, false);
        assert_eq!(next, vec![0.0, 0.0, 100.0]);
    }

    #[test]
    fn transfer_is_clamped_to_available_population() {
        let next = one_draw(&[1.0], &[0.4, 99.6], 1.0, false);
        assert_close(next[0], 0.0);
        assert_close(next[1], 100.0);
    }

    #[test]
    fn back_draw_returns_population_up_the_chain() {
        let next = one_draw(&[1.0, 1.0], &[80.0, 15.0, 5.0], -3.0, true);
        assert_close(next[0], 82.25);
        assert_close(next[1], 15.0 - 2.25 + 0.75);
        assert_close(next[2], 5.0 - 0.75);
        assert_close(next.iter().sum(), 100.0);
    }

    #[test]
    fn back_draw_on_pristine_network_changes_nothing() {
        let next = one_draw(&[1.0, 1.0], &[100.0, 0.0, 0.0], -1.0, true);
        assert_eq!(next, vec![100.0, 0.0, 0.0]);
    }

    #[test]
    fn draw_index_inverts_the_sweep() {
        for index in [0, 1, 57, 250, 399] {
            let content = sweep_content(index, 2.0);
            assert_eq!(draw_index(content, 2.0, 399), index);
        }
        assert_eq!(draw_index(100.0, 1.0, 399), 399);
    }

    #[test]
    fn sse_is_zero_for_data_generated_by_the_model() {
        let engine = PhosphateEngine;
        let params = [12.0, 24.0];
        let tg = vec![700.0; 400];
        let contents = [sweep_content(20, 1.0), sweep_content(60, 1.0)];
        let states: Vec<Vec<f64>> = [20, 60]
            .iter()
            .map(|&d| binary_state(&engine, &params, 700.0, d))
            .collect();
        let observed: Vec<Vec<f64>> = (0..4)
            .map(|s| states.iter().map(|st| st[s]).collect::<Vec<f64>>())
            .collect();
        let data = BinaryDataset {
            partner: "Na".into(),
            partner_atoms_per_formula: 1.0,
            content: contents.to_vec(),
            observed,
        };
        assert!(trajectory_sse(&engine, &params, &data, &tg) < 1e-18);
        assert!(trajectory_sse(&engine, &[30.0, 5.0], &data, &tg) > 1e-6);
    }
}
