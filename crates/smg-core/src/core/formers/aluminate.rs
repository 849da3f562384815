use super::chain::draw_index;
use super::{
    BinaryDataset, FirstDrawOutcome, FirstDrawWeights, FormerConfig, FormerEngine, ParameterFile,
};
use crate::core::registry::ComponentRole;
use crate::core::thermo::boltzmann_weight;

/// Al2O3 as an intermediate: six-coordinated Al6 converts into charge
/// compensated tetrahedral Al4.
pub static ALUMINATE: FormerConfig = FormerConfig {
    symbol: "Al",
    role: ComponentRole::Intermediate,
    parameter_dir: "Parameters/Al2O3",
    data_dir: "Data/Al2O3",
    starting_species: &[("Al6", 100.0), ("Al4", 0.0)],
    weight_labels: &["wal6"],
    atoms_per_formula: 1.0,
    observable_species: &["Al4", "Al6"],
    binary_observables: &["Al4"],
    initial_enthalpies: &[0.0, 0.0],
};

#[derive(Debug, Default, Clone, Copy)]
pub struct AluminateEngine;

impl AluminateEngine {
    /// Al4 percentage of the Al group in an Al2O3–former binary with
    /// `content` mol % Al2O3.
    pub fn binary_al4(
        &self,
        params: &[f64],
        content: f64,
        partner_atoms_per_formula: f64,
        tg: f64,
    ) -> Option<f64> {
        let al = content.max(0.0) / ALUMINATE.atoms_per_formula;
        let partner = (100.0 - content).max(0.0) / partner_atoms_per_formula;
        let total = al + partner;
        if total <= 0.0 || al <= 0.0 {
            return None;
        }
        let weights = FirstDrawWeights {
            partner: boltzmann_weight(params[0], tg),
            own: boltzmann_weight(params[1], tg),
        };
        let own = [al / total * 100.0, 0.0];
        let outcome = self.first_draw(weights, &own, partner / total * 100.0)?;
        let group: f64 = outcome.own.iter().sum();
        Some(outcome.own[1] / group * 100.0)
    }
}

impl FormerEngine for AluminateEngine {
    fn config(&self) -> &'static FormerConfig {
        &ALUMINATE
    }

    /// Each intermediate atom either converts itself to Al4 or acts on the
    /// leading former's first species, in proportion to the weighted
    /// populations competing for it.
    fn first_draw(
        &self,
        weights: FirstDrawWeights,
        own: &[f64],
        partner_leading: f64,
    ) -> Option<FirstDrawOutcome> {
        let pool: f64 = own.iter().sum();
        let al6 = own[0];
        let self_term = weights.own * al6;
        let denom = self_term + weights.partner * partner_leading.max(0.0);
        if denom <= 0.0 || pool <= 0.0 {
            return Some(FirstDrawOutcome {
                own: own.to_vec(),
                partner_draw: 0.0,
            });
        }
        let share = self_term / denom;
        let converted = (pool * share).min(al6);

        let mut next = own.to_vec();
        next[0] -= converted;
        next[1] += converted;
        Some(FirstDrawOutcome {
            own: next,
            partner_draw: pool * (1.0 - share),
        })
    }

    /// Partner-former enthalpy and self-conversion enthalpy.
    fn fit_parameter_count(&self) -> usize {
        2
    }

    fn sse(&self, params: &[f64], data: &BinaryDataset, tg: &[f64]) -> f64 {
        if tg.is_empty() || params.len() < 2 {
            return f64::INFINITY;
        }
        let max_index = tg.len() - 1;
        let mut sse = 0.0;
        for (row, &content) in data.content.iter().enumerate() {
            let idx = draw_index(content, ALUMINATE.atoms_per_formula, max_index);
            let Some(al4) =
                self.binary_al4(params, content, data.partner_atoms_per_formula, tg[idx])
            else {
                continue;
            };
            let residual = data.observed[0][row] - al4;
            sse += residual * residual;
        }
        sse
    }

    /// The partner enthalpy belongs to the partner's parameter directory, the
    /// self enthalpy to `Parameters/Al2O3/Al.csv`.
    fn persisted_parameters(
        &self,
        partner: &str,
        partner_config: Option<&FormerConfig>,
        params: &[f64],
    ) -> Vec<ParameterFile> {
        match (partner_config, params) {
            (Some(partner_config), [h_partner, h_self]) => vec![
                ParameterFile {
                    dir: partner_config.parameter_dir,
                    stem: ALUMINATE.symbol.to_string(),
                    values: vec![*h_partner],
                },
                ParameterFile {
                    dir: ALUMINATE.parameter_dir,
                    stem: ALUMINATE.symbol.to_string(),
                    values: vec![*h_self],
                },
            ],
            _ => vec![ParameterFile {
                dir: ALUMINATE.parameter_dir,
                stem: partner.to_string(),
                values: params.to_vec(),
            }],
        }
    }
}
