use super::error::EngineError;
use crate::core::composition::Composition;
use crate::core::formers::{FirstDrawWeights, FormerEngine};
use crate::core::io::store::ParameterStore;
use crate::core::registry::{ComponentRole, FormerRegistry};
use crate::core::species::SpeciesState;
use crate::core::thermo::{BACK_DRAW_MULTIPLIER, boltzmann_weight, round_half_up};
use tracing::{debug, instrument, trace, warn};

/// A former or intermediate taking part in the draws.
struct Participant<'r> {
    engine: &'r dyn FormerEngine,
    /// Label weights averaged over the modifiers by their share.
    weights: Vec<f64>,
}

impl Participant<'_> {
    fn symbol(&self) -> &'static str {
        self.engine.config().symbol
    }

    fn is_intermediate(&self) -> bool {
        self.engine.config().is_intermediate()
    }
}

/// Components of a composition sorted by registry role and order.
struct Partition<'r> {
    /// Formers then intermediates, with their atom fractions.
    networks: Vec<(&'r dyn FormerEngine, f64)>,
    modifiers: Vec<(&'static str, f64)>,
}

impl Partition<'_> {
    fn network_total(&self) -> f64 {
        self.networks.iter().map(|(_, atoms)| atoms).sum()
    }

    fn modifier_total(&self) -> f64 {
        self.modifiers.iter().map(|(_, c)| c).sum()
    }
}

/// Computes species distributions by distributing modifier draws over the
/// network formers of a glass.
pub struct StructureSolver<'a> {
    registry: &'a FormerRegistry,
    store: &'a dyn ParameterStore,
}

impl<'a> StructureSolver<'a> {
    pub fn new(registry: &'a FormerRegistry, store: &'a dyn ParameterStore) -> Self {
        Self { registry, store }
    }

    /// Species distribution of `composition` at fictive temperature `tg` (K).
    ///
    /// `coupling` replaces every stored former-former coupling constant; the
    /// ternary fit uses it to evaluate a trial value.
    #[instrument(level = "debug", skip_all, fields(composition = %composition, tg = tg))]
    pub fn solve(
        &self,
        composition: &Composition,
        tg: f64,
        coupling: Option<f64>,
    ) -> Result<SpeciesState, EngineError> {
        if !(tg.is_finite() && tg > 0.0) {
            return Err(EngineError::InvalidTemperature(tg));
        }

        // === Phase 1: Partition and validate ===
        let partition = self.partition(composition)?;
        let network_total = partition.network_total();
        if network_total <= 0.0 {
            return Err(EngineError::NoFormers);
        }

        let (former_atoms, intermediate_atoms) =
            partition
                .networks
                .iter()
                .fold((0.0, 0.0), |(f, i), (engine, atoms)| {
                    if engine.config().is_intermediate() {
                        (f, i + atoms)
                    } else {
                        (f + atoms, i)
                    }
                });
        if intermediate_atoms > former_atoms {
            warn!(
                intermediate_atoms,
                former_atoms,
                "Intermediate content exceeds former content; results may be inaccurate."
            );
        }

        let modifier_total = partition.modifier_total();
        let total_draws = if modifier_total > 0.0 {
            round_half_up(modifier_total / network_total * 100.0)
        } else {
            0
        };
        debug!(total_draws, network_total, modifier_total, "Partitioned composition.");

        // === Phase 2: Starting populations ===
        let mut state = SpeciesState::new();
        for (engine, atoms) in &partition.networks {
            state.push_group(engine.starting_state().scaled(atoms / network_total));
        }

        let active: Vec<&dyn FormerEngine> = partition
            .networks
            .iter()
            .filter(|(_, atoms)| *atoms > 0.0)
            .map(|(engine, _)| *engine)
            .collect();

        // === Phase 3: Intermediate first draws ===
        let leading = active.iter().copied().find(|e| !e.config().is_intermediate());
        if let Some(leading) = leading {
            for engine in active.iter().filter(|e| e.config().is_intermediate()) {
                self.first_draw(&mut state, *engine, leading, tg)?;
            }
        }

        if total_draws == 0 {
            return Ok(state);
        }

        // === Phase 4: Main draw loop ===
        let participants = self.participants(&active, &partition, tg, coupling)?;
        self.draw_loop(&mut state, &participants, total_draws);
        Ok(state)
    }

    fn partition(&self, composition: &Composition) -> Result<Partition<'_>, EngineError> {
        for (symbol, value) in composition.iter() {
            if self.registry.role_of(symbol).is_none() {
                return Err(EngineError::UnknownComponent(symbol.to_string()));
            }
            if !(value.is_finite() && value >= 0.0) {
                return Err(EngineError::InvalidConcentration {
                    symbol: symbol.to_string(),
                    value,
                });
            }
        }

        let mut networks = Vec::new();
        for symbol in self.registry.network_order() {
            let (Some(value), Some(engine)) =
                (composition.get(symbol), self.registry.lookup(symbol))
            else {
                continue;
            };
            networks.push((engine, value / engine.config().atoms_per_formula));
        }
        let modifiers = self
            .registry
            .symbols(ComponentRole::Modifier)
            .into_iter()
            .filter_map(|symbol| composition.get(symbol).map(|value| (symbol, value)))
            .collect();

        Ok(Partition {
            networks,
            modifiers,
        })
    }

    fn first_draw(
        &self,
        state: &mut SpeciesState,
        engine: &dyn FormerEngine,
        leading: &dyn FormerEngine,
        tg: f64,
    ) -> Result<(), EngineError> {
        let own_config = engine.config();
        let leading_config = leading.config();
        let partner_h = self.first_enthalpy(leading, own_config.symbol)?;
        let own_h = self.first_enthalpy(engine, own_config.symbol)?;
        let weights = FirstDrawWeights {
            partner: boltzmann_weight(partner_h, tg),
            own: boltzmann_weight(own_h, tg),
        };

        let own = group_values(state, own_config.symbol)?;
        let leading_values = group_values(state, leading_config.symbol)?;
        let Some(outcome) = engine.first_draw(weights, &own, leading_values[0]) else {
            return Ok(());
        };
        debug!(
            intermediate = own_config.symbol,
            leading = leading_config.symbol,
            partner_draw = outcome.partner_draw,
            "Applied intermediate first draw."
        );

        // The intermediate acts on the leading former's first species only.
        let mut channel_weights = vec![0.0; leading_config.weight_labels.len()];
        if let Some(first) = channel_weights.first_mut() {
            *first = 1.0;
        }
        let next = leading.one_draw(&channel_weights, &leading_values, outcome.partner_draw, false);
        replace_group(state, leading_config.symbol, next)?;
        replace_group(state, own_config.symbol, outcome.own)
    }

    fn first_enthalpy(
        &self,
        engine: &dyn FormerEngine,
        partner: &str,
    ) -> Result<f64, EngineError> {
        let config = engine.config();
        let values = self.store.enthalpies(config, partner)?;
        values
            .first()
            .copied()
            .ok_or_else(|| EngineError::ParameterShape {
                component: config.symbol,
                partner: partner.to_string(),
                expected: 1,
                found: 0,
            })
    }

    /// Precomputes the modifier-averaged label weights of every participant.
    /// They depend only on Tg and the parameters, so they are fixed for the
    /// whole draw loop.
    fn participants<'r>(
        &self,
        active: &[&'r dyn FormerEngine],
        partition: &Partition<'_>,
        tg: f64,
        coupling: Option<f64>,
    ) -> Result<Vec<Participant<'r>>, EngineError> {
        let modifier_total = partition.modifier_total();
        let leading = active[0].config().symbol;

        let mut participants = Vec::with_capacity(active.len());
        for (idx, engine) in active.iter().enumerate() {
            let config = engine.config();
            let factor = match (idx, coupling) {
                (0, _) => 1.0,
                (_, Some(p)) => p,
                (_, None) => self.store.coupling(leading, config.symbol)?,
            };
            let channels = config.channel_count();

            let mut weights = vec![0.0; config.weight_labels.len()];
            for (modifier, concentration) in &partition.modifiers {
                let share = concentration / modifier_total;
                if share == 0.0 {
                    continue;
                }
                let enthalpies = if channels > 0 {
                    self.store.enthalpies(config, modifier)?
                } else {
                    Vec::new()
                };
                if enthalpies.len() < channels {
                    return Err(EngineError::ParameterShape {
                        component: config.symbol,
                        partner: modifier.to_string(),
                        expected: channels,
                        found: enthalpies.len(),
                    });
                }
                weights[0] += factor * share;
                for (k, h) in enthalpies.iter().take(channels).enumerate() {
                    weights[k + 1] += boltzmann_weight(*h, tg) * factor * share;
                }
            }
            trace!(former = config.symbol, factor, ?weights, "Participant weights.");
            participants.push(Participant {
                engine: *engine,
                weights,
            });
        }
        Ok(participants)
    }

    fn draw_loop(&self, state: &mut SpeciesState, participants: &[Participant<'_>], total_draws: usize) {
        for step in 0..total_draws {
            let draws: Vec<f64> = participants
                .iter()
                .map(|p| {
                    state.group(p.symbol()).map_or(0.0, |group| {
                        p.weights
                            .iter()
                            .zip(group.values())
                            .map(|(w, c)| w * c)
                            .sum::<f64>()
                    })
                })
                .collect();
            let sum: f64 = draws.iter().sum();
            if !(sum.is_finite() && sum > 0.0) {
                warn!(
                    step,
                    total_draws,
                    "Network cannot absorb further modifier; stopping early."
                );
                return;
            }

            for (participant, draw) in participants.iter().zip(&draws) {
                let fraction = draw / sum;
                apply_draw(state, participant, fraction, false);

                if participant.is_intermediate() {
                    let back = -BACK_DRAW_MULTIPLIER * fraction;
                    for former in participants.iter().filter(|p| !p.is_intermediate()) {
                        apply_draw(state, former, back, true);
                    }
                }
            }
        }
    }
}

fn apply_draw(state: &mut SpeciesState, participant: &Participant<'_>, draw: f64, back: bool) {
    if let Some(group) = state.group_mut(participant.symbol()) {
        let next = participant
            .engine
            .one_draw(&participant.weights, group.values(), draw, back);
        group.replace(next);
    }
}

fn group_values(state: &SpeciesState, symbol: &str) -> Result<Vec<f64>, EngineError> {
    state
        .group(symbol)
        .map(|g| g.values().to_vec())
        .ok_or_else(|| EngineError::Internal(format!("missing species group '{}'", symbol)))
}

fn replace_group(state: &mut SpeciesState, symbol: &str, values: Vec<f64>) -> Result<(), EngineError> {
    state
        .group_mut(symbol)
        .map(|g| g.replace(values))
        .ok_or_else(|| EngineError::Internal(format!("missing species group '{}'", symbol)))
}
