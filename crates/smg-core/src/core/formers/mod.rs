//! # Former Families
//!
//! Every network former and intermediate belongs to a family with its own
//! species set and redistribution kernel. A family is described by a static
//! [`FormerConfig`] and implemented by a type implementing [`FormerEngine`].
//!
//! - [`silicate`] - Si: Q4 → Q3 → Q2 → Q1 → Q0
//! - [`borate`] - B: B3 → B4 → B2 → B1 → B0
//! - [`phosphate`] - P: p3 → p2 → p1 → p0
//! - [`aluminate`] - Al (intermediate): Al6 → Al4, with a one-time first draw
//!
//! The shared chain kernel and the binary trajectory model live in [`chain`].

pub mod aluminate;
pub mod borate;
pub mod chain;
pub mod phosphate;
pub mod silicate;

use super::registry::ComponentRole;
use super::species::SpeciesGroup;
use crate::engine::config::FitConfig;
use crate::engine::optimize::{self, FitOutcome};
use crate::engine::progress::ProgressReporter;
use std::fmt;
use thiserror::Error;

/// Static description of a former or intermediate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormerConfig {
    pub symbol: &'static str,
    pub role: ComponentRole,
    /// Enthalpy files: `<parameter_dir>/<partner>.csv`.
    pub parameter_dir: &'static str,
    /// Binary datasets: `<data_dir>/<partner>.csv` and `<partner>_Tg.csv`.
    pub data_dir: &'static str,
    /// Species and their starting populations in percent (sums to 100).
    pub starting_species: &'static [(&'static str, f64)],
    /// One label per species except the terminal one.
    pub weight_labels: &'static [&'static str],
    /// Divisor converting oxide concentration to former atom fraction.
    pub atoms_per_formula: f64,
    /// Species reported in ternary datasets, in column order.
    pub observable_species: &'static [&'static str],
    /// Species reported in binary datasets, in column order after the content column.
    pub binary_observables: &'static [&'static str],
    /// Starting point for binary enthalpy fits.
    pub initial_enthalpies: &'static [f64],
}

impl FormerConfig {
    pub fn species_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.starting_species.iter().map(|(name, _)| *name)
    }

    pub fn species_count(&self) -> usize {
        self.starting_species.len()
    }

    /// Number of enthalpy-weighted reaction channels (all labels but the reference one).
    pub fn channel_count(&self) -> usize {
        self.weight_labels.len().saturating_sub(1)
    }

    pub fn dataset_columns(&self) -> usize {
        1 + self.binary_observables.len()
    }

    pub fn is_intermediate(&self) -> bool {
        self.role == ComponentRole::Intermediate
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("Dataset for '{former}' must have {expected} columns, found {found}")]
    ColumnCount {
        former: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Dataset for '{former}' has columns of different lengths")]
    RaggedColumns { former: &'static str },
    #[error("Expected {expected} parameters for '{former}', got {found}")]
    ParameterCount {
        former: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Experimental structure data of a binary glass series.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryDataset {
    /// Modifier symbol, or the partner former for intermediates.
    pub partner: String,
    /// Atoms-per-formula divisor of the partner when it is a former, 1 otherwise.
    pub partner_atoms_per_formula: f64,
    /// Content of the partner (mol %) for each row.
    pub content: Vec<f64>,
    /// One column per entry of `binary_observables`, parallel to `content`.
    pub observed: Vec<Vec<f64>>,
}

impl BinaryDataset {
    pub fn from_columns(
        config: &FormerConfig,
        partner: &str,
        partner_atoms_per_formula: f64,
        mut columns: Vec<Vec<f64>>,
    ) -> Result<Self, ShapeError> {
        if columns.len() != config.dataset_columns() {
            return Err(ShapeError::ColumnCount {
                former: config.symbol,
                expected: config.dataset_columns(),
                found: columns.len(),
            });
        }
        let rows = columns[0].len();
        if columns.iter().any(|c| c.len() != rows) {
            return Err(ShapeError::RaggedColumns {
                former: config.symbol,
            });
        }
        let observed = columns.split_off(1);
        let content = columns.swap_remove(0);
        Ok(Self {
            partner: partner.to_string(),
            partner_atoms_per_formula,
            content,
            observed,
        })
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Boltzmann weights for an intermediate's first draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstDrawWeights {
    /// Weight of the leading former's interaction with the intermediate.
    pub partner: f64,
    /// Weight of the intermediate's self-conversion.
    pub own: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FirstDrawOutcome {
    /// Updated intermediate populations.
    pub own: Vec<f64>,
    /// Draw units to apply on the leading former.
    pub partner_draw: f64,
}

/// A parameter file to write after a binary fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterFile {
    pub dir: &'static str,
    pub stem: String,
    pub values: Vec<f64>,
}

/// The chemistry of one former family.
pub trait FormerEngine: fmt::Debug + Send + Sync {
    fn config(&self) -> &'static FormerConfig;

    /// Starting populations in percent of this component's own share.
    fn starting_state(&self) -> SpeciesGroup {
        let config = self.config();
        SpeciesGroup::new(config.symbol, config.starting_species)
    }

    /// Redistributes `draw` units of modifier over the species of this former.
    /// A back draw returns modifier to the network.
    fn one_draw(&self, weights: &[f64], concentrations: &[f64], draw: f64, back: bool) -> Vec<f64> {
        chain::one_draw(weights, concentrations, draw, back)
    }

    /// One-time redistribution before the main draw loop. Only intermediates
    /// implement it.
    fn first_draw(
        &self,
        _weights: FirstDrawWeights,
        _own: &[f64],
        _partner_leading: f64,
    ) -> Option<FirstDrawOutcome> {
        None
    }

    fn fit_parameter_count(&self) -> usize {
        self.config().channel_count()
    }

    /// Sum of squared differences between the binary model and `data` for
    /// the enthalpies `params`, with Tg taken from the sweep series `tg`.
    fn sse(&self, params: &[f64], data: &BinaryDataset, tg: &[f64]) -> f64 {
        chain::trajectory_sse(self, params, data, tg)
    }

    /// Files written when persisting a binary fit against `partner`.
    fn persisted_parameters(
        &self,
        partner: &str,
        _partner_config: Option<&FormerConfig>,
        params: &[f64],
    ) -> Vec<ParameterFile> {
        vec![ParameterFile {
            dir: self.config().parameter_dir,
            stem: partner.to_string(),
            values: params.to_vec(),
        }]
    }

    /// Global fit of the binary enthalpies by basin hopping over [`Self::sse`].
    fn engine_fit(
        &self,
        data: &BinaryDataset,
        tg: &[f64],
        config: &FitConfig,
        reporter: &ProgressReporter,
    ) -> Result<FitOutcome, ShapeError> {
        let x0 = self.config().initial_enthalpies;
        if x0.len() != self.fit_parameter_count() {
            return Err(ShapeError::ParameterCount {
                former: self.config().symbol,
                expected: self.fit_parameter_count(),
                found: x0.len(),
            });
        }
        let cost = |params: &[f64]| self.sse(params, data, tg);
        Ok(optimize::basin_hopping(cost, x0, &[], config, reporter))
    }
}
