use thiserror::Error;

use super::config::ConfigError;
use crate::core::composition::CompositionError;
use crate::core::formers::ShapeError;
use crate::core::io::loader::DataLoadError;
use crate::core::registry::RegistryError;
use crate::core::tg::TgFitError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown component '{0}': not a registered former, intermediate or modifier")]
    UnknownComponent(String),

    #[error("Composition contains no network former or intermediate")]
    NoFormers,

    #[error("Invalid concentration for '{symbol}': {value}")]
    InvalidConcentration { symbol: String, value: f64 },

    #[error("Fictive temperature must be positive and finite, got {0}")]
    InvalidTemperature(f64),

    #[error("'{component}' has {found} enthalpies against '{partner}', expected at least {expected}")]
    ParameterShape {
        component: &'static str,
        partner: String,
        expected: usize,
        found: usize,
    },

    #[error("Data error: {source}")]
    Data {
        #[from]
        source: DataLoadError,
    },

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Tg fit failed: {source}")]
    TgFit {
        #[from]
        source: TgFitError,
    },

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write '{path}': {source}")]
    Export {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid fit request: {0}")]
    InvalidFit(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
