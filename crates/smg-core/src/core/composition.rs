use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A glass composition: element symbol mapped to its concentration
/// (mol % or any consistent unit).
///
/// Keys are kept sorted so that iteration, display and derived file names are
/// reproducible. The role of each symbol (former, intermediate, modifier) is
/// not stored here; it is decided by the
/// [`FormerRegistry`](crate::core::registry::FormerRegistry) at solve time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Composition {
    components: BTreeMap<String, f64>,
}

#[derive(Debug, Error, PartialEq)]
pub enum CompositionError {
    #[error("Invalid component entry '{0}'. Expected SYMBOL=VALUE.")]
    InvalidEntry(String),
    #[error("Invalid concentration '{value}' for component '{symbol}'")]
    InvalidNumber { symbol: String, value: String },
    #[error("Component '{0}' is listed more than once")]
    Duplicate(String),
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, concentration: f64) -> Self {
        self.set(symbol, concentration);
        self
    }

    pub fn set(&mut self, symbol: &str, concentration: f64) {
        self.components.insert(symbol.to_string(), concentration);
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.components.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.components.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.components.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Composition {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            components: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Parses `"Si=25,B=25,Na=50"` (whitespace tolerant, `:` also accepted).
impl FromStr for Composition {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut composition = Composition::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (symbol, value) = entry
                .split_once(['=', ':'])
                .ok_or_else(|| CompositionError::InvalidEntry(entry.to_string()))?;
            let symbol = symbol.trim();
            let value = value.trim();
            if symbol.is_empty() {
                return Err(CompositionError::InvalidEntry(entry.to_string()));
            }
            let concentration: f64 =
                value
                    .parse()
                    .map_err(|_| CompositionError::InvalidNumber {
                        symbol: symbol.to_string(),
                        value: value.to_string(),
                    })?;
            if composition.contains(symbol) {
                return Err(CompositionError::Duplicate(symbol.to_string()));
            }
            composition.set(symbol, concentration);
        }
        Ok(composition)
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .components
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}", parts.join(","))
    }
}
