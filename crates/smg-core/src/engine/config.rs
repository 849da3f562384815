use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Basin-hopping settings shared by the binary and ternary fits.
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    /// Number of basin hops after the initial local minimisation.
    pub iterations: usize,
    /// Metropolis temperature used to accept or reject a hop.
    pub temperature: f64,
    /// Initial half-width of the uniform random displacement.
    pub step_size: f64,
    /// Hops between adaptive step-size updates.
    pub interval: usize,
    pub local: LocalSearchConfig,
    /// Seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
}

/// Nelder–Mead settings for each local minimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSearchConfig {
    pub max_iterations: usize,
    /// Converged once the standard deviation of the simplex costs falls below this.
    pub tolerance: f64,
    /// Edge length of the initial simplex.
    pub initial_step: f64,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-10,
            initial_step: 1.0,
        }
    }
}

impl FitConfig {
    pub const DEFAULT_TEMPERATURE: f64 = 2.0;
    pub const DEFAULT_STEP_SIZE: f64 = 1.0;
    pub const DEFAULT_INTERVAL: usize = 50;
}

#[derive(Default)]
pub struct FitConfigBuilder {
    iterations: Option<usize>,
    temperature: Option<f64>,
    step_size: Option<f64>,
    interval: Option<usize>,
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
    seed: Option<u64>,
}

impl FitConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
    pub fn step_size(mut self, step_size: f64) -> Self {
        self.step_size = Some(step_size);
        self
    }
    pub fn interval(mut self, interval: usize) -> Self {
        self.interval = Some(interval);
        self
    }
    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn seed_opt(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<FitConfig, ConfigError> {
        let iterations = self
            .iterations
            .ok_or(ConfigError::MissingParameter("iterations"))?;
        let temperature = self.temperature.unwrap_or(FitConfig::DEFAULT_TEMPERATURE);
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "temperature",
                reason: format!("must be positive, got {}", temperature),
            });
        }
        let step_size = self.step_size.unwrap_or(FitConfig::DEFAULT_STEP_SIZE);
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "step_size",
                reason: format!("must be positive, got {}", step_size),
            });
        }
        let interval = self.interval.unwrap_or(FitConfig::DEFAULT_INTERVAL);
        if interval == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "interval",
                reason: "must be at least 1".to_string(),
            });
        }

        let defaults = LocalSearchConfig::default();
        let tolerance = self.tolerance.unwrap_or(defaults.tolerance);
        if !(tolerance >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "tolerance",
                reason: "must be non-negative".to_string(),
            });
        }
        Ok(FitConfig {
            iterations,
            temperature,
            step_size,
            interval,
            local: LocalSearchConfig {
                max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
                tolerance,
                initial_step: defaults.initial_step,
            },
            seed: self.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterations_are_required() {
        assert_eq!(
            FitConfigBuilder::new().build(),
            Err(ConfigError::MissingParameter("iterations"))
        );
    }

    #[test]
    fn defaults_match_the_hopping_schedule() {
        let config = FitConfigBuilder::new().iterations(10).build().unwrap();
        assert_eq!(config.temperature, 2.0);
        assert_eq!(config.step_size, 1.0);
        assert_eq!(config.interval, 50);
        assert_eq!(config.seed, None);
        assert_eq!(config.local, LocalSearchConfig::default());
    }

    #[test]
    fn rejects_non_positive_temperature() {
        let result = FitConfigBuilder::new()
            .iterations(1)
            .temperature(0.0)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "temperature",
                ..
            })
        ));
    }

    #[test]
    fn rejects_negative_tolerance() {
        let result = FitConfigBuilder::new()
            .iterations(1)
            .tolerance(-1e-8)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "tolerance",
                ..
            })
        ));
    }

    #[test]
    fn overrides_are_applied() {
        let config = FitConfigBuilder::new()
            .iterations(3)
            .step_size(0.5)
            .interval(5)
            .max_iterations(200)
            .tolerance(1e-9)
            .seed(42)
            .build()
            .unwrap();
        assert_eq!(config.step_size, 0.5);
        assert_eq!(config.interval, 5);
        assert_eq!(config.local.max_iterations, 200);
        assert_eq!(config.local.tolerance, 1e-9);
        assert_eq!(config.seed, Some(42));
    }
}
