mod defaults;
mod file;

use crate::cli::FitOverrides;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
pub use file::FileConfig;
use statmech_glass::engine::config::{FitConfig, FitConfigBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings merged from the command line, the config file and built-in
/// defaults, in that order of precedence.
pub struct Settings {
    file: FileConfig,
    defaults: DefaultsConfig,
}

impl Settings {
    pub fn new(file: FileConfig) -> Self {
        Self {
            file,
            defaults: DefaultsConfig::default(),
        }
    }

    /// Reads the config file when one is given; otherwise only defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        debug!(?file, "Configuration loaded.");
        Ok(Self::new(file))
    }

    pub fn data_dir(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.file.data_dir.clone())
            .unwrap_or_else(|| self.defaults.data_dir.clone())
    }

    pub fn tg(&self, cli: Option<f64>) -> Result<f64> {
        cli.or(self.file.tg).ok_or_else(|| {
            CliError::Argument(
                "no fictive temperature given: pass --tg or set `tg` in the config file"
                    .to_string(),
            )
        })
    }

    pub fn fit_config(&self, cli: &FitOverrides) -> Result<FitConfig> {
        let file = self.file.fit.clone().unwrap_or_default();

        let mut builder = FitConfigBuilder::new()
            .iterations(
                cli.iterations
                    .or(file.iterations)
                    .unwrap_or(self.defaults.iterations),
            )
            .seed_opt(cli.seed.or(file.seed));
        if let Some(temperature) = cli.temperature.or(file.temperature) {
            builder = builder.temperature(temperature);
        }
        if let Some(step_size) = cli.step_size.or(file.step_size) {
            builder = builder.step_size(step_size);
        }
        if let Some(interval) = file.interval {
            builder = builder.interval(interval);
        }
        if let Some(max_iterations) = file.max_iterations {
            builder = builder.max_iterations(max_iterations);
        }
        if let Some(tolerance) = file.tolerance {
            builder = builder.tolerance(tolerance);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("smg.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.data_dir(None), PathBuf::from("."));
        let fit = settings.fit_config(&FitOverrides::default()).unwrap();
        assert_eq!(fit.iterations, 100);
        assert_eq!(fit.temperature, FitConfig::DEFAULT_TEMPERATURE);
        assert_eq!(fit.seed, None);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            data-dir = "/srv/glass"
            tg = 750.0

            [fit]
            iterations = 20
            step-size = 0.5
            max-iterations = 400
            seed = 9
            "#,
        );
        let settings = Settings::load(Some(path.as_path())).unwrap();

        assert_eq!(settings.data_dir(None), PathBuf::from("/srv/glass"));
        assert_eq!(settings.tg(None).unwrap(), 750.0);
        let fit = settings.fit_config(&FitOverrides::default()).unwrap();
        assert_eq!(fit.iterations, 20);
        assert_eq!(fit.step_size, 0.5);
        assert_eq!(fit.local.max_iterations, 400);
        assert_eq!(fit.seed, Some(9));
    }

    #[test]
    fn cli_values_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "data-dir = \"/srv/glass\"\ntg = 750.0\n[fit]\niterations = 20\nseed = 9\n",
        );
        let settings = Settings::load(Some(path.as_path())).unwrap();
        let overrides = FitOverrides {
            iterations: Some(3),
            temperature: Some(1.5),
            step_size: None,
            seed: Some(1),
        };

        assert_eq!(
            settings.data_dir(Some(Path::new("/data"))),
            PathBuf::from("/data")
        );
        assert_eq!(settings.tg(Some(900.0)).unwrap(), 900.0);
        let fit = settings.fit_config(&overrides).unwrap();
        assert_eq!(fit.iterations, 3);
        assert_eq!(fit.temperature, 1.5);
        assert_eq!(fit.seed, Some(1));
    }

    #[test]
    fn missing_tg_is_an_argument_error() {
        let settings = Settings::load(None).unwrap();
        assert!(matches!(settings.tg(None), Err(CliError::Argument(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "[fit]\nniter = 5\n");
        let result = Settings::load(Some(path.as_path()));
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn invalid_fit_values_become_config_errors() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "[fit]\ntemperature = -1.0\n");
        let settings = Settings::load(Some(path.as_path())).unwrap();
        let result = settings.fit_config(&FitOverrides::default());
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
