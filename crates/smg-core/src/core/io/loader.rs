use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, trace};

/// Directory holding former-former coupling constants, relative to the base.
pub const COUPLING_DIR: &str = "Parameters/MF";

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("File '{path}' has no column {column} on row {row}")]
    MissingColumn {
        path: String,
        row: usize,
        column: usize,
    },
    #[error("Invalid number '{value}' in '{path}' at row {row}, column {column}")]
    InvalidNumber {
        path: String,
        row: usize,
        column: usize,
        value: String,
    },
    #[error("File '{0}' contains no data rows")]
    Empty(String),
    #[error("No {kind} parameters loaded for '{key}'")]
    NotLoaded { kind: &'static str, key: String },
}

/// Reads and writes the CSV files of a data directory.
///
/// A data directory contains `Parameters/<oxide>/<partner>.csv` enthalpy files,
/// `Parameters/MF/<A><B>.csv` coupling constants and `Data/...` experimental
/// datasets.
#[derive(Debug, Clone)]
pub struct DataLoader {
    base_path: PathBuf,
}

impl DataLoader {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        debug!("DataLoader initialized with base path: {:?}", &base_path);
        Self { base_path }
    }

    /// `<base>/<dir>/<stem>.csv`
    pub fn resolve(&self, dir: &str, stem: &str) -> PathBuf {
        self.base_path.join(dir).join(format!("{}.csv", stem))
    }

    /// Loads a single column as numbers.
    pub fn load_column(
        &self,
        dir: &str,
        stem: &str,
        column: usize,
    ) -> Result<Vec<f64>, DataLoadError> {
        let mut columns = self.load_columns(dir, stem, column + 1)?;
        Ok(columns.swap_remove(column))
    }

    /// Loads the first `count` columns of a file in one pass. Every row must
    /// have at least `count` fields.
    pub fn load_columns(
        &self,
        dir: &str,
        stem: &str,
        count: usize,
    ) -> Result<Vec<Vec<f64>>, DataLoadError> {
        let path = self.resolve(dir, stem);
        let path_str = path.to_string_lossy().to_string();
        trace!(path = %path_str, count, "Loading CSV columns.");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b',')
            .quote(b'|')
            .flexible(true)
            .from_path(&path)
            .map_err(|e| DataLoadError::Csv {
                path: path_str.clone(),
                source: e,
            })?;

        let mut columns = vec![Vec::new(); count];
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| DataLoadError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            for (column, values) in columns.iter_mut().enumerate() {
                let field = record.get(column).ok_or_else(|| DataLoadError::MissingColumn {
                    path: path_str.clone(),
                    row,
                    column,
                })?;
                let value =
                    field
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| DataLoadError::InvalidNumber {
                            path: path_str.clone(),
                            row,
                            column,
                            value: field.to_string(),
                        })?;
                values.push(value);
            }
        }

        if columns.first().is_none_or(|c| c.is_empty()) {
            return Err(DataLoadError::Empty(path_str));
        }
        Ok(columns)
    }

    /// Writes one value per line, creating the directory if needed.
    pub fn write_values(
        &self,
        dir: &str,
        stem: &str,
        values: &[f64],
    ) -> Result<PathBuf, DataLoadError> {
        let path = self.resolve(dir, stem);
        let io_err = |e: std::io::Error| DataLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut writer = BufWriter::new(File::create(&path).map_err(io_err)?);
        for value in values {
            writeln!(writer, "{}", value).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;
        debug!(path = %path.display(), count = values.len(), "Parameters written.");
        Ok(path)
    }
}
