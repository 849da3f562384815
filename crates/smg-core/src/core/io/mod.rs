//! # Data Access Module
//!
//! CSV-backed access to experimental data and interaction parameters.
//!
//! All paths are resolved against the base directory held by a
//! [`loader::DataLoader`]; nothing in this module touches the process working
//! directory. Files are headerless, comma-delimited and use `|` as the quote
//! character. Columns are positional.
//!
//! - [`loader`] - Column loading and parameter persistence
//! - [`store`] - The [`store::ParameterStore`] abstraction over file-backed and in-memory parameters

pub mod loader;
pub mod store;
