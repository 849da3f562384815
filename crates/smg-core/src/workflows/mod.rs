//! # Workflows Module
//!
//! High-level entry points that combine data loading, the structure solver and
//! the optimiser. Every workflow takes a [`DataLoader`](crate::core::io::loader::DataLoader)
//! rooted at the data directory instead of relying on the working directory.
//!
//! - **Structure Prediction** ([`structure`]) - Species distribution of one glass
//! - **Composition Series** ([`series`]) - Sweep of one component with optional CSV export
//! - **Binary Fits** ([`binary`]) - Former-modifier enthalpies from binary glass data
//! - **Ternary Fits** ([`ternary`]) - Former-former coupling constants from ternary glass data

pub mod binary;
pub mod series;
pub mod structure;
pub mod ternary;
