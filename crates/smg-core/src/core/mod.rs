//! # Core Module
//!
//! The fundamental building blocks of the glass structure model.
//!
//! ## Overview
//!
//! - **Compositions** ([`composition`]) - Symbol to concentration mappings and their validation
//! - **Species States** ([`species`]) - Per-former species populations with conserved group totals
//! - **Thermodynamics** ([`thermo`]) - Boltzmann factors and the draw-count rounding rule
//! - **Former Families** ([`formers`]) - The `FormerEngine` trait and one engine per former family
//! - **Registry** ([`registry`]) - Symbol lookup and role membership for formers, intermediates and modifiers
//! - **Data Access** ([`io`]) - CSV column loading, parameter stores and parameter persistence
//! - **Tg Prediction** ([`tg`]) - Cubic least-squares fictive temperature predictor
//!
//! Everything in this layer is stateless apart from the data a caller hands in;
//! the iterative algorithms live in [`crate::engine`].

pub mod composition;
pub mod formers;
pub mod io;
pub mod registry;
pub mod species;
pub mod tg;
pub mod thermo;
