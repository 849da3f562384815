//! # StatMechGlass Core Library
//!
//! A statistical-mechanical model of the short-range structure of multicomponent
//! oxide glasses. Given a composition and a fictive temperature, the library
//! predicts the population of every structural species (Qn groups, borate and
//! aluminate coordination states) by simulating the discrete redistribution of
//! modifier atoms over the former network, weighted by Boltzmann factors of
//! fitted interaction enthalpies. It also fits those enthalpies from
//! experimental data by global optimization.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Typed compositions and species states, the
//!   former registry with one engine per former family, CSV data access and the
//!   Tg predictor.
//!
//! - **[`engine`]: The Logic Core.** The incremental structure solver, the
//!   basin-hopping optimizer, fitting configuration, progress reporting and the
//!   engine error type.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures built from the two
//!   layers below: structure prediction, composition series, binary enthalpy
//!   fits and ternary coupling fits.

pub mod core;
pub mod engine;
pub mod workflows;
