//! # Engine Module
//!
//! The iterative algorithms of the model: the structure solver that turns a
//! composition and fictive temperature into a species distribution, and the
//! basin-hopping optimiser the fitting workflows build on.
//!
//! - **Structure Solver** ([`solver`]) - Modifier draws distributed over formers and intermediates
//! - **Optimisation** ([`optimize`]) - Basin hopping with bounded Nelder–Mead local searches
//! - **Configuration** ([`config`]) - Fit settings and their builder
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Errors raised by the solver and the workflows

pub mod config;
pub mod error;
pub mod optimize;
pub mod progress;
pub mod solver;
