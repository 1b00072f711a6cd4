//! `hyetograph` library crate.
//!
//! The binary (`hyeto`) is a thin wrapper around this library so that:
//!
//! - the distribution engine is testable without spawning processes
//! - modules are reusable (e.g., other storm tools embedding the engine)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod distribution;
pub mod domain;
pub mod error;
pub mod hyetograph;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
