//! Numerical utilities: curve evaluation and resampling.

pub mod interp;

pub use interp::*;
