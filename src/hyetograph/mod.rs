//! Hyetograph generation.

pub mod builder;

pub use builder::{MASS_TOLERANCE, build, build_with_shape, steps_covering};
