//! Temporal distributions: reference curves, region suggestion, depth ratios.

pub mod classify;
pub mod nested;
pub mod ratio;
pub mod table;

pub use classify::{CLASSIFICATION_BANDS, classify};
pub use nested::balanced_storm;
pub use ratio::ratio;
pub use table::{REFERENCE_STORM_HOURS, ReferenceCurveTable};
