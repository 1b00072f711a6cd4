//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - depth inputs (`RainfallDuration`, `DepthObservation`, `IntensityRatio`)
//! - distribution selection (`DistributionType`, `DistributionChoice`)
//! - validated curves (`CumulativeCurve`)
//! - generation outputs (`Hyetograph`, `HyetographStep`)

pub mod curve;
pub mod types;

pub use curve::*;
pub use types::*;
