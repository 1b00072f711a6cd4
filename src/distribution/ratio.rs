//! Intensity ratio between two depths of the same return period.

use crate::domain::{DepthObservation, IntensityRatio};
use crate::error::EngineError;

/// `short.depth / long.depth`, unclamped.
pub fn ratio(short: &DepthObservation, long: &DepthObservation) -> Result<IntensityRatio, EngineError> {
    if short.return_period_years != long.return_period_years {
        return Err(EngineError::MismatchedReturnPeriod {
            short: short.return_period_years,
            long: long.return_period_years,
        });
    }
    if !(long.depth > 0.0) {
        return Err(EngineError::DivisionByZero(long.depth));
    }
    Ok(IntensityRatio::new(short.depth / long.depth))
}
