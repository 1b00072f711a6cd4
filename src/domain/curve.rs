//! Validated cumulative rainfall curves.
//!
//! A `CumulativeCurve` maps the elapsed fraction of the storm to the fraction of
//! total storm depth fallen so far. Every curve in the crate, built-in or
//! caller-supplied, goes through `CumulativeCurve::new`, so a value of this type
//! always satisfies:
//!
//! - at least two points, all finite and within `[0, 1]` on both axes
//! - first point `(0, 0)`, last point `(1, 1)`
//! - time strictly increasing, cumulative fraction non-decreasing

use serde::Serialize;

use crate::error::EngineError;

/// Endpoints within this distance of `(0,0)` / `(1,1)` are snapped exactly.
///
/// Digitized tables and hand-edited JSON routinely carry `0.99999999`-style values.
pub const ENDPOINT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    /// Elapsed fraction of the storm duration.
    pub time: f64,
    /// Fraction of the total storm depth accumulated at `time`.
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeCurve {
    name: String,
    points: Vec<CurvePoint>,
}

impl CumulativeCurve {
    /// Build a curve from `(time_fraction, cumulative_fraction)` pairs.
    pub fn new(name: impl Into<String>, pairs: &[(f64, f64)]) -> Result<Self, EngineError> {
        let name = name.into();
        let malformed = |reason: String| EngineError::malformed(name.clone(), reason);

        if pairs.len() < 2 {
            return Err(malformed(format!(
                "a curve needs at least 2 points, got {}",
                pairs.len()
            )));
        }

        let mut points = Vec::with_capacity(pairs.len());
        for (idx, &(time, fraction)) in pairs.iter().enumerate() {
            if !(time.is_finite() && fraction.is_finite()) {
                return Err(malformed(format!("point {idx} is not finite: ({time}, {fraction})")));
            }
            points.push(CurvePoint { time, fraction });
        }

        let first = points[0];
        if first.time.abs() > ENDPOINT_TOLERANCE || first.fraction.abs() > ENDPOINT_TOLERANCE {
            return Err(malformed(format!(
                "curve must start at (0, 0), starts at ({}, {})",
                first.time, first.fraction
            )));
        }
        let last_idx = points.len() - 1;
        let last = points[last_idx];
        if (last.time - 1.0).abs() > ENDPOINT_TOLERANCE || (last.fraction - 1.0).abs() > ENDPOINT_TOLERANCE {
            return Err(malformed(format!(
                "curve must end at (1, 1), ends at ({}, {})",
                last.time, last.fraction
            )));
        }
        points[0] = CurvePoint { time: 0.0, fraction: 0.0 };
        points[last_idx] = CurvePoint { time: 1.0, fraction: 1.0 };

        for (idx, p) in points.iter().enumerate() {
            if !(0.0..=1.0).contains(&p.time) || !(0.0..=1.0).contains(&p.fraction) {
                return Err(malformed(format!(
                    "point {idx} ({}, {}) lies outside [0, 1]",
                    p.time, p.fraction
                )));
            }
        }

        for (idx, w) in points.windows(2).enumerate() {
            if w[1].time <= w[0].time {
                return Err(malformed(format!(
                    "time must be strictly increasing: point {} at {} follows {}",
                    idx + 1,
                    w[1].time,
                    w[0].time
                )));
            }
            if w[1].fraction < w[0].fraction {
                return Err(malformed(format!(
                    "cumulative fraction decreases at point {}: {} after {}",
                    idx + 1,
                    w[1].fraction,
                    w[0].fraction
                )));
            }
        }

        Ok(Self { name, points })
    }

    /// Build a curve whose times are given in hours; the last time is the storm duration.
    pub fn from_hours(name: impl Into<String>, pairs: &[(f64, f64)]) -> Result<Self, EngineError> {
        let name = name.into();
        let storm_hours = match pairs.last() {
            Some(&(h, _)) if h.is_finite() && h > 0.0 => h,
            Some(&(h, _)) => {
                return Err(EngineError::malformed(
                    name,
                    format!("storm duration must be a positive number of hours, got {h}"),
                ));
            }
            None => return Err(EngineError::malformed(name, "a curve needs at least 2 points, got 0")),
        };
        let normalized: Vec<(f64, f64)> = pairs.iter().map(|&(h, f)| (h / storm_hours, f)).collect();
        Self::new(name, &normalized)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
