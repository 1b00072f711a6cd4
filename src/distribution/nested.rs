//! Balanced (nested) storm construction.
//!
//! NEH Part 630 Chapter 4 publishes, per Atlas 14 region, the mean ratio of the
//! maximum x-hour depth to the 24-hour depth. Nesting every duration around the
//! storm center gives the preliminary symmetric distribution:
//!
//! `C(center ± d/2) = 0.5 ± r(d) / 2`, with `C(center) = 0.5`
//!
//! so the most intense `d` hours always straddle the center. Between control
//! durations the ratio is linear in `d`, which makes the resulting cumulative
//! curve linear between the constructed points as well.

use crate::domain::CumulativeCurve;
use crate::error::EngineError;

/// Build a cumulative curve from `(duration_hours, depth_ratio)` control points.
///
/// Control points must have strictly increasing durations within
/// `(0, storm_hours]`, non-decreasing ratios within `(0, 1]`, and end at
/// `(storm_hours, 1.0)`.
pub fn balanced_storm(
    name: &str,
    ratios: &[(f64, f64)],
    storm_hours: f64,
) -> Result<CumulativeCurve, EngineError> {
    validate_ratios(name, ratios, storm_hours)?;

    let center = storm_hours / 2.0;
    let mut pairs = Vec::with_capacity(ratios.len() * 2 + 1);
    for &(d, r) in ratios.iter().rev() {
        pairs.push((center - d / 2.0, 0.5 - r / 2.0));
    }
    pairs.push((center, 0.5));
    for &(d, r) in ratios {
        pairs.push((center + d / 2.0, 0.5 + r / 2.0));
    }

    CumulativeCurve::from_hours(name, &pairs)
}

fn validate_ratios(name: &str, ratios: &[(f64, f64)], storm_hours: f64) -> Result<(), EngineError> {
    if !(storm_hours.is_finite() && storm_hours > 0.0) {
        return Err(EngineError::malformed(
            name,
            format!("storm duration must be positive, got {storm_hours}"),
        ));
    }
    let Some(&(last_d, last_r)) = ratios.last() else {
        return Err(EngineError::malformed(name, "no duration-depth ratios"));
    };

    for &(d, r) in ratios {
        if !(d.is_finite() && d > 0.0 && d <= storm_hours) {
            return Err(EngineError::malformed(
                name,
                format!("duration {d} h lies outside (0, {storm_hours}]"),
            ));
        }
        if !(r.is_finite() && r > 0.0 && r <= 1.0) {
            return Err(EngineError::malformed(name, format!("depth ratio {r} lies outside (0, 1]")));
        }
    }
    for w in ratios.windows(2) {
        if w[1].0 <= w[0].0 {
            return Err(EngineError::malformed(
                name,
                format!("durations must increase: {} h follows {} h", w[1].0, w[0].0),
            ));
        }
        if w[1].1 < w[0].1 {
            return Err(EngineError::malformed(
                name,
                format!("depth ratio drops from {} to {} at {} h", w[0].1, w[1].1, w[1].0),
            ));
        }
    }
    if (last_d - storm_hours).abs() > 1e-9 || (last_r - 1.0).abs() > 1e-9 {
        return Err(EngineError::malformed(
            name,
            format!("ratios must end at ({storm_hours} h, 1.0), end at ({last_d} h, {last_r})"),
        ));
    }
    Ok(())
}
