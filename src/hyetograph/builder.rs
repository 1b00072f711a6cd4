//! Cumulative curve + total depth → incremental rainfall series.
//!
//! Steps:
//! 1. `step_count = ceil(storm_minutes / step_minutes)`
//! 2. resample the curve at `i * step_minutes` for `i = 0..=step_count`
//!    (the final time is clamped to the end of the storm)
//! 3. cumulative depth = fraction × total depth
//! 4. increments are first differences, row 0 keeps `cumulative[0]`
//! 5. `ceil(tail_minutes / step_minutes)` zero rows are appended
//!
//! The storm window must sum to the total depth (relative tolerance
//! `MASS_TOLERANCE`); the remaining rounding residue goes into the last storm row
//! so the sum is exact.

use chrono::TimeDelta;
use tracing::debug;

use crate::domain::{CumulativeCurve, Hyetograph, HyetographStep, StormShape};
use crate::error::EngineError;
use crate::math::resample_at;

/// Relative tolerance on the storm-window sum before residue absorption.
pub const MASS_TOLERANCE: f64 = 1e-6;

/// Guards `ceil` against `240.00000000000003`-style products.
const STEP_COUNT_SLACK: f64 = 1e-9;

/// Number of `step_minutes` rows needed to cover `hours`.
pub fn steps_covering(hours: f64, step_minutes: u32) -> usize {
    if hours <= 0.0 || step_minutes == 0 {
        return 0;
    }
    let exact = hours * 60.0 / step_minutes as f64;
    (exact - STEP_COUNT_SLACK).ceil().max(0.0) as usize
}

/// Build a hyetograph for `total_depth` distributed along `curve`.
pub fn build(
    curve: &CumulativeCurve,
    total_depth: f64,
    storm_hours: f64,
    step_minutes: u32,
    tail_hours: f64,
) -> Result<Hyetograph, EngineError> {
    validate(total_depth, storm_hours, step_minutes, tail_hours)?;

    let step_count = steps_covering(storm_hours, step_minutes);
    let storm_minutes = storm_hours * 60.0;
    let times: Vec<f64> = (0..=step_count)
        .map(|i| ((i as f64 * step_minutes as f64) / storm_minutes).min(1.0))
        .collect();
    let fractions = resample_at(curve, &times)?;

    let cumulative: Vec<f64> = fractions.iter().map(|f| f * total_depth).collect();
    let mut increments = Vec::with_capacity(cumulative.len());
    increments.push(cumulative[0]);
    for w in cumulative.windows(2) {
        increments.push(w[1] - w[0]);
    }

    check_mass(&increments, total_depth)?;
    absorb_residue(&mut increments, total_depth)?;

    let tail_rows = steps_covering(tail_hours, step_minutes);
    let mut steps = Vec::with_capacity(increments.len() + tail_rows);
    let mut running = 0.0;
    for (i, inc) in increments.iter().enumerate() {
        running += inc;
        steps.push(HyetographStep {
            offset: step_offset(i, step_minutes),
            incremental_depth: *inc,
            cumulative_depth: running,
        });
    }
    let storm_rows = steps.len();
    for j in 1..=tail_rows {
        steps.push(HyetographStep {
            offset: step_offset(step_count + j, step_minutes),
            incremental_depth: 0.0,
            cumulative_depth: running,
        });
    }

    debug!(
        step_count,
        tail_rows,
        total_depth,
        curve = curve.name(),
        "built hyetograph"
    );

    Ok(Hyetograph {
        steps,
        storm_rows,
        step_minutes,
        total_depth,
    })
}

/// Same as `build`, taking the storm shape as one value.
pub fn build_with_shape(
    curve: &CumulativeCurve,
    total_depth: f64,
    shape: &StormShape,
) -> Result<Hyetograph, EngineError> {
    build(curve, total_depth, shape.storm_hours, shape.step_minutes, shape.tail_hours)
}

fn validate(total_depth: f64, storm_hours: f64, step_minutes: u32, tail_hours: f64) -> Result<(), EngineError> {
    if !(total_depth.is_finite() && total_depth > 0.0) {
        return Err(EngineError::InvalidParameter(format!(
            "total depth must be positive, got {total_depth}"
        )));
    }
    if !(storm_hours.is_finite() && storm_hours > 0.0) {
        return Err(EngineError::InvalidParameter(format!(
            "storm duration must be positive, got {storm_hours} h"
        )));
    }
    if step_minutes == 0 {
        return Err(EngineError::InvalidParameter("time step must be at least 1 minute".to_string()));
    }
    if !(tail_hours.is_finite() && tail_hours >= 0.0) {
        return Err(EngineError::InvalidParameter(format!(
            "tail duration must be zero or positive, got {tail_hours} h"
        )));
    }
    Ok(())
}

/// Fail unless the raw increments are all non-negative and sum to `total_depth`
/// within `MASS_TOLERANCE` (relative).
fn check_mass(increments: &[f64], total_depth: f64) -> Result<(), EngineError> {
    let raw_sum: f64 = increments.iter().sum();
    let negative = increments.iter().any(|v| *v < 0.0);
    if negative || (raw_sum - total_depth).abs() > MASS_TOLERANCE * total_depth {
        return Err(EngineError::MassConservation {
            expected: total_depth,
            actual: raw_sum,
        });
    }
    Ok(())
}

/// Rewrite the last row so the increments sum to `total_depth` exactly.
///
/// Summation order matters for exactness, so the residue is computed against
/// the same left-to-right sum used everywhere else. A residue below zero by more
/// than rounding noise means the earlier rows already exceed the total.
fn absorb_residue(increments: &mut [f64], total_depth: f64) -> Result<(), EngineError> {
    let Some(last) = increments.len().checked_sub(1) else {
        return Ok(());
    };
    let head: f64 = increments[..last].iter().sum();
    let residue = total_depth - head;
    let rounding = 4.0 * f64::EPSILON * total_depth * increments.len() as f64;
    if residue < -rounding {
        return Err(EngineError::MassConservation {
            expected: total_depth,
            actual: head,
        });
    }
    increments[last] = residue.max(0.0);
    Ok(())
}

fn step_offset(index: usize, step_minutes: u32) -> TimeDelta {
    TimeDelta::minutes(index as i64 * step_minutes as i64)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::distribution::ReferenceCurveTable;
    use crate::domain::DistributionType;

    fn linear() -> CumulativeCurve {
        CumulativeCurve::new("linear", &[(0.0, 0.0), (1.0, 1.0)]).unwrap()
    }

    #[test]
    fn steps_covering_rounds_up() {
        assert_eq!(steps_covering(24.0, 6), 240);
        assert_eq!(steps_covering(24.0, 60), 24);
        assert_eq!(steps_covering(24.0, 7), 206);
        assert_eq!(steps_covering(0.0, 5), 0);
        assert_eq!(steps_covering(0.1, 6), 1);
    }

    #[test]
    fn linear_curve_gives_uniform_increments() {
        let h = build(&linear(), 2.4, 24.0, 60, 0.0).unwrap();
        assert_eq!(h.len(), 25);
        assert_eq!(h.steps()[0].incremental_depth, 0.0);
        for s in &h.steps()[1..] {
            assert!((s.incremental_depth - 0.1).abs() < 1e-12);
        }
        assert!(h.tail().is_empty());
    }

    #[test]
    fn region_b_end_to_end_shape() {
        let table = ReferenceCurveTable::load().unwrap();
        let curve = table.lookup(&DistributionType::RegionB).unwrap();
        let h = build(curve, 4.0, 24.0, 60, 24.0).unwrap();

        assert_eq!(h.storm_window().len(), 25);
        assert_eq!(h.tail().len(), 24);
        assert_eq!(h.len(), 49);
        assert_eq!(h.storm_sum(), 4.0);
        assert!(h.storm_window()[1..].iter().all(|s| s.incremental_depth > 0.0));
        assert!(h.tail().iter().all(|s| s.incremental_depth == 0.0));
        assert_eq!(h.steps()[48].offset, TimeDelta::hours(48));
        assert_eq!(h.steps()[48].cumulative_depth, 4.0);
    }

    #[test]
    fn offsets_follow_step_resolution() {
        let h = build(&linear(), 1.0, 24.0, 6, 24.0).unwrap();
        assert_eq!(h.len(), 481);
        for (i, s) in h.steps().iter().enumerate() {
            assert_eq!(s.offset, TimeDelta::minutes(6 * i as i64));
        }
        assert!((h.steps()[480].hours() - 48.0).abs() < 1e-12);
    }

    #[test]
    fn partial_last_step_is_clamped_to_storm_end() {
        let h = build(&linear(), 1.0, 1.0, 25, 0.0).unwrap();
        // 60 / 25 -> 3 steps: 0, 25, 50, 75 minutes; the last one ends the storm.
        assert_eq!(h.storm_window().len(), 4);
        assert_eq!(h.storm_sum(), 1.0);
        assert!((h.steps()[3].incremental_depth - 10.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let c = linear();
        assert!(matches!(build(&c, 0.0, 24.0, 6, 24.0), Err(EngineError::InvalidParameter(_))));
        assert!(matches!(build(&c, -1.0, 24.0, 6, 24.0), Err(EngineError::InvalidParameter(_))));
        assert!(matches!(build(&c, 1.0, 0.0, 6, 24.0), Err(EngineError::InvalidParameter(_))));
        assert!(matches!(build(&c, 1.0, 24.0, 0, 24.0), Err(EngineError::InvalidParameter(_))));
        assert!(matches!(build(&c, 1.0, 24.0, 6, -1.0), Err(EngineError::InvalidParameter(_))));
        assert!(matches!(build(&c, f64::NAN, 24.0, 6, 24.0), Err(EngineError::InvalidParameter(_))));
    }

    #[test]
    fn mass_is_conserved_for_random_inputs() {
        let table = ReferenceCurveTable::load().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..300 {
            let t = DistributionType::BUILT_IN[rng.gen_range(0..8)].clone();
            let curve = table.lookup(&t).unwrap();
            let depth = rng.gen_range(0.01..500.0);
            let storm = rng.gen_range(1.0..72.0);
            let step = rng.gen_range(1..=90);
            let tail = rng.gen_range(0.0..48.0);
            let h = build(curve, depth, storm, step, tail).unwrap();

            let sum = h.storm_sum();
            assert!(((sum - depth) / depth).abs() <= 1e-12, "{t}: {sum} vs {depth}");
            assert!(h.steps().iter().all(|s| s.incremental_depth >= 0.0));
            assert!(h.tail().iter().all(|s| s.incremental_depth == 0.0));
            assert_eq!(h.storm_window().len(), steps_covering(storm, step) + 1);
            assert_eq!(h.tail().len(), steps_covering(tail, step));
        }
    }

    #[test]
    fn scs_type_ii_peaks_just_before_noon() {
        let table = ReferenceCurveTable::load().unwrap();
        let curve = table.lookup(&DistributionType::ScsTypeII).unwrap();
        let h = build(curve, 10.0, 24.0, 6, 24.0).unwrap();
        let peak = h.peak().unwrap();
        assert!(peak.hours() > 11.75 && peak.hours() <= 12.0, "peak at {}", peak.hours());
        assert!((h.steps()[480].cumulative_depth - 10.0).abs() < 1e-9);
    }

    #[test]
    fn mass_check_rejects_drift_beyond_tolerance() {
        let err = check_mass(&[0.0, 0.5, 0.49999], 1.0).unwrap_err();
        assert!(matches!(err, EngineError::MassConservation { expected, .. } if expected == 1.0));
    }

    #[test]
    fn mass_check_rejects_negative_increment() {
        // Sums to the total, but one row is negative.
        let err = check_mass(&[0.0, 0.6, -0.1, 0.5], 1.0).unwrap_err();
        assert!(matches!(err, EngineError::MassConservation { .. }));
    }

    #[test]
    fn mass_check_accepts_drift_within_tolerance() {
        check_mass(&[0.0, 0.5, 0.5000005], 1.0).unwrap();
        check_mass(&[0.0, 2.0, 1.9999999], 4.0).unwrap();
    }

    #[test]
    fn residue_goes_into_last_row() {
        let mut inc = vec![0.0, 0.25, 0.25, 0.4999999];
        absorb_residue(&mut inc, 1.0).unwrap();
        assert_eq!(inc[3], 0.5);
        assert_eq!(inc.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn residue_rejects_head_above_total() {
        let mut inc = vec![0.0, 0.5, 0.6, 0.0];
        let err = absorb_residue(&mut inc, 1.0).unwrap_err();
        assert!(matches!(err, EngineError::MassConservation { actual, .. } if actual > 1.0));
        // Unchanged on failure.
        assert_eq!(inc[3], 0.0);
    }

    #[test]
    fn residue_clamps_rounding_noise_to_zero() {
        let mut inc = vec![0.1, 0.2, 0.7000000000000001, 0.0];
        absorb_residue(&mut inc, 1.0).unwrap();
        assert_eq!(inc[3], 0.0);
    }
}
