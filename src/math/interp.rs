//! Resampling of cumulative curves onto a regular time grid.
//!
//! Interpolation is piecewise-linear between the two tabulated points that
//! bracket each query time. Over a non-decreasing source curve this cannot
//! produce a decrease, but floating-point evaluation at segment boundaries is
//! checked anyway:
//!
//! - a query that hits a tabulated time returns the tabulated value exactly
//! - drift up to `MONOTONE_SLACK` is absorbed into the previous value
//! - anything larger is reported as malformed reference data

use crate::domain::CumulativeCurve;
use crate::error::EngineError;

/// Largest decrease between consecutive samples treated as rounding noise.
const MONOTONE_SLACK: f64 = 1e-12;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
///
/// The last point is exactly `max`.
pub fn linspace(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, EngineError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(EngineError::InvalidParameter(format!(
            "invalid range: min={min}, max={max} (must be finite and max>min)"
        )));
    }
    if steps < 2 {
        return Err(EngineError::InvalidParameter(format!(
            "a grid needs at least 2 points, got {steps}"
        )));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out: Vec<f64> = (0..steps).map(|i| min + step * i as f64).collect();
    out[steps - 1] = max;
    Ok(out)
}

/// Cumulative fraction at storm fraction `t`.
///
/// `t <= 0` gives 0.0 and `t >= 1` gives 1.0.
pub fn evaluate(curve: &CumulativeCurve, t: f64) -> f64 {
    let points = curve.points();
    let last = points[points.len() - 1];
    if t.is_nan() || t <= points[0].time {
        return 0.0;
    }
    if t >= last.time {
        return 1.0;
    }

    // First point strictly after t; the origin is at or before t so idx >= 1.
    let idx = points.partition_point(|p| p.time <= t);
    let lo = points[idx - 1];
    let hi = points[idx];
    if lo.time == t {
        return lo.fraction;
    }

    let frac = ((t - lo.time) / (hi.time - lo.time)).clamp(0.0, 1.0);
    (lo.fraction + (hi.fraction - lo.fraction) * frac).clamp(lo.fraction, hi.fraction)
}

/// Cumulative fractions at `steps` equally spaced times covering `[0, 1]`.
///
/// A single step samples the end of the storm only, giving `[1.0]`.
pub fn resample(curve: &CumulativeCurve, steps: usize) -> Result<Vec<f64>, EngineError> {
    match steps {
        0 => Err(EngineError::InvalidParameter(
            "resampling needs at least 1 point, got 0".to_string(),
        )),
        1 => resample_at(curve, &[1.0]),
        _ => resample_at(curve, &linspace(0.0, 1.0, steps)?),
    }
}

/// Cumulative fractions at caller-chosen storm fractions.
///
/// Query times must be finite and non-decreasing; the output is verified to be
/// non-decreasing as well.
pub fn resample_at(curve: &CumulativeCurve, times: &[f64]) -> Result<Vec<f64>, EngineError> {
    if let Some(bad) = times.iter().find(|t| !t.is_finite()) {
        return Err(EngineError::InvalidParameter(format!("query time {bad} is not finite")));
    }
    if let Some(w) = times.windows(2).find(|w| w[1] < w[0]) {
        return Err(EngineError::InvalidParameter(format!(
            "query times must be non-decreasing: {} follows {}",
            w[1], w[0]
        )));
    }

    let raw: Vec<f64> = times.iter().map(|&t| evaluate(curve, t)).collect();
    enforce_monotone(curve.name(), raw)
}

/// Absorb decreases up to `MONOTONE_SLACK` into the previous value; larger
/// decreases are malformed data.
fn enforce_monotone(curve: &str, mut values: Vec<f64>) -> Result<Vec<f64>, EngineError> {
    for i in 1..values.len() {
        let prev = values[i - 1];
        if values[i] < prev {
            let drift = prev - values[i];
            if drift > MONOTONE_SLACK {
                return Err(EngineError::malformed(
                    curve,
                    format!("resampled curve decreases by {drift:e} at query {i}"),
                ));
            }
            values[i] = prev;
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn kinked() -> CumulativeCurve {
        CumulativeCurve::new(
            "kinked",
            &[(0.0, 0.0), (0.25, 0.1), (0.5, 0.5), (0.75, 0.9), (1.0, 1.0)],
        )
        .unwrap()
    }

    fn random_curve(rng: &mut StdRng) -> CumulativeCurve {
        let n = rng.gen_range(1..12);
        let mut times: Vec<f64> = (0..n).map(|_| rng.gen_range(0.001..0.999)).collect();
        let mut fractions: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..1.0)).collect();
        times.sort_by(|a, b| a.partial_cmp(b).unwrap());
        times.dedup();
        fractions.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut pairs = vec![(0.0, 0.0)];
        pairs.extend(times.iter().zip(fractions.iter()).map(|(&t, &f)| (t, f)));
        pairs.push((1.0, 1.0));
        CumulativeCurve::new("random", &pairs).unwrap()
    }

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(0.0, 1.0, 5).unwrap();
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(linspace(0.0, 1.0, 1).is_err());
        assert!(linspace(1.0, 1.0, 3).is_err());
    }

    #[test]
    fn evaluate_hits_tabulated_points_exactly() {
        let curve = kinked();
        for p in curve.points() {
            assert_eq!(evaluate(&curve, p.time), p.fraction);
        }
    }

    #[test]
    fn evaluate_interpolates_linearly_and_clamps() {
        let curve = kinked();
        assert!((evaluate(&curve, 0.375) - 0.3).abs() < 1e-12);
        assert_eq!(evaluate(&curve, -0.5), 0.0);
        assert_eq!(evaluate(&curve, 0.0), 0.0);
        assert_eq!(evaluate(&curve, 1.0), 1.0);
        assert_eq!(evaluate(&curve, 3.0), 1.0);
    }

    #[test]
    fn resample_spans_unit_interval() {
        let values = resample(&kinked(), 9).unwrap();
        assert_eq!(values.len(), 9);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[8], 1.0);
        assert!((values[4] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_step_samples_storm_end() {
        assert_eq!(resample(&kinked(), 1).unwrap(), vec![1.0]);
        assert!(matches!(resample(&kinked(), 0), Err(EngineError::InvalidParameter(_))));
    }

    #[test]
    fn ulp_drift_is_absorbed() {
        let values = enforce_monotone("c", vec![0.0, 0.5, 0.5 - 1e-13, 1.0]).unwrap();
        assert_eq!(values, vec![0.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn real_decrease_is_malformed() {
        let err = enforce_monotone("c", vec![0.0, 0.5, 0.4, 1.0]).unwrap_err();
        match err {
            EngineError::MalformedReferenceData { curve, reason } => {
                assert_eq!(curve, "c");
                assert!(reason.contains("query 2"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn resample_at_rejects_unsorted_or_nan_queries() {
        assert!(resample_at(&kinked(), &[0.5, 0.2]).is_err());
        assert!(resample_at(&kinked(), &[0.1, f64::NAN]).is_err());
    }

    #[test]
    fn requerying_a_time_is_idempotent() {
        let curve = kinked();
        let values = resample_at(&curve, &[0.3, 0.3, 0.3]).unwrap();
        assert_eq!(values[0], values[1]);
        assert_eq!(values[1], values[2]);
        assert_eq!(values[0], evaluate(&curve, 0.3));
    }

    #[test]
    fn resample_is_monotone_for_random_curves() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let curve = random_curve(&mut rng);
            let steps = rng.gen_range(2..600);
            let values = resample(&curve, steps).unwrap();
            assert_eq!(values.len(), steps);
            assert!(values.windows(2).all(|w| w[1] >= w[0]));
            assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
            assert_eq!(values[steps - 1], 1.0);
        }
    }

    #[test]
    fn resample_is_monotone_across_segment_boundaries() {
        // Query times straddling each tabulated time by one ulp.
        let curve = kinked();
        let mut times = Vec::new();
        for p in curve.points() {
            let t = p.time;
            times.push(f64::from_bits(t.to_bits().saturating_sub(1)).max(0.0));
            times.push(t);
            times.push(f64::from_bits(t.to_bits() + 1).min(1.0));
        }
        times.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let values = resample_at(&curve, &times).unwrap();
        assert!(values.windows(2).all(|w| w[1] >= w[0]));
    }
}
