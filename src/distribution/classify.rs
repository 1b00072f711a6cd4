//! Region suggestion from the 60-min / 24-hr depth ratio.
//!
//! The bands are half-open: lower edge inclusive, upper edge exclusive, and the
//! top band is unbounded. The suggestion is advisory; callers may override it.

use tracing::warn;

use crate::domain::{DistributionType, IntensityRatio};

/// `(lower_bound, distribution)` pairs in ascending order of lower bound.
pub const CLASSIFICATION_BANDS: [(f64, DistributionType); 4] = [
    (f64::NEG_INFINITY, DistributionType::RegionA),
    (0.30, DistributionType::RegionB),
    (0.35, DistributionType::RegionC),
    (0.40, DistributionType::RegionD),
];

/// Suggest a distribution for `ratio`. Total: every input gets a region.
///
/// Ratios outside `[0, 1]` come from extrapolated or inconsistent depth data.
/// They are classified by the same bands and logged.
pub fn classify(ratio: IntensityRatio) -> DistributionType {
    let r = ratio.value();
    if !ratio.is_nominal() {
        warn!(ratio = r, "intensity ratio outside [0, 1]; classifying anyway");
    }

    CLASSIFICATION_BANDS
        .iter()
        .rev()
        .find(|(lower, _)| r >= *lower)
        .map(|(_, distribution)| distribution.clone())
        .unwrap_or(DistributionType::RegionA)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(r: f64) -> DistributionType {
        classify(IntensityRatio::new(r))
    }

    #[test]
    fn band_edges_are_lower_inclusive() {
        assert_eq!(at(0.29), DistributionType::RegionA);
        assert_eq!(at(0.30), DistributionType::RegionB);
        assert_eq!(at(0.349), DistributionType::RegionB);
        assert_eq!(at(0.35), DistributionType::RegionC);
        assert_eq!(at(0.399), DistributionType::RegionC);
        assert_eq!(at(0.40), DistributionType::RegionD);
    }

    #[test]
    fn out_of_range_ratios_still_classify() {
        assert_eq!(at(-0.2), DistributionType::RegionA);
        assert_eq!(at(1.7), DistributionType::RegionD);
        assert_eq!(at(f64::INFINITY), DistributionType::RegionD);
        assert_eq!(at(f64::NEG_INFINITY), DistributionType::RegionA);
    }

    #[test]
    fn classification_is_monotone() {
        let order = |t: &DistributionType| {
            CLASSIFICATION_BANDS
                .iter()
                .position(|(_, d)| d == t)
                .unwrap()
        };
        let mut prev = 0;
        for i in 0..=1000 {
            let r = i as f64 / 1000.0;
            let rank = order(&at(r));
            assert!(rank >= prev, "ratio {r} went back to band {rank}");
            prev = rank;
        }
        assert_eq!(prev, 3);
    }
}
