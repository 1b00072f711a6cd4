//! Digitized reference curves.
//!
//! Two kinds of source data are stored:
//!
//! - SCS Type I / IA / II / III: NRCS TR-55 24-hour cumulative fractions, in hours.
//! - NOAA Atlas 14 Regions A–D: NEH 630 Chapter 4 mean ratios of the x-hour
//!   depth to the 24-hour depth, turned into a curve by `balanced_storm`.
//!
//! Every curve is built and validated when the table is loaded; a bad entry
//! fails the whole load instead of surfacing on some later lookup.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::distribution::nested::balanced_storm;
use crate::domain::{CumulativeCurve, DistributionType};
use crate::error::EngineError;

/// Duration of every tabulated reference storm.
pub const REFERENCE_STORM_HOURS: f64 = 24.0;

/// Raw digitized data for one distribution.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CurveSource {
    /// `(hours, cumulative_fraction)` pairs.
    Tabulated(&'static [(f64, f64)]),
    /// `(duration_minutes, depth_ratio)` control points.
    DepthRatios(&'static [(f64, f64)]),
}

const SCS_TYPE_I: &[(f64, f64)] = &[
    (0.0, 0.0),
    (2.0, 0.035),
    (4.0, 0.076),
    (6.0, 0.125),
    (7.0, 0.156),
    (8.0, 0.194),
    (8.5, 0.219),
    (9.0, 0.254),
    (9.5, 0.303),
    (9.75, 0.362),
    (10.0, 0.515),
    (10.5, 0.583),
    (11.0, 0.624),
    (11.5, 0.654),
    (11.75, 0.669),
    (12.0, 0.682),
    (12.5, 0.706),
    (13.0, 0.727),
    (13.5, 0.748),
    (14.0, 0.767),
    (16.0, 0.830),
    (20.0, 0.926),
    (24.0, 1.0),
];

const SCS_TYPE_IA: &[(f64, f64)] = &[
    (0.0, 0.0),
    (2.0, 0.050),
    (4.0, 0.116),
    (6.0, 0.206),
    (7.0, 0.268),
    (8.0, 0.425),
    (8.5, 0.480),
    (9.0, 0.520),
    (9.5, 0.550),
    (9.75, 0.564),
    (10.0, 0.577),
    (10.5, 0.601),
    (11.0, 0.624),
    (11.5, 0.645),
    (11.75, 0.654),
    (12.0, 0.664),
    (12.5, 0.683),
    (13.0, 0.701),
    (13.5, 0.719),
    (14.0, 0.736),
    (16.0, 0.800),
    (20.0, 0.906),
    (24.0, 1.0),
];

const SCS_TYPE_II: &[(f64, f64)] = &[
    (0.0, 0.0),
    (2.0, 0.022),
    (4.0, 0.048),
    (6.0, 0.080),
    (7.0, 0.098),
    (8.0, 0.120),
    (8.5, 0.133),
    (9.0, 0.147),
    (9.5, 0.163),
    (9.75, 0.172),
    (10.0, 0.181),
    (10.5, 0.204),
    (11.0, 0.235),
    (11.5, 0.283),
    (11.75, 0.357),
    (12.0, 0.663),
    (12.5, 0.735),
    (13.0, 0.772),
    (13.5, 0.799),
    (14.0, 0.820),
    (16.0, 0.880),
    (20.0, 0.952),
    (24.0, 1.0),
];

const SCS_TYPE_III: &[(f64, f64)] = &[
    (0.0, 0.0),
    (2.0, 0.020),
    (4.0, 0.043),
    (6.0, 0.072),
    (7.0, 0.089),
    (8.0, 0.115),
    (8.5, 0.130),
    (9.0, 0.148),
    (9.5, 0.167),
    (9.75, 0.178),
    (10.0, 0.189),
    (10.5, 0.216),
    (11.0, 0.250),
    (11.5, 0.298),
    (11.75, 0.339),
    (12.0, 0.500),
    (12.5, 0.702),
    (13.0, 0.751),
    (13.5, 0.785),
    (14.0, 0.811),
    (16.0, 0.886),
    (20.0, 0.957),
    (24.0, 1.0),
];

// NEH 630.04, Figure 4-72: 5, 10, 15, 30 min and 1, 2, 3, 6, 12, 24 h.
const REGION_A_RATIOS: &[(f64, f64)] = &[
    (5.0, 0.143),
    (10.0, 0.219),
    (15.0, 0.272),
    (30.0, 0.386),
    (60.0, 0.502),
    (120.0, 0.594),
    (180.0, 0.635),
    (360.0, 0.749),
    (720.0, 0.864),
    (1440.0, 1.0),
];

const REGION_B_RATIOS: &[(f64, f64)] = &[
    (5.0, 0.121),
    (10.0, 0.189),
    (15.0, 0.237),
    (30.0, 0.344),
    (60.0, 0.453),
    (120.0, 0.543),
    (180.0, 0.585),
    (360.0, 0.705),
    (720.0, 0.840),
    (1440.0, 1.0),
];

const REGION_C_RATIOS: &[(f64, f64)] = &[
    (5.0, 0.105),
    (10.0, 0.166),
    (15.0, 0.210),
    (30.0, 0.308),
    (60.0, 0.409),
    (120.0, 0.500),
    (180.0, 0.545),
    (360.0, 0.672),
    (720.0, 0.823),
    (1440.0, 1.0),
];

const REGION_D_RATIOS: &[(f64, f64)] = &[
    (5.0, 0.094),
    (10.0, 0.149),
    (15.0, 0.188),
    (30.0, 0.276),
    (60.0, 0.366),
    (120.0, 0.454),
    (180.0, 0.501),
    (360.0, 0.636),
    (720.0, 0.805),
    (1440.0, 1.0),
];

const REFERENCE_DATA: [(DistributionType, CurveSource); 8] = [
    (DistributionType::RegionA, CurveSource::DepthRatios(REGION_A_RATIOS)),
    (DistributionType::RegionB, CurveSource::DepthRatios(REGION_B_RATIOS)),
    (DistributionType::RegionC, CurveSource::DepthRatios(REGION_C_RATIOS)),
    (DistributionType::RegionD, CurveSource::DepthRatios(REGION_D_RATIOS)),
    (DistributionType::ScsTypeI, CurveSource::Tabulated(SCS_TYPE_I)),
    (DistributionType::ScsTypeIA, CurveSource::Tabulated(SCS_TYPE_IA)),
    (DistributionType::ScsTypeII, CurveSource::Tabulated(SCS_TYPE_II)),
    (DistributionType::ScsTypeIII, CurveSource::Tabulated(SCS_TYPE_III)),
];

static GLOBAL_TABLE: OnceLock<Result<ReferenceCurveTable, EngineError>> = OnceLock::new();

/// Immutable mapping from distribution type to its validated cumulative curve.
#[derive(Debug, Clone)]
pub struct ReferenceCurveTable {
    curves: HashMap<&'static str, CumulativeCurve>,
}

impl ReferenceCurveTable {
    /// Build and validate the shipped reference table.
    pub fn load() -> Result<Self, EngineError> {
        Self::from_sources(&REFERENCE_DATA)
    }

    /// Process-wide table, loaded on first use and shared read-only afterwards.
    pub fn global() -> Result<&'static Self, EngineError> {
        GLOBAL_TABLE.get_or_init(Self::load).as_ref().map_err(Clone::clone)
    }

    pub(crate) fn from_sources(sources: &[(DistributionType, CurveSource)]) -> Result<Self, EngineError> {
        let mut curves = HashMap::with_capacity(sources.len());
        for (distribution, source) in sources {
            let name = distribution.display_name();
            let curve = match source {
                CurveSource::Tabulated(pairs) => CumulativeCurve::from_hours(name, pairs)?,
                CurveSource::DepthRatios(ratios) => {
                    let hours: Vec<(f64, f64)> = ratios.iter().map(|&(m, r)| (m / 60.0, r)).collect();
                    balanced_storm(name, &hours, REFERENCE_STORM_HOURS)?
                }
            };
            debug!(distribution = name, points = curve.len(), "loaded reference curve");
            Self::insert(&mut curves, distribution, curve)?;
        }
        Ok(Self { curves })
    }

    /// Table from already-built curves (e.g. a restricted set for a front end).
    pub fn from_curves(entries: Vec<(DistributionType, CumulativeCurve)>) -> Result<Self, EngineError> {
        let mut curves = HashMap::with_capacity(entries.len());
        for (distribution, curve) in entries {
            Self::insert(&mut curves, &distribution, curve)?;
        }
        Ok(Self { curves })
    }

    fn insert(
        curves: &mut HashMap<&'static str, CumulativeCurve>,
        distribution: &DistributionType,
        curve: CumulativeCurve,
    ) -> Result<(), EngineError> {
        if distribution.is_custom() {
            return Err(EngineError::malformed(
                distribution.display_name(),
                "custom curves are supplied per request, not tabulated",
            ));
        }
        if curves.insert(distribution.slug(), curve).is_some() {
            return Err(EngineError::malformed(
                distribution.display_name(),
                "distribution is tabulated twice",
            ));
        }
        Ok(())
    }

    /// Curve for `distribution`. A custom type resolves to the curve it carries.
    pub fn lookup<'a>(&'a self, distribution: &'a DistributionType) -> Result<&'a CumulativeCurve, EngineError> {
        match distribution {
            DistributionType::Custom(curve) => Ok(curve),
            builtin => self
                .curves
                .get(builtin.slug())
                .ok_or_else(|| EngineError::UnknownDistribution(builtin.display_name().to_string())),
        }
    }

    /// Tabulated distributions in presentation order.
    pub fn entries(&self) -> Vec<(DistributionType, &CumulativeCurve)> {
        DistributionType::BUILT_IN
            .into_iter()
            .filter_map(|t| {
                let curve = self.curves.get(t.slug())?;
                Some((t, curve))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
