//! Shared domain types.
//!
//! These types are kept small and mostly `Copy`/serializable so they can be:
//!
//! - passed between the engine stages without lifetimes
//! - exported to CSV/JSON
//! - echoed back in terminal reports

use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDateTime, TimeDelta};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::curve::CumulativeCurve;
use crate::error::EngineError;

/// A precipitation-frequency duration (`5-min`, `60-min`, `24-hr`, `2-day`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RainfallDuration {
    minutes: u32,
}

impl RainfallDuration {
    pub const MIN_60: RainfallDuration = RainfallDuration { minutes: 60 };
    pub const HR_24: RainfallDuration = RainfallDuration { minutes: 24 * 60 };

    pub fn from_minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    pub fn minutes(self) -> u32 {
        self.minutes
    }

    pub fn hours(self) -> f64 {
        self.minutes as f64 / 60.0
    }

    /// Parse an Atlas 14 row label such as `60-min`, `24-hr` or `10-day`.
    ///
    /// A trailing `:` is ignored.
    pub fn parse_label(label: &str) -> Option<Self> {
        let label = label.trim().trim_end_matches(':').trim().to_ascii_lowercase();
        let (value, unit) = label.split_once('-')?;
        let value: u32 = value.trim().parse().ok()?;
        let minutes = match unit.trim() {
            "min" => value,
            "hr" => value.checked_mul(60)?,
            "day" => value.checked_mul(24 * 60)?,
            _ => return None,
        };
        (minutes > 0).then_some(Self { minutes })
    }

    /// Label in Atlas 14 style.
    pub fn label(self) -> String {
        let m = self.minutes;
        if m <= 60 {
            format!("{m}-min")
        } else if m % (24 * 60) == 0 && m >= 48 * 60 {
            format!("{}-day", m / (24 * 60))
        } else if m % 60 == 0 {
            format!("{}-hr", m / 60)
        } else {
            format!("{m}-min")
        }
    }
}

impl fmt::Display for RainfallDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A point precipitation-frequency depth.
///
/// Depth units are whatever the fetch stage produced; the engine never converts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthObservation {
    pub duration: RainfallDuration,
    pub depth: f64,
    pub return_period_years: u32,
}

impl DepthObservation {
    /// Validate and build an observation.
    ///
    /// Zero depth is accepted: it is a degenerate but real data condition and is
    /// rejected later by the ratio calculator with a dedicated error.
    pub fn new(duration: RainfallDuration, depth: f64, return_period_years: u32) -> Result<Self, EngineError> {
        if !(depth.is_finite() && depth >= 0.0) {
            return Err(EngineError::InvalidParameter(format!(
                "{duration} depth must be finite and non-negative, got {depth}"
            )));
        }
        if return_period_years == 0 {
            return Err(EngineError::InvalidParameter("return period must be at least 1 year".to_string()));
        }
        Ok(Self {
            duration,
            depth,
            return_period_years,
        })
    }
}

/// Ratio of a short-duration depth to a long-duration depth.
///
/// Nominally in `[0, 1]` but never clamped: extrapolated inputs pass through.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct IntensityRatio {
    value: f64,
}

impl IntensityRatio {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(self) -> f64 {
        self.value
    }

    pub fn is_nominal(self) -> bool {
        (0.0..=1.0).contains(&self.value)
    }
}

impl fmt::Display for IntensityRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.value)
    }
}

/// Temporal distribution used to shape a design storm.
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionType {
    RegionA,
    RegionB,
    RegionC,
    RegionD,
    ScsTypeI,
    ScsTypeIA,
    ScsTypeII,
    ScsTypeIII,
    /// Caller-supplied curve, validated on construction.
    Custom(CumulativeCurve),
}

impl DistributionType {
    /// Every distribution backed by the reference table, in presentation order.
    pub const BUILT_IN: [DistributionType; 8] = [
        DistributionType::RegionA,
        DistributionType::RegionB,
        DistributionType::RegionC,
        DistributionType::RegionD,
        DistributionType::ScsTypeI,
        DistributionType::ScsTypeIA,
        DistributionType::ScsTypeII,
        DistributionType::ScsTypeIII,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(&self) -> &str {
        match self {
            DistributionType::RegionA => "NOAA Region A",
            DistributionType::RegionB => "NOAA Region B",
            DistributionType::RegionC => "NOAA Region C",
            DistributionType::RegionD => "NOAA Region D",
            DistributionType::ScsTypeI => "SCS Type I",
            DistributionType::ScsTypeIA => "SCS Type IA",
            DistributionType::ScsTypeII => "SCS Type II",
            DistributionType::ScsTypeIII => "SCS Type III",
            DistributionType::Custom(curve) => curve.name(),
        }
    }

    /// Stable key used by the reference table and file names.
    pub fn slug(&self) -> &'static str {
        match self {
            DistributionType::RegionA => "region-a",
            DistributionType::RegionB => "region-b",
            DistributionType::RegionC => "region-c",
            DistributionType::RegionD => "region-d",
            DistributionType::ScsTypeI => "scs-type-i",
            DistributionType::ScsTypeIA => "scs-type-ia",
            DistributionType::ScsTypeII => "scs-type-ii",
            DistributionType::ScsTypeIII => "scs-type-iii",
            DistributionType::Custom(_) => "custom",
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, DistributionType::Custom(_))
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Distribution requested on the command line.
///
/// `Auto` means: classify from the depth ratio. `Custom` requires a curve file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionChoice {
    Auto,
    RegionA,
    RegionB,
    RegionC,
    RegionD,
    ScsTypeI,
    #[value(name = "scs-type-ia")]
    #[serde(rename = "scs-type-ia")]
    ScsTypeIA,
    #[value(name = "scs-type-ii")]
    #[serde(rename = "scs-type-ii")]
    ScsTypeII,
    #[value(name = "scs-type-iii")]
    #[serde(rename = "scs-type-iii")]
    ScsTypeIII,
    Custom,
}

impl DistributionChoice {
    /// Resolve to a built-in type. `Auto` and `Custom` need more context.
    pub fn to_builtin(self) -> Option<DistributionType> {
        match self {
            DistributionChoice::Auto | DistributionChoice::Custom => None,
            DistributionChoice::RegionA => Some(DistributionType::RegionA),
            DistributionChoice::RegionB => Some(DistributionType::RegionB),
            DistributionChoice::RegionC => Some(DistributionType::RegionC),
            DistributionChoice::RegionD => Some(DistributionType::RegionD),
            DistributionChoice::ScsTypeI => Some(DistributionType::ScsTypeI),
            DistributionChoice::ScsTypeIA => Some(DistributionType::ScsTypeIA),
            DistributionChoice::ScsTypeII => Some(DistributionType::ScsTypeII),
            DistributionChoice::ScsTypeIII => Some(DistributionType::ScsTypeIII),
        }
    }
}

/// Unit system requested from Atlas 14.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DepthUnits {
    English,
    Metric,
}

impl DepthUnits {
    pub fn label(self) -> &'static str {
        match self {
            DepthUnits::English => "in",
            DepthUnits::Metric => "mm",
        }
    }

    /// Value of the `units` query parameter.
    pub fn query_value(self) -> &'static str {
        match self {
            DepthUnits::English => "english",
            DepthUnits::Metric => "metric",
        }
    }
}

/// One row of a hyetograph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyetographStep {
    /// Offset from the start of the storm.
    pub offset: TimeDelta,
    /// Depth fallen during the step ending at `offset`.
    pub incremental_depth: f64,
    /// Depth fallen from the start of the storm through `offset`.
    pub cumulative_depth: f64,
}

impl HyetographStep {
    pub fn hours(&self) -> f64 {
        self.offset.num_seconds() as f64 / 3600.0
    }
}

/// A generated rainfall series: storm window followed by a dry tail.
///
/// The storm window starts with the zero-depth origin row at offset 0 and ends at
/// the storm duration; every tail row has an incremental depth of exactly 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyetograph {
    pub(crate) steps: Vec<HyetographStep>,
    pub(crate) storm_rows: usize,
    pub(crate) step_minutes: u32,
    pub(crate) total_depth: f64,
}

impl Hyetograph {
    pub fn steps(&self) -> &[HyetographStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Rows covering the storm (origin row included).
    pub fn storm_window(&self) -> &[HyetographStep] {
        &self.steps[..self.storm_rows]
    }

    /// Zero-rainfall rows appended after the storm.
    pub fn tail(&self) -> &[HyetographStep] {
        &self.steps[self.storm_rows..]
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    pub fn total_depth(&self) -> f64 {
        self.total_depth
    }

    pub fn storm_sum(&self) -> f64 {
        self.storm_window().iter().map(|s| s.incremental_depth).sum()
    }

    /// Step with the largest incremental depth (first one on ties).
    pub fn peak(&self) -> Option<&HyetographStep> {
        self.steps.iter().fold(None, |best: Option<&HyetographStep>, s| match best {
            Some(b) if b.incremental_depth >= s.incremental_depth => Some(b),
            _ => Some(s),
        })
    }

    /// Peak intensity in depth units per hour.
    pub fn peak_intensity(&self) -> f64 {
        self.peak()
            .map(|s| s.incremental_depth * 60.0 / self.step_minutes as f64)
            .unwrap_or(0.0)
    }
}

/// Storm-shape parameters shared by every generation command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StormShape {
    pub storm_hours: f64,
    pub step_minutes: u32,
    pub tail_hours: f64,
}

impl Default for StormShape {
    fn default() -> Self {
        Self {
            storm_hours: 24.0,
            step_minutes: 6,
            tail_hours: 24.0,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub choice: DistributionChoice,
    pub custom_curve: Option<PathBuf>,
    pub shape: StormShape,
    pub start: NaiveDateTime,
    pub units: DepthUnits,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub table_rows: usize,

    pub export: Option<PathBuf>,
}

/// Time axis of a curve file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Elapsed fraction of the storm, `0..=1`.
    Fraction,
    /// Hours from the start; the last point is the storm duration.
    Hours,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub name: String,
    pub time_unit: TimeUnit,
    pub points: Vec<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_atlas_duration_labels() {
        assert_eq!(RainfallDuration::parse_label("60-min:"), Some(RainfallDuration::MIN_60));
        assert_eq!(RainfallDuration::parse_label(" 24-hr: "), Some(RainfallDuration::HR_24));
        assert_eq!(RainfallDuration::parse_label("2-day").map(|d| d.minutes()), Some(2880));
        assert_eq!(RainfallDuration::parse_label("by duration"), None);
        assert_eq!(RainfallDuration::parse_label("0-min"), None);
    }

    #[test]
    fn duration_labels_round_trip_through_display() {
        for label in ["5-min", "60-min", "2-hr", "24-hr", "2-day", "60-day"] {
            let d = RainfallDuration::parse_label(label).unwrap();
            assert_eq!(d.label(), label);
        }
    }

    #[test]
    fn observation_rejects_negative_depth_but_keeps_zero() {
        assert!(DepthObservation::new(RainfallDuration::HR_24, -1.0, 25).is_err());
        assert!(DepthObservation::new(RainfallDuration::HR_24, f64::NAN, 25).is_err());
        assert!(DepthObservation::new(RainfallDuration::HR_24, 1.0, 0).is_err());
        assert!(DepthObservation::new(RainfallDuration::HR_24, 0.0, 25).is_ok());
    }

    #[test]
    fn choice_resolves_builtins_only() {
        assert_eq!(DistributionChoice::RegionC.to_builtin(), Some(DistributionType::RegionC));
        assert_eq!(DistributionChoice::Auto.to_builtin(), None);
        assert_eq!(DistributionChoice::Custom.to_builtin(), None);
    }

    #[test]
    fn builtin_slugs_are_unique() {
        let mut slugs: Vec<&str> = DistributionType::BUILT_IN.iter().map(|t| t.slug()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), DistributionType::BUILT_IN.len());
    }
}
