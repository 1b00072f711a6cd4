//! Reporting utilities: generation summaries and formatted terminal output.

use crate::app::pipeline::{BatchItem, GenerationOutput};

pub mod format;

pub use format::*;

/// Headline numbers of one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub distribution: String,
    pub suggested: Option<String>,
    pub ratio: Option<f64>,
    pub total_depth: f64,
    pub storm_sum: f64,
    pub storm_rows: usize,
    pub tail_rows: usize,
    pub peak_hours: Option<f64>,
    pub peak_depth: f64,
    pub peak_intensity: f64,
}

/// Collect the headline numbers of `output`.
pub fn summarize(output: &GenerationOutput) -> GenerationSummary {
    let h = &output.hyetograph;
    let peak = h.peak().filter(|s| s.incremental_depth > 0.0);
    GenerationSummary {
        distribution: output.distribution.display_name().to_string(),
        suggested: output.suggested.as_ref().map(|t| t.display_name().to_string()),
        ratio: output.ratio.map(|r| r.value()),
        total_depth: h.total_depth(),
        storm_sum: h.storm_sum(),
        storm_rows: h.storm_window().len(),
        tail_rows: h.tail().len(),
        peak_hours: peak.map(|s| s.hours()),
        peak_depth: peak.map(|s| s.incremental_depth).unwrap_or(0.0),
        peak_intensity: h.peak_intensity(),
    }
}

/// Batch summaries, one per return period, in return-period order.
pub fn summarize_batch(items: &[BatchItem]) -> Vec<(u32, GenerationSummary)> {
    let mut rows: Vec<(u32, GenerationSummary)> = items
        .iter()
        .map(|item| (item.return_period_years, summarize(&item.output)))
        .collect();
    rows.sort_by_key(|(rp, _)| *rp);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{GenerationRequest, Selection, generate};
    use crate::domain::{DepthObservation, DistributionType, RainfallDuration, StormShape};

    #[test]
    fn summary_reports_peak_and_mass() {
        let request = GenerationRequest {
            total_depth: 10.0,
            shape: StormShape::default(),
            selection: Selection::Explicit(DistributionType::ScsTypeII),
            observations: Some((
                DepthObservation::new(RainfallDuration::MIN_60, 3.0, 25).unwrap(),
                DepthObservation::new(RainfallDuration::HR_24, 10.0, 25).unwrap(),
            )),
        };
        let out = generate(&request).unwrap();
        let s = summarize(&out);

        assert_eq!(s.distribution, "SCS Type II");
        assert_eq!(s.suggested.as_deref(), Some("NOAA Region B"));
        assert_eq!(s.storm_rows, 241);
        assert_eq!(s.tail_rows, 240);
        assert!((s.storm_sum - 10.0).abs() < 1e-9);
        let peak = s.peak_hours.unwrap();
        assert!((11.5..=12.5).contains(&peak), "peak at {peak} h");
        assert!((s.peak_intensity - s.peak_depth * 10.0).abs() < 1e-12);
    }

    #[test]
    fn batch_summaries_are_ordered_by_return_period() {
        use crate::app::pipeline::generate_batch;
        use crate::data::atlas14::ATLAS14_SAMPLE;
        use crate::data::parse_atlas14_csv;
        use crate::domain::DepthUnits;

        let table = parse_atlas14_csv(ATLAS14_SAMPLE, DepthUnits::English).unwrap();
        let items = generate_batch(&table, 25, &Selection::Auto, StormShape::default()).unwrap();
        let rows = summarize_batch(&items);
        let periods: Vec<u32> = rows.iter().map(|(rp, _)| *rp).collect();
        assert_eq!(periods, vec![1, 2, 5, 10, 25, 50, 100, 200, 500, 1000]);
        assert!(rows.windows(2).all(|w| w[0].1.total_depth < w[1].1.total_depth));
    }
}
