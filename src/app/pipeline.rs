//! Shared generation pipeline used by every command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! depths -> ratio -> suggested region -> curve lookup -> hyetograph
//!
//! The commands can then focus on where depths come from and how results are
//! presented.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::data::Atlas14Table;
use crate::distribution::{ReferenceCurveTable, classify, ratio};
use crate::domain::{
    DepthObservation, DistributionType, Hyetograph, IntensityRatio, RainfallDuration, StormShape,
};
use crate::error::{AppError, EngineError};
use crate::hyetograph::build_with_shape;

/// How the distribution is chosen for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Use the region suggested by the depth ratio.
    Auto,
    /// Use this distribution regardless of the suggestion.
    Explicit(DistributionType),
}

/// Everything needed for one hyetograph.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub total_depth: f64,
    pub shape: StormShape,
    pub selection: Selection,
    /// Short- and long-duration depths used for classification.
    pub observations: Option<(DepthObservation, DepthObservation)>,
}

/// All computed outputs of a single generation.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub hyetograph: Hyetograph,
    pub distribution: DistributionType,
    pub ratio: Option<IntensityRatio>,
    pub suggested: Option<DistributionType>,
    pub observations: Option<(DepthObservation, DepthObservation)>,
}

/// Run the pipeline against the process-wide reference table.
pub fn generate(request: &GenerationRequest) -> Result<GenerationOutput, EngineError> {
    generate_with_table(ReferenceCurveTable::global()?, request)
}

/// Run the pipeline against an explicit table.
///
/// With `Selection::Auto` a bad observation pair fails the request. With an
/// explicit distribution the ratio is informational only, so a bad pair is
/// logged and the ratio omitted.
pub fn generate_with_table(
    table: &ReferenceCurveTable,
    request: &GenerationRequest,
) -> Result<GenerationOutput, EngineError> {
    let ratio = match (&request.observations, &request.selection) {
        (None, _) => None,
        (Some((short, long)), Selection::Auto) => Some(ratio(short, long)?),
        (Some((short, long)), Selection::Explicit(_)) => match ratio(short, long) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!(error = %e, "ignoring unusable depth pair; distribution was chosen explicitly");
                None
            }
        },
    };
    let suggested = ratio.map(classify);

    let distribution = match &request.selection {
        Selection::Explicit(t) => t.clone(),
        Selection::Auto => suggested.clone().ok_or_else(|| {
            EngineError::InvalidParameter(
                "automatic distribution selection needs a short- and a long-duration depth".to_string(),
            )
        })?,
    };
    debug!(
        distribution = %distribution,
        ratio = ratio.map(|r| r.value()),
        "resolved distribution"
    );

    let curve = table.lookup(&distribution)?;
    let hyetograph = build_with_shape(curve, request.total_depth, &request.shape)?;

    Ok(GenerationOutput {
        hyetograph,
        distribution,
        ratio,
        suggested,
        observations: request.observations,
    })
}

/// Build a request from an Atlas 14 table.
///
/// The total depth is the 24-hr depth at `design_rp`; classification uses the
/// 60-min / 24-hr pair at `classify_rp`.
pub fn request_from_atlas(
    table: &Atlas14Table,
    design_rp: u32,
    classify_rp: u32,
    selection: Selection,
    shape: StormShape,
) -> Result<GenerationRequest, AppError> {
    let total = table.observation(RainfallDuration::HR_24, design_rp)?;
    let observations = match (&selection, table.intensity_pair(classify_rp)) {
        (_, Ok(pair)) => Some(pair),
        (Selection::Auto, Err(e)) => return Err(e),
        (Selection::Explicit(_), Err(e)) => {
            warn!(error = %e, "no classification depths; continuing with the explicit distribution");
            None
        }
    };

    Ok(GenerationRequest {
        total_depth: total.depth,
        shape,
        selection,
        observations,
    })
}

/// One hyetograph of a batch run.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub return_period_years: u32,
    pub output: GenerationOutput,
}

/// Generate one hyetograph per return period in the table, in parallel.
///
/// Return periods without a 24-hr depth are skipped. The batch fails as a whole
/// if any generation fails.
pub fn generate_batch(
    table: &Atlas14Table,
    classify_rp: u32,
    selection: &Selection,
    shape: StormShape,
) -> Result<Vec<BatchItem>, AppError> {
    let reference = ReferenceCurveTable::global()?;
    let periods: Vec<u32> = table
        .return_periods()
        .into_iter()
        .filter(|&rp| table.depth(RainfallDuration::HR_24, rp).is_some())
        .collect();
    if periods.is_empty() {
        return Err(AppError::new(3, "Atlas 14 table has no 24-hr depths."));
    }

    periods
        .par_iter()
        .map(|&rp| {
            let request = request_from_atlas(table, rp, classify_rp, selection.clone(), shape)?;
            let output = generate_with_table(reference, &request)?;
            Ok(BatchItem {
                return_period_years: rp,
                output,
            })
        })
        .collect()
}
