//! NOAA Atlas 14 precipitation-frequency depths.
//!
//! The HDSC server exposes point estimates as a CSV text report. We only read the
//! depth table that follows the `by duration for ARI (years):` header row:
//!
//! ```text
//! by duration for ARI (years):, 1,2,5,10,25,50,100,200,500,1000
//! 5-min:, 0.494,0.581,0.725,0.846,1.01,1.14,1.27,1.40,1.57,1.70
//! ...
//! 24-hr:, 4.17,4.97,6.41,7.71,9.68,11.3,13.1,15.0,17.8,20.0
//! ```
//!
//! Everything else in the report (location preamble, footnotes) is ignored.

use std::collections::{BTreeMap, BTreeSet};

use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::domain::{DepthObservation, DepthUnits, RainfallDuration};
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://hdsc.nws.noaa.gov/cgi-bin/hdsc/new/fe_text_mean.csv";
const HEADER_MARKER: &str = "by duration for ARI (years):";

/// Depth table: duration → return period (years) → depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Atlas14Table {
    pub units: DepthUnits,
    depths: BTreeMap<RainfallDuration, BTreeMap<u32, f64>>,
}

impl Atlas14Table {
    pub fn depth(&self, duration: RainfallDuration, return_period_years: u32) -> Option<f64> {
        self.depths.get(&duration)?.get(&return_period_years).copied()
    }

    /// Observation for one table cell; a missing cell is a data error.
    pub fn observation(
        &self,
        duration: RainfallDuration,
        return_period_years: u32,
    ) -> Result<DepthObservation, AppError> {
        let depth = self.depth(duration, return_period_years).ok_or_else(|| {
            AppError::new(
                3,
                format!("Atlas 14 table has no {duration} depth for the {return_period_years}-yr return period."),
            )
        })?;
        DepthObservation::new(duration, depth, return_period_years).map_err(|e| AppError::new(3, e.to_string()))
    }

    /// 60-min and 24-hr observations used for region classification.
    pub fn intensity_pair(&self, return_period_years: u32) -> Result<(DepthObservation, DepthObservation), AppError> {
        Ok((
            self.observation(RainfallDuration::MIN_60, return_period_years)?,
            self.observation(RainfallDuration::HR_24, return_period_years)?,
        ))
    }

    pub fn durations(&self) -> Vec<RainfallDuration> {
        self.depths.keys().copied().collect()
    }

    /// Every return period present in at least one row, ascending.
    pub fn return_periods(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self.depths.values().flat_map(|row| row.keys().copied()).collect();
        set.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

/// Parse an Atlas 14 CSV report into a depth table.
pub fn parse_atlas14_csv(content: &str, units: DepthUnits) -> Result<Atlas14Table, AppError> {
    if content.contains("File not found") || (content.contains("Error") && content.len() < 200) {
        return Err(AppError::new(
            3,
            "NOAA Atlas 14 returned an error or no data for this location.",
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    // return period -> column index
    let mut columns: Vec<(u32, usize)> = Vec::new();
    let mut depths: BTreeMap<RainfallDuration, BTreeMap<u32, f64>> = BTreeMap::new();

    for (idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line = idx + 1, error = %e, "skipping unreadable Atlas 14 line");
                continue;
            }
        };
        let Some(first) = record.get(0) else { continue };

        if first.contains(HEADER_MARKER) {
            if !columns.is_empty() {
                // Only the first table (depth estimates) is of interest.
                break;
            }
            columns = record
                .iter()
                .enumerate()
                .skip(1)
                .filter_map(|(col, cell)| cell.trim().parse::<u32>().ok().map(|rp| (rp, col)))
                .collect();
            continue;
        }
        if columns.is_empty() {
            continue;
        }

        let Some(duration) = RainfallDuration::parse_label(first) else {
            continue;
        };
        let row = depths.entry(duration).or_default();
        for &(rp, col) in &columns {
            match record.get(col).map(str::trim).map(str::parse::<f64>) {
                Some(Ok(v)) if v.is_finite() && v >= 0.0 => {
                    row.insert(rp, v);
                }
                Some(_) => debug!(duration = %duration, rp, "non-numeric Atlas 14 cell"),
                None => {}
            }
        }
    }

    depths.retain(|_, row| !row.is_empty());
    if depths.is_empty() {
        return Err(AppError::new(
            3,
            "No precipitation frequency depths found in the Atlas 14 response.",
        ));
    }

    Ok(Atlas14Table { units, depths })
}

pub struct Atlas14Client {
    client: Client,
    base_url: String,
}

impl Atlas14Client {
    /// Client for the HDSC endpoint; `ATLAS14_BASE_URL` (env or `.env`) overrides it.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("ATLAS14_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let client = Client::builder()
            .user_agent(concat!("hyeto/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn fetch(&self, lat: f64, lon: f64, units: DepthUnits) -> Result<Atlas14Table, AppError> {
        if !(lat.is_finite() && (-90.0..=90.0).contains(&lat)) {
            return Err(AppError::new(2, format!("Latitude {lat} is outside [-90, 90].")));
        }
        if !(lon.is_finite() && (-180.0..=180.0).contains(&lon)) {
            return Err(AppError::new(2, format!("Longitude {lon} is outside [-180, 180].")));
        }

        info!(lat, lon, url = %self.base_url, "fetching Atlas 14 depths");
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", lat.to_string().as_str()),
                ("lon", lon.to_string().as_str()),
                ("data", "depth"),
                ("units", units.query_value()),
                ("series", "pds"),
            ])
            .send()
            .map_err(|e| AppError::new(3, format!("Atlas 14 request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                3,
                format!("Atlas 14 request failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::new(3, format!("Failed to read Atlas 14 response: {e}")))?;

        parse_atlas14_csv(&body, units)
    }
}

/// Read a previously saved Atlas 14 CSV report.
pub fn read_atlas14_file(path: &std::path::Path, units: DepthUnits) -> Result<Atlas14Table, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read Atlas 14 CSV '{}': {e}", path.display())))?;
    parse_atlas14_csv(&content, units)
}

/// Trimmed HDSC report used by tests across the crate.
#[cfg(test)]
pub(crate) const ATLAS14_SAMPLE: &str = "\
Point precipitation frequency estimates (inches)
NOAA Atlas 14 Volume 11 Version 2
Data type: Precipitation depth
Time series type: Partial duration
Project area: Texas
Location name (ESRI Maps): Houston, Texas, USA
Latitude: 29.7604 Degree
Longitude: -95.3698 Degree

PRECIPITATION FREQUENCY ESTIMATES
by duration for ARI (years):, 1,2,5,10,25,50,100,200,500,1000
5-min:, 0.494,0.581,0.725,0.846,1.01,1.14,1.27,1.40,1.57,1.70
60-min:, 1.74,2.07,2.62,3.10,3.80,4.37,4.97,5.60,6.46,7.16
2-hr:, 2.14,2.59,3.34,4.02,5.03,5.87,6.78,7.73,9.09,10.2
24-hr:, 4.17,4.97,6.41,7.71,9.68,11.3,13.1,15.0,17.8,20.0
2-day:, 4.80,5.76,7.44,8.93,11.1,12.9,14.8,16.8,19.7,22.0

Date/time (GMT):  Mon Jan  5 19:06:15 2026
pyRunTime:  0.012
";
