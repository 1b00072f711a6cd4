//! Read/write curve files.
//!
//! Curve JSON is the portable representation of a cumulative distribution:
//! - a name (used as the custom distribution label)
//! - the time axis unit (`fraction` or `hours`)
//! - `[time, cumulative_fraction]` points
//!
//! The schema is defined by `domain::CurveFile`. Custom curves may also be given
//! as a two-column CSV (`time,fraction`, header optional, time in hours when the
//! last time is greater than 1).

use std::fs::File;
use std::path::Path;

use crate::domain::{CumulativeCurve, CurveFile, TimeUnit};
use crate::error::AppError;
use crate::math::{evaluate, linspace};

/// Write `curve` as JSON, optionally resampled onto `steps` evenly spaced points.
pub fn write_curve_json(path: &Path, curve: &CumulativeCurve, steps: Option<usize>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &to_curve_file(curve, steps)?)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

pub fn to_curve_file(curve: &CumulativeCurve, steps: Option<usize>) -> Result<CurveFile, AppError> {
    let points = match steps {
        Some(n) => linspace(0.0, 1.0, n)?
            .into_iter()
            .map(|t| [t, evaluate(curve, t)])
            .collect(),
        None => curve.points().iter().map(|p| [p.time, p.fraction]).collect(),
    };
    Ok(CurveFile {
        name: curve.name().to_string(),
        time_unit: TimeUnit::Fraction,
        points,
    })
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CumulativeCurve, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let raw: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    curve_from_file(&raw)
}

/// Validate a deserialized curve file.
pub fn curve_from_file(raw: &CurveFile) -> Result<CumulativeCurve, AppError> {
    let pairs: Vec<(f64, f64)> = raw.points.iter().map(|p| (p[0], p[1])).collect();
    let curve = match raw.time_unit {
        TimeUnit::Fraction => CumulativeCurve::new(raw.name.clone(), &pairs),
        TimeUnit::Hours => CumulativeCurve::from_hours(raw.name.clone(), &pairs),
    };
    Ok(curve?)
}

/// Read a two-column CSV curve.
pub fn read_curve_csv(path: &Path, name: &str) -> Result<CumulativeCurve, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut pairs = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        let record = result.map_err(|e| AppError::new(2, format!("Curve CSV line {line}: {e}")))?;
        let (Some(t), Some(f)) = (record.get(0), record.get(1)) else {
            return Err(AppError::new(2, format!("Curve CSV line {line}: expected 2 columns.")));
        };
        match (t.parse::<f64>(), f.parse::<f64>()) {
            (Ok(t), Ok(f)) => pairs.push((t, f)),
            // A header row is allowed on the first line only.
            _ if line == 1 => continue,
            _ => {
                return Err(AppError::new(
                    2,
                    format!("Curve CSV line {line}: '{t}', '{f}' is not a pair of numbers."),
                ));
            }
        }
    }

    let in_hours = pairs.last().is_some_and(|&(t, _)| t > 1.0);
    let curve = if in_hours {
        CumulativeCurve::from_hours(name, &pairs)
    } else {
        CumulativeCurve::new(name, &pairs)
    };
    Ok(curve?)
}

/// Read a custom curve, choosing the format from the file extension.
pub fn read_custom_curve(path: &Path) -> Result<CumulativeCurve, AppError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Custom");
        read_curve_csv(path, name)
    } else {
        read_curve_json(path)
    }
}
