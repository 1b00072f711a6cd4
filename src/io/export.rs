//! Export hyetographs to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets and in
//! rainfall-runoff models that take a timestamped depth series.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::info;

use crate::domain::{DepthUnits, Hyetograph};
use crate::error::AppError;

/// Write a hyetograph as `date,time,hours,incremental_<unit>,cumulative_<unit>`.
pub fn write_hyetograph_csv(
    path: &Path,
    hyetograph: &Hyetograph,
    start: NaiveDateTime,
    units: DepthUnits,
) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_hyetograph(&mut file, hyetograph, start, units)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))?;
    info!(path = %path.display(), rows = hyetograph.len(), "wrote hyetograph CSV");
    Ok(())
}

/// Write the CSV body to any writer.
pub fn write_hyetograph<W: Write>(
    out: &mut W,
    hyetograph: &Hyetograph,
    start: NaiveDateTime,
    units: DepthUnits,
) -> std::io::Result<()> {
    let unit = units.label();
    writeln!(out, "date,time,hours,incremental_{unit},cumulative_{unit}")?;
    for step in hyetograph.steps() {
        let at = start + step.offset;
        writeln!(
            out,
            "{},{},{:.1},{:.6},{:.6}",
            at.format("%Y-%m-%d"),
            at.format("%H:%M"),
            step.hours(),
            step.incremental_depth,
            step.cumulative_depth,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::CumulativeCurve;
    use crate::hyetograph::build;

    #[test]
    fn rows_carry_timestamps_and_depths() {
        let curve = CumulativeCurve::new("lin", &[(0.0, 0.0), (1.0, 1.0)]).unwrap();
        let h = build(&curve, 2.4, 24.0, 60, 24.0).unwrap();
        let start = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let mut buf = Vec::new();
        write_hyetograph(&mut buf, &h, start, DepthUnits::English).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + 49);
        assert_eq!(lines[0], "date,time,hours,incremental_in,cumulative_in");
        assert_eq!(lines[1], "2026-01-01,00:00,0.0,0.000000,0.000000");
        assert_eq!(lines[2], "2026-01-01,01:00,1.0,0.100000,0.100000");
        assert_eq!(lines[25], "2026-01-02,00:00,24.0,0.100000,2.400000");
        assert_eq!(lines[49], "2026-01-03,00:00,48.0,0.000000,2.400000");
    }

    #[test]
    fn file_export_reports_bad_paths() {
        let curve = CumulativeCurve::new("lin", &[(0.0, 0.0), (1.0, 1.0)]).unwrap();
        let h = build(&curve, 1.0, 1.0, 30, 0.0).unwrap();
        let start = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let path = std::env::temp_dir().join("hyeto_no_such_dir").join("x").join("out.csv");
        let err = write_hyetograph_csv(&path, &h, start, DepthUnits::Metric).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
