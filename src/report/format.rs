//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine code stays clean and testable
//! - output changes are localized

use chrono::NaiveDateTime;

use crate::data::Atlas14Table;
use crate::distribution::ReferenceCurveTable;
use crate::domain::{DepthUnits, DistributionType, Hyetograph, HyetographStep, IntensityRatio, StormShape};
use crate::math::evaluate;

use super::GenerationSummary;

/// Format the summary block printed by `hyeto generate` and `hyeto atlas`.
pub fn format_generation_summary(summary: &GenerationSummary, shape: &StormShape, units: DepthUnits) -> String {
    let unit = units.label();
    let mut out = String::new();

    out.push_str("=== hyeto - Design Storm Hyetograph ===\n");
    match summary.ratio {
        Some(r) => out.push_str(&format!("Intensity ratio (60-min / 24-hr): {r:.4}\n")),
        None => out.push_str("Intensity ratio (60-min / 24-hr): n/a\n"),
    }
    if let Some(suggested) = &summary.suggested {
        out.push_str(&format!("Suggested distribution: {suggested}\n"));
    }
    out.push_str(&format!("Distribution used: {}\n", summary.distribution));
    out.push_str(&format!("Total depth: {:.3} {unit}\n", summary.total_depth));
    out.push_str(&format!(
        "Storm: {:.1} h | step={} min | tail={:.1} h\n",
        shape.storm_hours, shape.step_minutes, shape.tail_hours
    ));
    out.push_str(&format!(
        "Rows: storm={} (incl. origin) | tail={} | storm sum={:.6} {unit}\n",
        summary.storm_rows, summary.tail_rows, summary.storm_sum
    ));
    match summary.peak_hours {
        Some(t) => out.push_str(&format!(
            "Peak: {:.6} {unit} in the step ending at {t:.1} h ({:.3} {unit}/h)\n",
            summary.peak_depth, summary.peak_intensity
        )),
        None => out.push_str("Peak: none\n"),
    }

    out
}

/// Format the first and last `rows` steps of a hyetograph.
///
/// `rows == 0` prints every step.
pub fn format_hyetograph_table(hyetograph: &Hyetograph, start: NaiveDateTime, units: DepthUnits, rows: usize) -> String {
    let unit = units.label();
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<16} {:>7} {:>14} {:>14}\n",
            "time",
            "hours",
            format!("incr ({unit})"),
            format!("cum ({unit})")
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<16} {:-<7} {:-<14} {:-<14}", "", "", "", "").trim_end());
    out.push('\n');

    let steps = hyetograph.steps();
    let push = |out: &mut String, s: &HyetographStep| {
        let at = start + s.offset;
        out.push_str(&format!(
            "{:<16} {:>7.1} {:>14.6} {:>14.6}\n",
            at.format("%Y-%m-%d %H:%M"),
            s.hours(),
            s.incremental_depth,
            s.cumulative_depth
        ));
    };

    if rows == 0 || steps.len() <= 2 * rows {
        for s in steps {
            push(&mut out, s);
        }
    } else {
        for s in &steps[..rows] {
            push(&mut out, s);
        }
        out.push_str(&format!("... ({} rows omitted)\n", steps.len() - 2 * rows));
        for s in &steps[steps.len() - rows..] {
            push(&mut out, s);
        }
    }

    out
}

/// Format the classification result printed by `hyeto classify`.
pub fn format_classification(ratio: IntensityRatio, suggested: &DistributionType) -> String {
    let mut out = format!("Intensity ratio (60-min / 24-hr): {:.4}\n", ratio.value());
    if !ratio.is_nominal() {
        out.push_str("Warning: ratio is outside [0, 1]; check the input depths.\n");
    }
    out.push_str(&format!("Suggested distribution: {suggested} ({})\n", suggested.slug()));
    out
}

/// Format a depth-duration-frequency table.
pub fn format_atlas_table(table: &Atlas14Table) -> String {
    let periods = table.return_periods();
    let mut out = String::new();
    out.push_str(&format!("Precipitation depths ({}) by ARI (years):\n", table.units.label()));

    let mut header = format!("{:<8}", "");
    for rp in &periods {
        header.push_str(&format!(" {rp:>7}"));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for duration in table.durations() {
        let mut line = format!("{:<8}", duration.label());
        for rp in &periods {
            match table.depth(duration, *rp) {
                Some(d) => line.push_str(&format!(" {d:>7.3}")),
                None => line.push_str(&format!(" {:>7}", "-")),
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Format the reference curves, sampled at `samples` evenly spaced times.
pub fn format_curve_list(table: &ReferenceCurveTable, samples: usize) -> String {
    let samples = samples.max(2);
    let times: Vec<f64> = (0..samples).map(|i| i as f64 / (samples - 1) as f64).collect();

    let mut out = String::new();
    let mut header = format!("{:<16} {:<12} {:>6}", "distribution", "slug", "points");
    for t in &times {
        header.push_str(&format!(" {:>6}", format!("{:.0}%", t * 100.0)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (kind, curve) in table.entries() {
        let mut line = format!("{:<16} {:<12} {:>6}", kind.display_name(), kind.slug(), curve.len());
        for t in &times {
            line.push_str(&format!(" {:>6.3}", evaluate(curve, *t)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Format one line per return period of a batch run.
pub fn format_batch_summary(rows: &[(u32, GenerationSummary)], units: DepthUnits) -> String {
    let unit = units.label();
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>6} {:<16} {:>12} {:>14}",
            "ARI",
            "distribution",
            format!("total ({unit})"),
            format!("peak ({unit}/h)")
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<16} {:-<12} {:-<14}", "", "", "", "").trim_end());
    out.push('\n');

    for (rp, s) in rows {
        out.push_str(
            format!(
                "{rp:>6} {:<16} {:>12.3} {:>14.3}",
                s.distribution, s.total_depth, s.peak_intensity
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}
