//! Command-line parsing for the design-storm hyetograph generator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the engine code.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};

use crate::domain::{DepthUnits, DistributionChoice};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hyeto", version, about = "Design-storm hyetograph generator (NOAA Atlas 14 / SCS)")]
pub struct Cli {
    /// Log pipeline steps to stderr (overridden by `HYETO_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Distribute a total depth along a reference or custom curve.
    Generate(GenerateArgs),
    /// Generate a hyetograph from NOAA Atlas 14 depths at a location.
    Atlas(AtlasArgs),
    /// Write one hyetograph CSV per Atlas 14 return period.
    Batch(BatchArgs),
    /// Print the intensity ratio and suggested distribution for two depths.
    Classify(ClassifyArgs),
    /// List the reference curves, or export one as curve JSON.
    Curves(CurvesArgs),
}

/// Curve choice and storm shape shared by the generating commands.
#[derive(Debug, Args, Clone)]
pub struct StormArgs {
    /// Distribution to use (`auto` picks the region suggested by the depth ratio).
    #[arg(short = 'd', long, value_enum, default_value_t = DistributionChoice::Auto)]
    pub distribution: DistributionChoice,

    /// Custom cumulative curve (curve JSON, or a two-column CSV).
    #[arg(long, value_name = "FILE")]
    pub custom_curve: Option<PathBuf>,

    /// Storm duration (hours).
    #[arg(long, default_value_t = 24.0)]
    pub storm_hours: f64,

    /// Time step (minutes).
    #[arg(long, default_value_t = 6)]
    pub step_minutes: u32,

    /// Zero-rainfall tail appended after the storm (hours).
    #[arg(long, default_value_t = 24.0)]
    pub tail_hours: f64,

    /// Timestamp of the first row (`YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]`).
    #[arg(long, value_parser = parse_start, default_value = "2026-01-01T00:00")]
    pub start: NaiveDateTime,
}

/// Terminal output and export options.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Export the hyetograph to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 96)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Rows shown at each end of the table (0 = all rows).
    #[arg(long, default_value_t = 6)]
    pub rows: usize,
}

/// Options for `hyeto generate`.
#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Total storm depth.
    #[arg(long)]
    pub depth: f64,

    /// Short-duration (60-min) depth used for classification.
    #[arg(long, requires = "long_depth")]
    pub short_depth: Option<f64>,

    /// Long-duration (24-hr) depth used for classification.
    #[arg(long, requires = "short_depth")]
    pub long_depth: Option<f64>,

    /// Return period (years) of the classification depths.
    #[arg(long, default_value_t = 25)]
    pub return_period: u32,

    /// Depth units (labels only; no conversion happens).
    #[arg(long, value_enum, default_value_t = DepthUnits::English)]
    pub units: DepthUnits,

    #[command(flatten)]
    pub storm: StormArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Where Atlas 14 depths come from.
#[derive(Debug, Args, Clone)]
pub struct AtlasSourceArgs {
    /// Latitude (decimal degrees).
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude (decimal degrees, negative west).
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Read a saved Atlas 14 CSV report instead of querying NOAA.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["lat", "lon"])]
    pub atlas_csv: Option<PathBuf>,

    /// Depth units requested from NOAA.
    #[arg(long, value_enum, default_value_t = DepthUnits::English)]
    pub units: DepthUnits,
}

/// Options for `hyeto atlas`.
#[derive(Debug, Args, Clone)]
pub struct AtlasArgs {
    #[command(flatten)]
    pub source: AtlasSourceArgs,

    /// Return period (years) of the design 24-hr depth.
    #[arg(long, default_value_t = 100)]
    pub return_period: u32,

    /// Return period (years) of the depths used for classification.
    #[arg(long, default_value_t = 25)]
    pub classify_return_period: u32,

    /// Print the full depth-duration-frequency table.
    #[arg(long)]
    pub show_table: bool,

    #[command(flatten)]
    pub storm: StormArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for `hyeto batch`.
#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub source: AtlasSourceArgs,

    /// Return period (years) of the depths used for classification.
    #[arg(long, default_value_t = 25)]
    pub classify_return_period: u32,

    #[command(flatten)]
    pub storm: StormArgs,

    /// Directory receiving one CSV per return period.
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,
}

/// Options for `hyeto classify`.
#[derive(Debug, Args, Clone)]
pub struct ClassifyArgs {
    /// Short-duration (60-min) depth.
    #[arg(long)]
    pub short_depth: f64,

    /// Long-duration (24-hr) depth.
    #[arg(long)]
    pub long_depth: f64,

    /// Return period (years) shared by both depths.
    #[arg(long, default_value_t = 25)]
    pub return_period: u32,
}

/// Options for `hyeto curves`.
#[derive(Debug, Args, Clone)]
pub struct CurvesArgs {
    /// Show (or export) a single distribution.
    #[arg(short = 'd', long, value_enum)]
    pub distribution: Option<DistributionChoice>,

    /// Custom curve to load when `--distribution custom` is given.
    #[arg(long, value_name = "FILE")]
    pub custom_curve: Option<PathBuf>,

    /// Write the selected curve to JSON.
    #[arg(long, value_name = "JSON", requires = "distribution")]
    pub export_curve: Option<PathBuf>,

    /// Resample the exported curve onto N evenly spaced points.
    #[arg(long, value_name = "N")]
    pub steps: Option<usize>,

    /// Sample times per curve in the listing.
    #[arg(long, default_value_t = 9)]
    pub samples: usize,
}

/// Parse `--start`.
fn parse_start(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid start '{raw}' (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM)"))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_defaults() {
        let cli = Cli::try_parse_from(["hyeto", "generate", "--depth", "4"]).unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.depth, 4.0);
        assert_eq!(args.storm.distribution, DistributionChoice::Auto);
        assert_eq!(args.storm.step_minutes, 6);
        assert_eq!(args.storm.start.to_string(), "2026-01-01 00:00:00");
        assert!(args.short_depth.is_none());
    }

    #[test]
    fn short_depth_requires_long_depth() {
        let err = Cli::try_parse_from(["hyeto", "generate", "--depth", "4", "--short-depth", "1.2"]);
        assert!(err.is_err());
    }

    #[test]
    fn atlas_accepts_negative_longitude() {
        let cli = Cli::try_parse_from(["hyeto", "-v", "atlas", "--lat", "29.76", "--lon", "-95.37"]).unwrap();
        assert!(cli.verbose);
        let Command::Atlas(args) = cli.command else {
            panic!("expected atlas");
        };
        assert_eq!(args.source.lon, Some(-95.37));
        assert_eq!(args.return_period, 100);
        assert_eq!(args.classify_return_period, 25);
    }

    #[test]
    fn distribution_names_parse() {
        let cli = Cli::try_parse_from(["hyeto", "curves", "-d", "scs-type-ia"]).unwrap();
        let Command::Curves(args) = cli.command else {
            panic!("expected curves");
        };
        assert_eq!(args.distribution, Some(DistributionChoice::ScsTypeIA));
    }

    #[test]
    fn start_accepts_date_only() {
        let dt = parse_start("2025-06-01").unwrap();
        assert_eq!(dt.to_string(), "2025-06-01 00:00:00");
        assert!(parse_start("June 1st").is_err());
    }
}
