//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads depths (flags, NOAA Atlas 14, or a saved report)
//! - runs the generation pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cli::{
    AtlasArgs, AtlasSourceArgs, BatchArgs, ClassifyArgs, Command, CurvesArgs, GenerateArgs, OutputArgs, StormArgs,
};
use crate::data::{Atlas14Client, Atlas14Table};
use crate::distribution::{ReferenceCurveTable, classify, ratio};
use crate::domain::{
    DepthObservation, DepthUnits, DistributionChoice, DistributionType, GenerateConfig, RainfallDuration, StormShape,
};
use crate::error::AppError;

use self::pipeline::{GenerationOutput, GenerationRequest, Selection};

pub mod pipeline;

/// Entry point for the `hyeto` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Atlas(args) => handle_atlas(args),
        Command::Batch(args) => handle_batch(args),
        Command::Classify(args) => handle_classify(args),
        Command::Curves(args) => handle_curves(args),
    }
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.storm, Some(&args.output), args.units);
    let selection = selection_from_config(&config)?;

    let observations = match (args.short_depth, args.long_depth) {
        (Some(short), Some(long)) => Some((
            DepthObservation::new(RainfallDuration::MIN_60, short, args.return_period)?,
            DepthObservation::new(RainfallDuration::HR_24, long, args.return_period)?,
        )),
        (None, None) => None,
        _ => {
            return Err(AppError::new(
                2,
                "--short-depth and --long-depth must be given together.",
            ));
        }
    };

    let request = GenerationRequest {
        total_depth: args.depth,
        shape: config.shape,
        selection,
        observations,
    };
    let output = pipeline::generate(&request)?;
    present(&output, &config)
}

fn handle_atlas(args: AtlasArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.storm, Some(&args.output), args.source.units);
    let selection = selection_from_config(&config)?;
    let table = load_atlas_table(&args.source)?;

    if args.show_table {
        println!("{}", crate::report::format_atlas_table(&table));
    }

    let request = pipeline::request_from_atlas(
        &table,
        args.return_period,
        args.classify_return_period,
        selection,
        config.shape,
    )?;
    println!(
        "Design depth: {:.3} {} (24-hr, {}-yr)",
        request.total_depth,
        config.units.label(),
        args.return_period
    );
    let output = pipeline::generate(&request)?;
    present(&output, &config)
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.storm, None, args.source.units);
    let selection = selection_from_config(&config)?;
    let table = load_atlas_table(&args.source)?;

    let items = pipeline::generate_batch(&table, args.classify_return_period, &selection, config.shape)?;

    std::fs::create_dir_all(&args.out_dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create output directory '{}': {e}", args.out_dir.display()),
        )
    })?;
    items.par_iter().try_for_each(|item| {
        let path = batch_csv_path(&args.out_dir, item.return_period_years);
        crate::io::write_hyetograph_csv(&path, &item.output.hyetograph, config.start, config.units)
    })?;
    info!(count = items.len(), dir = %args.out_dir.display(), "batch written");

    let rows = crate::report::summarize_batch(&items);
    println!("{}", crate::report::format_batch_summary(&rows, config.units));
    println!("Wrote {} CSV files to {}", items.len(), args.out_dir.display());
    Ok(())
}

fn handle_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let short = DepthObservation::new(RainfallDuration::MIN_60, args.short_depth, args.return_period)?;
    let long = DepthObservation::new(RainfallDuration::HR_24, args.long_depth, args.return_period)?;
    let r = ratio(&short, &long)?;
    let suggested = classify(r);
    print!("{}", crate::report::format_classification(r, &suggested));
    Ok(())
}

fn handle_curves(args: CurvesArgs) -> Result<(), AppError> {
    let table = ReferenceCurveTable::global()?;

    let Some(choice) = args.distribution else {
        print!("{}", crate::report::format_curve_list(table, args.samples));
        return Ok(());
    };

    let distribution = match choice {
        DistributionChoice::Auto => {
            return Err(AppError::new(
                2,
                "`auto` needs depths to classify; pick a distribution or use `hyeto classify`.",
            ));
        }
        DistributionChoice::Custom => {
            let path = args
                .custom_curve
                .as_deref()
                .ok_or_else(|| AppError::new(2, "--distribution custom requires --custom-curve FILE."))?;
            DistributionType::Custom(crate::io::read_custom_curve(path)?)
        }
        builtin => builtin
            .to_builtin()
            .ok_or_else(|| AppError::new(4, "Distribution choice has no reference curve."))?,
    };
    let curve = table.lookup(&distribution)?;

    println!("{} ({} points)", distribution.display_name(), curve.len());
    for p in curve.points() {
        println!("{:>8.4} {:>8.4}", p.time, p.fraction);
    }

    if let Some(path) = &args.export_curve {
        crate::io::write_curve_json(path, curve, args.steps)?;
        println!("Wrote curve JSON to {}", path.display());
    }
    Ok(())
}

/// Print the report, table, and plot, then write the optional export.
fn present(output: &GenerationOutput, config: &GenerateConfig) -> Result<(), AppError> {
    let summary = crate::report::summarize(output);
    println!(
        "{}",
        crate::report::format_generation_summary(&summary, &config.shape, config.units)
    );
    println!(
        "{}",
        crate::report::format_hyetograph_table(&output.hyetograph, config.start, config.units, config.table_rows)
    );

    if config.plot {
        let plot = crate::plot::render_hyetograph_plot(&output.hyetograph, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export {
        crate::io::write_hyetograph_csv(path, &output.hyetograph, config.start, config.units)?;
        println!("Wrote {} rows to {}", output.hyetograph.len(), path.display());
    }

    Ok(())
}

fn load_atlas_table(source: &AtlasSourceArgs) -> Result<Atlas14Table, AppError> {
    match (&source.atlas_csv, source.lat, source.lon) {
        (Some(path), _, _) => crate::data::read_atlas14_file(path, source.units),
        (None, Some(lat), Some(lon)) => Atlas14Client::from_env()?.fetch(lat, lon, source.units),
        _ => Err(AppError::new(2, "Give either --lat and --lon, or --atlas-csv FILE.")),
    }
}

fn batch_csv_path(dir: &Path, return_period_years: u32) -> PathBuf {
    dir.join(format!("hyetograph_{return_period_years}yr.csv"))
}

pub fn config_from_args(storm: &StormArgs, output: Option<&OutputArgs>, units: DepthUnits) -> GenerateConfig {
    GenerateConfig {
        choice: storm.distribution,
        custom_curve: storm.custom_curve.clone(),
        shape: StormShape {
            storm_hours: storm.storm_hours,
            step_minutes: storm.step_minutes,
            tail_hours: storm.tail_hours,
        },
        start: storm.start,
        units,
        plot: output.is_some_and(|o| !o.no_plot),
        plot_width: output.map_or(96, |o| o.width),
        plot_height: output.map_or(16, |o| o.height),
        table_rows: output.map_or(6, |o| o.rows),
        export: output.and_then(|o| o.export.clone()),
    }
}

/// Resolve the distribution flags into a pipeline selection.
///
/// A custom curve file with `--distribution auto` selects the custom curve.
pub fn selection_from_config(config: &GenerateConfig) -> Result<Selection, AppError> {
    let selection = match (config.choice, &config.custom_curve) {
        (DistributionChoice::Custom | DistributionChoice::Auto, Some(path)) => {
            Selection::Explicit(DistributionType::Custom(crate::io::read_custom_curve(path)?))
        }
        (DistributionChoice::Custom, None) => {
            return Err(AppError::new(2, "--distribution custom requires --custom-curve FILE."));
        }
        (DistributionChoice::Auto, None) => Selection::Auto,
        (builtin, Some(_)) => {
            return Err(AppError::new(
                2,
                format!("--custom-curve cannot be combined with --distribution {builtin:?}."),
            ));
        }
        (builtin, None) => Selection::Explicit(
            builtin
                .to_builtin()
                .ok_or_else(|| AppError::new(4, "Distribution choice has no reference curve."))?,
        ),
    };
    debug!(?selection, "distribution selection");
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::cli::{Cli, Command};

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["hyeto", "generate"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Generate(args) => args,
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn config_carries_shape_and_output_flags() {
        let args = generate_args(&["--depth", "4", "--step-minutes", "15", "--no-plot", "--rows", "0"]);
        let config = config_from_args(&args.storm, Some(&args.output), args.units);
        assert_eq!(config.shape.step_minutes, 15);
        assert_eq!(config.shape.storm_hours, 24.0);
        assert!(!config.plot);
        assert_eq!(config.table_rows, 0);
        assert_eq!(config.units, DepthUnits::English);
    }

    #[test]
    fn builtin_and_auto_selections() {
        let args = generate_args(&["--depth", "4", "-d", "region-c"]);
        let config = config_from_args(&args.storm, None, args.units);
        assert_eq!(
            selection_from_config(&config).unwrap(),
            Selection::Explicit(DistributionType::RegionC)
        );

        let args = generate_args(&["--depth", "4"]);
        let config = config_from_args(&args.storm, None, args.units);
        assert_eq!(selection_from_config(&config).unwrap(), Selection::Auto);
    }

    #[test]
    fn custom_without_file_is_an_input_error() {
        let args = generate_args(&["--depth", "4", "-d", "custom"]);
        let config = config_from_args(&args.storm, None, args.units);
        assert_eq!(selection_from_config(&config).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn custom_curve_file_is_loaded() {
        let path = std::env::temp_dir().join(format!("hyeto_app_{}_front.csv", std::process::id()));
        fs::write(&path, "0,0\n0.25,0.75\n1,1\n").unwrap();
        let p = path.to_string_lossy().to_string();
        let args = generate_args(&["--depth", "4", "--custom-curve", &p]);
        let config = config_from_args(&args.storm, None, args.units);
        let selection = selection_from_config(&config).unwrap();
        fs::remove_file(&path).ok();

        let Selection::Explicit(DistributionType::Custom(curve)) = selection else {
            panic!("expected custom curve");
        };
        assert_eq!(curve.len(), 3);
        assert!(curve.name().ends_with("front"));
    }

    #[test]
    fn custom_curve_with_builtin_is_rejected() {
        let args = generate_args(&["--depth", "4", "-d", "scs-type-ii", "--custom-curve", "x.json"]);
        let config = config_from_args(&args.storm, None, args.units);
        assert_eq!(selection_from_config(&config).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn batch_file_names_carry_the_return_period() {
        let path = batch_csv_path(Path::new("out"), 100);
        assert_eq!(path, Path::new("out").join("hyetograph_100yr.csv"));
    }

    #[test]
    fn atlas_source_needs_coordinates_or_file() {
        let source = AtlasSourceArgs {
            lat: None,
            lon: None,
            atlas_csv: None,
            units: DepthUnits::English,
        };
        assert_eq!(load_atlas_table(&source).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn batch_writes_one_csv_per_return_period() {
        let dir = std::env::temp_dir().join(format!("hyeto_batch_{}", std::process::id()));
        let report = std::env::temp_dir().join(format!("hyeto_batch_{}.csv", std::process::id()));
        fs::write(&report, crate::data::atlas14::ATLAS14_SAMPLE).unwrap();

        let argv = [
            "hyeto",
            "batch",
            "--atlas-csv",
            report.to_str().unwrap(),
            "--out-dir",
            dir.to_str().unwrap(),
            "--step-minutes",
            "60",
        ];
        let Command::Batch(args) = Cli::try_parse_from(argv).unwrap().command else {
            panic!("expected batch");
        };
        handle_batch(args).unwrap();

        let mut names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        let body = fs::read_to_string(dir.join("hyetograph_100yr.csv")).unwrap();
        fs::remove_dir_all(&dir).ok();
        fs::remove_file(&report).ok();

        assert_eq!(names.len(), 10);
        assert!(names.contains(&"hyetograph_1000yr.csv".to_string()));
        // header + 25 storm rows + 24 tail rows
        assert_eq!(body.lines().count(), 1 + 25 + 24);
        assert!(body.lines().last().unwrap().ends_with(",13.100000"));
    }
}
