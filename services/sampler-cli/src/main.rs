//! Climate raster sampler CLI
//!
//! Samples a named layer at a list of points and prints JSON to stdout.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use climate_common::GeoPoint;
use climate_sampler::{SamplerConfig, SamplingEngine};
use sampler_cli::{pair_results, parse_point, read_points, to_json, LayerInfo};

/// Climate raster sampler
#[derive(Parser, Debug)]
#[command(name = "climate-sample")]
#[command(about = "Sample gridded climate layers at geographic points")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory searched for layer files (repeatable, searched in order)
    #[arg(long = "data-dir", global = true)]
    data_dirs: Vec<PathBuf>,

    /// YAML configuration file
    #[arg(long, global = true, env = "CLIMATE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Raw value of the cell under each point
    Value(PointArgs),

    /// Mean of valid cells within a radius of each point
    Average {
        #[command(flatten)]
        points: PointArgs,

        /// Neighborhood radius in km (defaults to the configured radius)
        #[arg(short, long)]
        radius: Option<f64>,
    },

    /// Population variance of valid cells within a radius of each point
    Variance {
        #[command(flatten)]
        points: PointArgs,

        /// Neighborhood radius in km (defaults to the configured radius)
        #[arg(short, long)]
        radius: Option<f64>,
    },

    /// Load a layer and print its georeferencing
    Info {
        /// Layer name (e.g. bio1 or bio1.bil)
        #[arg(short, long)]
        layer: String,
    },
}

#[derive(Args, Debug)]
struct PointArgs {
    /// Layer name (e.g. bio1 or bio1.bil)
    #[arg(short, long)]
    layer: String,

    /// Query point as LAT,LON (repeatable). Read from stdin when absent.
    #[arg(short, long = "point", value_parser = parse_point_arg, allow_hyphen_values = true)]
    points: Vec<GeoPoint>,
}

fn parse_point_arg(s: &str) -> Result<GeoPoint, String> {
    parse_point(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let config = load_config(&cli)?;
    debug!(?config, "Resolved configuration");
    let engine = SamplingEngine::from_config(config)?;

    let json = match &cli.command {
        Commands::Value(args) => {
            let points = collect_points(args)?;
            let results = engine.sample_value(&args.layer, &points)?;
            to_json(&pair_results(&points, &results), cli.pretty)?
        }
        Commands::Average { points: args, radius } => {
            let points = collect_points(args)?;
            let radius = radius.unwrap_or(engine.config().default_radius_km);
            let results = engine.sample_average(&args.layer, &points, radius)?;
            to_json(&pair_results(&points, &results), cli.pretty)?
        }
        Commands::Variance { points: args, radius } => {
            let points = collect_points(args)?;
            let radius = radius.unwrap_or(engine.config().default_radius_km);
            let results = engine.sample_variance(&args.layer, &points, radius)?;
            to_json(&pair_results(&points, &results), cli.pretty)?
        }
        Commands::Info { layer } => {
            let layer = engine.layer(layer)?;
            to_json(&LayerInfo::from(layer.as_ref()), cli.pretty)?
        }
    };

    println!("{}", json);
    info!(stats = ?engine.cache_stats(), "Done");
    Ok(())
}

/// Logs go to stderr; stdout carries the JSON result.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Defaults, then the YAML file, then `CLIMATE_*` variables, then `--data-dir`.
fn load_config(cli: &Cli) -> Result<SamplerConfig> {
    let mut config = match &cli.config {
        Some(path) => SamplerConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SamplerConfig::default(),
    };
    config.apply_env();
    config.data_dirs.extend(cli.data_dirs.iter().cloned());
    Ok(config)
}

fn collect_points(args: &PointArgs) -> Result<Vec<GeoPoint>> {
    if !args.points.is_empty() {
        return Ok(args.points.clone());
    }
    let stdin = io::stdin();
    let points = read_points(stdin.lock()).context("Failed to read points from stdin")?;
    debug!(count = points.len(), "Read points from stdin");
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_average_with_points() {
        let cli = Cli::try_parse_from([
            "climate-sample",
            "average",
            "--layer",
            "bio1",
            "--point",
            "10,10",
            "--point",
            "-33.9,18.4",
            "--radius",
            "100",
        ])
        .unwrap();
        match cli.command {
            Commands::Average { points, radius } => {
                assert_eq!(points.layer, "bio1");
                assert_eq!(points.points.len(), 2);
                assert_eq!(points.points[1], GeoPoint::new(-33.9, 18.4));
                assert_eq!(radius, Some(100.0));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_point_rejected() {
        assert!(Cli::try_parse_from([
            "climate-sample",
            "value",
            "--layer",
            "bio1",
            "--point",
            "100,0"
        ])
        .is_err());
    }

    #[test]
    fn test_data_dirs_appended() {
        let cli = Cli::try_parse_from([
            "climate-sample",
            "info",
            "--layer",
            "bio1",
            "--data-dir",
            "/data/a",
            "--data-dir",
            "/data/b",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert!(config.data_dirs.ends_with(&[PathBuf::from("/data/a"), PathBuf::from("/data/b")]));
    }
}
