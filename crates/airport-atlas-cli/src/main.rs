// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use airport_atlas_builder::{BuildConfig, DatasetBuilder, MergePolicy};
use airport_atlas_core::{AirportLibrary, AirportRecord};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the dataset artifact
    #[arg(short, long, env = "AIRPORT_ATLAS_DATASET", global = true)]
    dataset: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the feeds and write a fresh dataset
    Build(BuildArgs),
    /// Look up an airport by IATA code
    Find { iata: String },
    /// Check whether an IATA code is in the dataset
    Exists { iata: String },
    /// List airports in a country (ISO 3166 alpha-2)
    Country { code: String },
    /// List airports of the given facility types
    Types {
        #[arg(required = true)]
        types: Vec<String>,
    },
    /// Find the airport closest to a point
    Nearest {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        /// Only consider these facility types (repeatable)
        #[arg(long = "type")]
        types: Vec<String>,
    },
    /// Print the whole dataset
    List,
}

#[derive(Args, Debug, Default)]
struct BuildArgs {
    /// JSON build config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// URL or path of the JSON airport database
    #[arg(long, env = "AIRPORT_ATLAS_PRIMARY")]
    primary: Option<String>,
    /// URL or path of the CSV facility type feed
    #[arg(long, env = "AIRPORT_ATLAS_SECONDARY", conflicts_with = "no_secondary")]
    secondary: Option<String>,
    /// Skip facility type enrichment
    #[arg(long)]
    no_secondary: bool,
    /// Let the type feed replace types already present in the primary feed
    #[arg(long)]
    overwrite_types: bool,
    /// Per-download timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Where to write the dataset (defaults to --dataset)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

/// Precedence: flags, then `--dataset`, then the config file, then defaults.
fn resolve_build_config(args: &BuildArgs, dataset: Option<&Path>) -> Result<BuildConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read build config {}", path.display()))?;
            BuildConfig::from_json_str(&content)
                .with_context(|| format!("Failed to parse build config {}", path.display()))?
        }
        None => BuildConfig::default(),
    };

    if let Some(primary) = &args.primary {
        cfg.primary_source = primary.clone();
    }
    if args.no_secondary {
        cfg.secondary_source = None;
    } else if let Some(secondary) = &args.secondary {
        cfg.secondary_source = Some(secondary.clone());
    }
    if args.overwrite_types {
        cfg.merge_policy = MergePolicy::Overwrite;
    }
    if let Some(timeout) = args.timeout {
        cfg.timeout_secs = timeout;
    }
    match (&args.output, dataset) {
        (Some(output), _) => cfg.output = output.clone(),
        (None, Some(dataset)) => cfg.output = dataset.to_path_buf(),
        (None, None) => {}
    }

    Ok(cfg)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_airports(airports: &[&AirportRecord]) -> Result<()> {
    print_json(airports)?;
    eprintln!("{} airport(s)", airports.len());
    Ok(())
}

fn load_library(dataset: Option<&Path>) -> Result<AirportLibrary> {
    let path = dataset
        .map(Path::to_path_buf)
        .unwrap_or_else(airport_atlas_core::default_dataset_path);
    AirportLibrary::load(&path).with_context(|| {
        format!(
            "Failed to load dataset from {}. Run `airport-atlas build` first.",
            path.display()
        )
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let dataset = cli.dataset.as_deref();

    match &cli.command {
        Commands::Build(args) => {
            let cfg = resolve_build_config(args, dataset)?;
            let report = DatasetBuilder::new(cfg)
                .build_and_save()
                .context("Dataset build failed")?;
            println!(
                "Built {} airports ({} feed entries, {} types merged) -> {}",
                report.airports,
                report.ingest.parsed,
                report.enrichment.updated,
                report
                    .output
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            );
        }
        Commands::Find { iata } => {
            let library = load_library(dataset)?;
            match library.find(iata)? {
                Some(airport) => print_json(airport)?,
                None => println!("No airport found for IATA code '{}'", iata.to_ascii_uppercase()),
            }
        }
        Commands::Exists { iata } => {
            let library = load_library(dataset)?;
            println!("{}", library.exists(iata));
        }
        Commands::Country { code } => {
            let library = load_library(dataset)?;
            print_airports(&library.find_by_country(code)?)?;
        }
        Commands::Types { types } => {
            let library = load_library(dataset)?;
            let types: Vec<&str> = types.iter().map(String::as_str).collect();
            print_airports(&library.find_by_types(&types)?)?;
        }
        Commands::Nearest { lat, lon, types } => {
            let library = load_library(dataset)?;
            let types: Vec<&str> = types.iter().map(String::as_str).collect();
            match library.find_nearest_with_distance(*lat, *lon, &types)? {
                Some(m) => print_json(&serde_json::json!({
                    "airport": m.airport,
                    "distance_km": m.distance_km,
                }))?,
                None => println!("No geolocated airport matches"),
            }
        }
        Commands::List => {
            let library = load_library(dataset)?;
            print_json(library.full_list().records())?;
            eprintln!("{} airport(s)", library.len());
        }
    }

    Ok(())
}
