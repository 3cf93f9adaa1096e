//! Command-line parcel lookup.
//!
//! Resolves lot/plan identifiers, prints a summary table and bounds, and
//! optionally writes KML and zipped GeoJSON exports.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use parcelkit::export::{default_filename, export_archive, export_kml};
use parcelkit::models::{parse_identifiers, ParcelSummary};
use parcelkit::{compute_bounds, Config, ParcelBounds};

#[derive(Parser, Debug)]
#[command(name = "parcels")]
#[command(about = "Look up QLD/NSW cadastral parcels and export them")]
struct Args {
    /// Lot/plan identifiers, e.g. 3RP12345 or 1//DP123456
    ids: Vec<String>,

    /// File with one identifier per line
    #[arg(short, long)]
    ids_file: Option<PathBuf>,

    /// TOML config with [endpoints] and [style] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a styled KML document here
    #[arg(long)]
    kml: Option<PathBuf>,

    /// Write a zipped GeoJSON bundle here
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Only export these identifiers (comma separated)
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// Print the summary as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    parcels: &'a [ParcelSummary],
    missing: &'a [String],
    bounds: Option<ParcelBounds>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    let mut ids = args.ids.clone();
    if let Some(path) = &args.ids_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        ids.extend(parse_identifiers(&text));
    }
    if ids.is_empty() {
        anyhow::bail!("No identifiers given");
    }

    let fetcher = config.fetcher().context("Invalid endpoint configuration")?;

    let pb = ProgressBar::new(ids.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?,
    );
    let result = fetcher
        .fetch_all_with_progress(&ids, |settled, total| {
            pb.set_length(total as u64);
            pb.set_position(settled as u64);
        })
        .await;
    pb.finish_and_clear();

    if !result.missing.is_empty() {
        warn!("Not found: {}", result.missing.join(", "));
    }
    info!(
        "{} parcel{} loaded",
        result.present.len(),
        if result.present.len() == 1 { "" } else { "s" }
    );

    let (selection, is_selection) = match &args.select {
        Some(selected) => (result.present.subset(selected), true),
        None => (result.present.clone(), false),
    };

    let summaries = selection.summaries();
    let bounds = compute_bounds(selection.records());

    if args.json {
        let report = Report {
            parcels: &summaries,
            missing: &result.missing,
            bounds,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&summaries, &result.missing, bounds);
    }

    if let Some(path) = &args.kml {
        let filename = export_filename(path, "kml", is_selection);
        export_kml(&selection, &config.style, filename)
            .context("KML export failed")?
            .write_to(path)?;
    }

    if let Some(path) = &args.archive {
        let filename = export_filename(path, "zip", is_selection);
        export_archive(&selection, filename)
            .context("Archive export failed")?
            .write_to(path)?;
    }

    Ok(())
}

fn export_filename(path: &Path, extension: &str, selection: bool) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| default_filename(extension, selection))
}

fn print_table(rows: &[ParcelSummary], missing: &[String], bounds: Option<ParcelBounds>) {
    let id_width = rows
        .iter()
        .map(|r| r.identifier.len())
        .chain(std::iter::once("Lot/Plan".len()))
        .max()
        .unwrap_or(8);

    println!("{:<id_width$}  {:<14}  {:>12}", "Lot/Plan", "Lot Type", "Area (ha)");
    for row in rows {
        println!(
            "{:<id_width$}  {:<14}  {:>12.4}",
            row.identifier, row.lot_type, row.area_hectares
        );
    }

    if !missing.is_empty() {
        println!("\nNot found: {}", missing.join(", "));
    }

    if let Some(b) = bounds {
        println!(
            "\nBounds: lat [{}, {}], lng [{}, {}]",
            b.min_lat, b.max_lat, b.min_lng, b.max_lng
        );
    }
}

