//! # grade-crossings
//!
//! Scans a directory of road/rail datasets and writes the grade
//! crossings of each one as CSV.
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::{info, warn};

use grade_crossings::{
    driver::{run_batch, BatchOptions},
    io::{FieldSchema, KnownIds},
    DetectorConfig, IndexKind,
};

#[derive(Parser)]
#[command(name = "grade-crossings")]
#[command(about = "Find roads passing under bridges and railways")]
#[command(long_about = "Find roads passing under bridges and railways.

Every subdirectory of INPUT holding a roads.geojson (and optionally a
railways.geojson) is a dataset. Results go to OUTPUT/<dataset>.csv and
are collected in OUTPUT/results.csv.")]
#[command(version)]
struct Cli {
    /// Directory of datasets
    #[arg(long, default_value = "datasets")]
    input: PathBuf,

    /// Directory for the result files
    #[arg(long, default_value = "results")]
    output: PathBuf,

    /// Directory of CSV files listing already reviewed segment ids
    #[arg(long, default_value = "known_bridges")]
    known: PathBuf,

    /// JSON detector configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file naming the feature properties to read
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Scan segments on all cores
    #[arg(long)]
    parallel: bool,

    /// Use a uniform grid with this cell size instead of an R-tree
    #[arg(long)]
    grid_cell_size: Option<f64>,

    /// Expand candidate query boxes by this distance
    #[arg(long)]
    buffer: Option<f64>,

    /// Also write a GeoJSON points file per dataset
    #[arg(long)]
    geojson: bool,
}

impl Cli {
    fn options(&self) -> anyhow::Result<BatchOptions> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::from_json_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => DetectorConfig::default(),
        };
        if self.parallel {
            config.parallel = true;
        }
        if let Some(cell_size) = self.grid_cell_size {
            config.index = IndexKind::Grid { cell_size };
        }
        if let Some(buffer) = self.buffer {
            config.query_buffer = buffer;
        }
        config.validate().context("invalid detector settings")?;

        let schema = match &self.schema {
            Some(path) => FieldSchema::from_json_file(path)
                .with_context(|| format!("reading schema {}", path.display()))?,
            None => FieldSchema::default(),
        };
        let known = KnownIds::load_dir(&self.known)
            .with_context(|| format!("reading known ids from {}", self.known.display()))?;

        Ok(BatchOptions {
            output: self.output.clone(),
            known,
            geojson: self.geojson,
            config,
            schema,
        })
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.options()?;

    let report = run_batch(&cli.input, &options)
        .with_context(|| format!("processing {}", cli.input.display()))?;
    for (dir, reason) in &report.failed {
        warn!("{} failed: {}", dir.display(), reason);
    }
    if report.datasets.is_empty() && !report.failed.is_empty() {
        bail!("all {} datasets failed", report.failed.len());
    }
    info!(
        "{} datasets processed, {} rows written to {}",
        report.datasets.len(),
        report.exported(),
        options.output.display()
    );
    Ok(())
}
