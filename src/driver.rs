//! Batch processing of dataset directories.
//!
//! A dataset is a directory holding a `roads.geojson` and optionally a
//! `railways.geojson`. Each one gets its own `<name>.csv` in the output
//! directory, and all rows are also collected into `results.csv`.
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use log::{error, info};

use crate::{
    config::DetectorConfig,
    detector::find_crossings,
    error::Result,
    io::{load_dataset, write_geojson_points, CsvExporter, FieldSchema, KnownIds, ROADS_FILE},
};

/// Name of the combined result file.
pub const GLOBAL_RESULTS: &str = "results.csv";

/// Everything a batch run needs besides the dataset list.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub output: PathBuf,
    pub known: KnownIds,
    /// Also write `<name>.geojson` point files.
    pub geojson: bool,
    pub config: DetectorConfig,
    pub schema: FieldSchema,
}

/// Counts for one processed dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetReport {
    pub name: String,
    pub segments: usize,
    pub crossings: usize,
    /// Crossings left after removing known ids.
    pub exported: usize,
    pub anomalies: usize,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub datasets: Vec<DatasetReport>,
    /// Datasets that could not be processed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn exported(&self) -> usize {
        self.datasets.iter().map(|d| d.exported).sum()
    }
}

/// Subdirectories of `root` that contain a roads file, sorted by path.
pub fn list_datasets(root: &Path) -> Result<Vec<PathBuf>> {
    let mut datasets = vec![];
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() && path.join(ROADS_FILE).is_file() {
            datasets.push(path);
        }
    }
    datasets.sort();
    Ok(datasets)
}

fn dataset_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

/// Process one dataset: write its own result files, then append the
/// same rows to `global`. Nothing reaches `global` if any of the
/// dataset's own outputs fails.
pub fn run_dataset<W: Write>(
    dir: &Path,
    options: &BatchOptions,
    global: &mut CsvExporter<'_, W>,
) -> Result<DatasetReport> {
    let name = dataset_name(dir);
    info!("processing dataset {}", name);
    let start = Instant::now();

    let store = load_dataset(dir, &options.schema)?;
    let detection = find_crossings(&store, &options.config)?;

    let path = options.output.join(format!("{}.csv", name));
    let mut local = CsvExporter::new(BufWriter::new(File::create(&path)?), &options.known);
    local.write_header()?;
    let exported = local.write_rows(detection.crossings())?;
    local.flush()?;

    if options.geojson {
        let path = options.output.join(format!("{}.geojson", name));
        let mut writer = BufWriter::new(File::create(&path)?);
        write_geojson_points(&mut writer, detection.crossings(), &options.known)?;
        writer.flush()?;
    }

    // Only a fully written dataset contributes to the combined results.
    global.write_rows(detection.crossings())?;

    info!(
        "{}: {} crossings, {} exported, in {:.2} s",
        name,
        detection.len(),
        exported,
        start.elapsed().as_secs_f64()
    );
    Ok(DatasetReport {
        name,
        segments: store.len(),
        crossings: detection.len(),
        exported,
        anomalies: detection.anomalies().len(),
    })
}

/// Process every dataset under `root`.
///
/// A failing dataset is logged and skipped; only failures to set up the
/// output abort the batch.
pub fn run_batch(root: &Path, options: &BatchOptions) -> Result<BatchReport> {
    let start = Instant::now();
    fs::create_dir_all(&options.output)?;
    let datasets = list_datasets(root)?;
    info!("{} datasets under {}", datasets.len(), root.display());

    let file = File::create(options.output.join(GLOBAL_RESULTS))?;
    let mut global = CsvExporter::new(BufWriter::new(file), &options.known);
    global.write_header()?;

    let mut report = BatchReport::default();
    for dir in datasets {
        match run_dataset(&dir, options, &mut global) {
            Ok(dataset) => report.datasets.push(dataset),
            Err(e) => {
                error!("skipping {}: {}", dir.display(), e);
                report.failed.push((dir, e.to_string()));
            }
        }
    }
    global.flush()?;

    info!(
        "total time: {:.2} s, {} rows exported",
        start.elapsed().as_secs_f64(),
        report.exported()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{CSV_HEADER, RAILS_FILE};

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const ROADS: &str = r#"{ "type": "FeatureCollection", "features": [
        { "type": "Feature",
          "geometry": { "type": "LineString", "coordinates": [[0, 0], [10, 0]] },
          "properties": { "osm_id": 1, "fclass": "primary", "layer": 0, "bridge": "F" } },
        { "type": "Feature",
          "geometry": { "type": "LineString", "coordinates": [[5, -5], [5, 5]] },
          "properties": { "osm_id": 2, "fclass": "primary", "layer": 1, "bridge": "T" } },
        { "type": "Feature",
          "geometry": { "type": "LineString", "coordinates": [[8, -5], [8, 5]] },
          "properties": { "osm_id": 3, "fclass": "service", "layer": 1, "bridge": "F" } }
    ] }"#;

    const RAILS: &str = r#"{ "type": "FeatureCollection", "features": [
        { "type": "Feature",
          "geometry": { "type": "LineString", "coordinates": [[2, -5], [2, 5]] },
          "properties": { "osm_id": 10, "fclass": "rail", "layer": 1, "bridge": "T" } }
    ] }"#;

    fn write_dataset(root: &Path, name: &str, rails: bool) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(ROADS_FILE), ROADS).unwrap();
        if rails {
            fs::write(dir.join(RAILS_FILE), RAILS).unwrap();
        }
        dir
    }

    fn read_rows(path: &Path) -> Vec<(i64, f64, f64, i64, String)> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        assert_eq!(reader.headers().unwrap(), &csv::StringRecord::from(CSV_HEADER.to_vec()));
        reader
            .records()
            .map(|row| {
                let row = row.unwrap();
                (
                    row[0].parse().unwrap(),
                    row[1].parse().unwrap(),
                    row[2].parse().unwrap(),
                    row[3].parse().unwrap(),
                    row[4].to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn lists_only_datasets() {
        let root = tempfile::tempdir().unwrap();
        write_dataset(root.path(), "b", false);
        write_dataset(root.path(), "a", true);
        fs::create_dir(root.path().join("empty")).unwrap();
        fs::write(root.path().join("stray.geojson"), ROADS).unwrap();

        let names: Vec<_> = list_datasets(root.path())
            .unwrap()
            .iter()
            .map(|dir| dataset_name(dir))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn batch_writes_local_and_global_results() {
        init_log();
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_dataset(root.path(), "a", true);
        write_dataset(root.path(), "b", false);

        let options = BatchOptions {
            output: out.path().to_path_buf(),
            known: KnownIds::default(),
            geojson: true,
            ..Default::default()
        };
        let report = run_batch(root.path(), &options).unwrap();
        assert!(report.failed.is_empty());
        assert_eq!(report.datasets.len(), 2);

        let a = &report.datasets[0];
        assert_eq!(a.name, "a");
        assert_eq!(a.segments, 4);
        assert_eq!(a.crossings, 3);
        assert_eq!(a.exported, 3);
        assert_eq!(report.datasets[1].crossings, 2);

        let rows = read_rows(&out.path().join("a.csv"));
        assert_eq!(
            rows,
            vec![
                (1, 0., 5., 2, String::new()),
                (1, 0., 8., 3, "not a bridge".to_string()),
                (1, 0., 2., 10, String::new()),
            ]
        );
        let global = fs::read_to_string(out.path().join(GLOBAL_RESULTS)).unwrap();
        assert_eq!(global.lines().count(), 1 + 3 + 2);
        assert!(out.path().join("b.geojson").is_file());
    }

    #[test]
    fn known_ids_are_not_exported() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_dataset(root.path(), "a", false);

        let options = BatchOptions {
            output: out.path().to_path_buf(),
            known: KnownIds::new([1]),
            ..Default::default()
        };
        let report = run_batch(root.path(), &options).unwrap();
        assert_eq!(report.datasets[0].crossings, 2);
        assert_eq!(report.datasets[0].exported, 0);
        let local = fs::read_to_string(out.path().join("a.csv")).unwrap();
        assert_eq!(local.lines().count(), 1);
    }

    #[test]
    fn failing_dataset_is_skipped() {
        init_log();
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_dataset(root.path(), "good", false);
        let bad = root.path().join("bad");
        fs::create_dir(&bad).unwrap();
        fs::write(bad.join(ROADS_FILE), "{ not json").unwrap();

        let options = BatchOptions {
            output: out.path().to_path_buf(),
            ..Default::default()
        };
        let report = run_batch(root.path(), &options).unwrap();
        assert_eq!(report.datasets.len(), 1);
        assert_eq!(report.datasets[0].name, "good");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, bad);
    }

    #[test]
    fn failed_points_file_keeps_rows_out_of_global_results() {
        init_log();
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_dataset(root.path(), "a", true);
        // A directory in the way of the points file.
        fs::create_dir(out.path().join("a.geojson")).unwrap();

        let options = BatchOptions {
            output: out.path().to_path_buf(),
            geojson: true,
            ..Default::default()
        };
        let report = run_batch(root.path(), &options).unwrap();
        assert!(report.datasets.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(read_rows(&out.path().join(GLOBAL_RESULTS)).is_empty());
    }
}
