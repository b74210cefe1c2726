use std::path::PathBuf;

use crate::segment::SegmentId;

/// Error types for loading, indexing and exporting a dataset.
///
/// Geometric anomalies found during detection are not errors; they are
/// collected as [`Anomaly`](crate::Anomaly) records instead.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    #[error("segment {id} has {count} point(s), at least 2 are required")]
    TooFewPoints { id: SegmentId, count: usize },

    #[error("segment {id} has a non-finite coordinate")]
    NonFiniteCoordinate { id: SegmentId },

    #[error("segment {id} collapses to a single point")]
    DegenerateGeometry { id: SegmentId },

    #[error("duplicate segment id {0}")]
    DuplicateId(SegmentId),

    #[error("grid cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    #[error("query buffer must be finite and non-negative, got {0}")]
    InvalidQueryBuffer(f64),

    #[error("grid cell size {cell_size} is too small: a box spans {cells} cells, at most {limit} allowed")]
    GridTooFine {
        cell_size: f64,
        cells: f64,
        limit: usize,
    },

    #[error("feature {feature}: missing field `{field}`")]
    MissingField { field: String, feature: usize },

    #[error("feature {feature}: field `{field}` has unusable value {value}")]
    InvalidField {
        field: String,
        feature: usize,
        value: String,
    },

    #[error("feature {feature}: expected a LineString, found {kind}")]
    UnsupportedGeometry { feature: usize, kind: String },

    #[error("dataset {0} has no roads file")]
    MissingRoads(PathBuf),

    #[error("{path}, record {record}: `{value}` is not a segment id")]
    InvalidKnownId {
        path: PathBuf,
        record: usize,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid dataset pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, GradeError>;
