//! Boundary between datasets on disk and the detector: GeoJSON
//! loading, known-id exclusion lists and result export.
mod load;
pub use load::{load_dataset, load_segments, FieldSchema, RAILS_FILE, ROADS_FILE};

mod known;
pub use known::KnownIds;

mod export;
pub use export::{write_geojson_points, CsvExporter, CSV_HEADER};
