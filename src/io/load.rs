use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use geo::{Coord, LineString};
use geojson::{feature::Id, Feature, FeatureReader, JsonValue, Value};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    error::{GradeError, Result},
    segment::{Segment, SegmentId},
    store::SegmentStore,
};

/// Road features of a dataset directory.
pub const ROADS_FILE: &str = "roads.geojson";
/// Rail features of a dataset directory (optional).
pub const RAILS_FILE: &str = "railways.geojson";

/// Names of the feature properties holding segment attributes.
///
/// Defaults match the Geofabrik road and railway layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSchema {
    pub id: String,
    pub category: String,
    pub layer: String,
    pub bridge: String,
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            id: "osm_id".into(),
            category: "fclass".into(),
            layer: "layer".into(),
            bridge: "bridge".into(),
        }
    }
}

impl FieldSchema {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Convert the `n`-th feature of a file into a segment.
    pub fn segment(&self, n: usize, feature: &Feature) -> Result<Segment> {
        let id = match feature.property(&self.id) {
            Some(value) if !value.is_null() => int_field(&self.id, n, value)?,
            _ => match &feature.id {
                Some(Id::Number(num)) => int_field(&self.id, n, &JsonValue::Number(num.clone()))?,
                Some(Id::String(s)) => int_field(&self.id, n, &JsonValue::String(s.clone()))?,
                None => return Err(missing(&self.id, n)),
            },
        };

        let category = match feature.property(&self.category) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => return Err(missing(&self.category, n)),
            Some(other) => return Err(invalid(&self.category, n, other)),
        };

        let layer = match feature.property(&self.layer) {
            Some(JsonValue::Null) | None => 0,
            Some(value) => {
                let layer = int_field(&self.layer, n, value)?;
                i32::try_from(layer).map_err(|_| invalid(&self.layer, n, value))?
            }
        };

        let bridge = match feature.property(&self.bridge) {
            Some(value) => bool_field(&self.bridge, n, value)?,
            None => false,
        };

        let line = line_string(n, feature)?;
        Segment::new(id, line, category, layer, bridge)
    }
}

fn missing(field: &str, feature: usize) -> GradeError {
    GradeError::MissingField {
        field: field.to_string(),
        feature,
    }
}

fn invalid(field: &str, feature: usize, value: &JsonValue) -> GradeError {
    GradeError::InvalidField {
        field: field.to_string(),
        feature,
        value: value.to_string(),
    }
}

/// Integral floats in `[-2^63, 2^63)` convert to `i64` exactly.
fn float_to_int(f: f64) -> Option<i64> {
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    (f.fract() == 0. && (-BOUND..BOUND).contains(&f)).then(|| f as i64)
}

/// An integer, given as a number or a numeric string.
fn int_field(field: &str, feature: usize, value: &JsonValue) -> Result<SegmentId> {
    let parsed = match value {
        JsonValue::Number(num) => num.as_i64().or_else(|| num.as_f64().and_then(float_to_int)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(field, feature, value))
}

/// A flag, given as a boolean, a 0/1 number or a T/F, yes/no string.
fn bool_field(field: &str, feature: usize, value: &JsonValue) -> Result<bool> {
    match value {
        JsonValue::Null => Ok(false),
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::Number(num) => match num.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(invalid(field, feature, value)),
        },
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "t" | "true" | "yes" | "y" | "1" => Ok(true),
            "f" | "false" | "no" | "n" | "0" | "" => Ok(false),
            _ => Err(invalid(field, feature, value)),
        },
        _ => Err(invalid(field, feature, value)),
    }
}

fn line_string(n: usize, feature: &Feature) -> Result<LineString<f64>> {
    let geometry = feature.geometry.as_ref().ok_or_else(|| missing("geometry", n))?;
    let positions = match &geometry.value {
        Value::LineString(positions) => positions,
        other => {
            return Err(GradeError::UnsupportedGeometry {
                feature: n,
                kind: other.type_name().to_string(),
            })
        }
    };
    positions
        .iter()
        .map(|pos| match pos.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(GradeError::InvalidField {
                field: "geometry".into(),
                feature: n,
                value: format!("{:?}", pos),
            }),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

/// Stream the features of a GeoJSON FeatureCollection into segments.
pub fn read_segments<R: Read>(reader: R, schema: &FieldSchema) -> Result<Vec<Segment>> {
    FeatureReader::from_reader(reader)
        .features()
        .enumerate()
        .map(|(n, feature)| schema.segment(n, &feature?))
        .collect()
}

/// Load the segments of one GeoJSON file.
pub fn load_segments(path: &Path, schema: &FieldSchema) -> Result<Vec<Segment>> {
    debug!("reading {}", path.display());
    read_segments(BufReader::new(File::open(path)?), schema)
}

/// Load the roads and (if present) the rails of a dataset directory.
pub fn load_dataset(dir: &Path, schema: &FieldSchema) -> Result<SegmentStore> {
    let roads_path = dir.join(ROADS_FILE);
    if !roads_path.is_file() {
        return Err(GradeError::MissingRoads(dir.to_path_buf()));
    }
    let roads = load_segments(&roads_path, schema)?;

    let rails_path = dir.join(RAILS_FILE);
    let rails = if rails_path.is_file() {
        load_segments(&rails_path, schema)?
    } else {
        debug!("{} has no {}", dir.display(), RAILS_FILE);
        vec![]
    };

    let categories: BTreeSet<&str> = roads.iter().map(Segment::category).collect();
    info!("read {} roads, {} rails", roads.len(), rails.len());
    info!("road categories: {:?}", categories);

    SegmentStore::from_streams(roads, rails)
}
