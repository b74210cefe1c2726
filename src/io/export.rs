use std::io::Write;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::{detector::Crossing, error::Result};

use super::KnownIds;

pub const CSV_HEADER: [&str; 5] = ["OSM_ID", "LAT", "LNG", "OVERPASS_OSM_ID", "COMMENT"];

/// Writes crossings as CSV rows, one per point.
pub struct CsvExporter<'k, W: Write> {
    writer: csv::Writer<W>,
    known: &'k KnownIds,
}

impl<'k, W: Write> CsvExporter<'k, W> {
    pub fn new(writer: W, known: &'k KnownIds) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        CsvExporter { writer, known }
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.writer.write_record(CSV_HEADER)?;
        Ok(())
    }

    /// Write the rows whose lower segment is not known; returns how
    /// many were written.
    pub fn write_rows(&mut self, crossings: &[Crossing<'_>]) -> Result<usize> {
        let mut written = 0;
        for crossing in crossings {
            if self.known.contains(crossing.under.id()) {
                continue;
            }
            self.writer.write_record(&[
                crossing.under.id().to_string(),
                crossing.point.y.to_string(),
                crossing.point.x.to_string(),
                crossing.over.id().to_string(),
                crossing.comment.to_string(),
            ])?;
            written += 1;
        }
        Ok(written)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn point_feature(crossing: &Crossing<'_>) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("osm_id_l".into(), JsonValue::from(crossing.under.id()));
    properties.insert("osm_id_h".into(), JsonValue::from(crossing.over.id()));
    properties.insert("comment".into(), JsonValue::from(crossing.comment.as_str()));
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            crossing.point.x,
            crossing.point.y,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Write the crossings as a FeatureCollection of points, skipping
/// known lower segments as [`CsvExporter`] does.
pub fn write_geojson_points<W: Write>(
    writer: W,
    crossings: &[Crossing<'_>],
    known: &KnownIds,
) -> Result<usize> {
    let features: Vec<_> = crossings
        .iter()
        .filter(|c| !known.contains(c.under.id()))
        .map(point_feature)
        .collect();
    let count = features.len();
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    serde_json::to_writer(writer, &collection)?;
    Ok(count)
}
