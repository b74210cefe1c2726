use std::hash::{Hash, Hasher};

use geo::{Coord, LineString, Rect};

use crate::error::{GradeError, Result};

/// Identifier of a segment, unique across roads and rails of one dataset.
pub type SegmentId = i64;

/// Road categories that can be the lower side of a crossing.
///
/// Rails and minor roads (service, busway, unclassified, ...) are
/// only ever considered as the upper side.
pub const ELIGIBLE_CATEGORIES: &[&str] = &[
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "living_street",
    "residential",
];

/// One road or rail polyline with its attributes.
///
/// Equality and hashing are based on `id` only.
#[derive(Debug, Clone)]
pub struct Segment {
    id: SegmentId,
    line: LineString<f64>,
    category: String,
    layer: i32,
    bridge: bool,
}

impl Segment {
    /// Create a segment, validating its geometry.
    ///
    /// Fails if the polyline has fewer than two points, a non-finite
    /// coordinate, or collapses to a single point.
    pub fn new(
        id: SegmentId,
        line: impl Into<LineString<f64>>,
        category: impl Into<String>,
        layer: i32,
        bridge: bool,
    ) -> Result<Self> {
        let line = line.into();
        let count = line.0.len();
        if count < 2 {
            return Err(GradeError::TooFewPoints { id, count });
        }
        if line.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(GradeError::NonFiniteCoordinate { id });
        }
        let first = line.0[0];
        if line.coords().all(|c| *c == first) {
            return Err(GradeError::DegenerateGeometry { id });
        }

        Ok(Segment {
            id,
            line,
            category: category.into(),
            layer,
            bridge,
        })
    }

    #[inline]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// The polyline geometry.
    #[inline]
    pub fn line(&self) -> &LineString<f64> {
        &self.line
    }

    #[inline]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[inline]
    pub fn layer(&self) -> i32 {
        self.layer
    }

    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.bridge
    }

    /// Whether the category is one of [`ELIGIBLE_CATEGORIES`].
    pub fn is_eligible(&self) -> bool {
        ELIGIBLE_CATEGORIES.contains(&self.category.as_str())
    }

    /// First and last vertex of the polyline.
    pub fn endpoints(&self) -> (Coord<f64>, Coord<f64>) {
        let n = self.line.0.len();
        (self.line.0[0], self.line.0[n - 1])
    }

    /// Axis-aligned bounding box, computed from the geometry on every call.
    pub fn bbox(&self) -> Rect<f64> {
        let first = self.line.0[0];
        let (min, max) = self.line.coords().fold((first, first), |(min, max), c| {
            (
                Coord {
                    x: min.x.min(c.x),
                    y: min.y.min(c.y),
                },
                Coord {
                    x: max.x.max(c.x),
                    y: max.y.max(c.y),
                },
            )
        });
        Rect::new(min, max)
    }
}

impl PartialEq for Segment {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
