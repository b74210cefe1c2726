//! Exact intersection predicates between two polylines.
//!
//! Every line of one polyline is intersected with every line of the
//! other (through an R-tree join once the pair count grows), giving a
//! set of distinct intersection points and a list of collinear
//! overlaps. The `intersects`, `touches` and shape classification
//! predicates are all derived from that one computation.
use std::collections::BTreeSet;

use geo::{Coord, Line, LineString};
use rstar::{RTree, RTreeObject, AABB};

use crate::{lex_point::LexPoint, line_or_point::LineOrPoint};

/// Line pairs above this count are joined through R-trees instead of
/// being tested exhaustively.
const BRUTE_FORCE_PAIRS: usize = 64;

/// A polyline line wrapped for insertion into an [`RTree`].
struct IndexedLine(Line<f64>);

impl RTreeObject for IndexedLine {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let Line { start, end } = self.0;
        AABB::from_corners([start.x, start.y], [end.x, end.y])
    }
}

/// Shape of the intersection of two polylines.
#[derive(Debug, Clone, PartialEq)]
pub enum IntersectionShape<'a> {
    Empty,
    Point(Coord<f64>),
    /// Two or more distinct points, in lexicographic order.
    MultiPoint(&'a [Coord<f64>]),
    /// At least one overlapping piece; any isolated points are ignored.
    Other { overlaps: usize },
}

/// The full intersection of two polylines.
#[derive(Debug, Clone, Default)]
pub struct PolylineIntersection {
    /// Distinct isolated points, lexicographically ordered. Points
    /// lying on an overlap are absorbed into it.
    points: Vec<Coord<f64>>,
    overlaps: Vec<Line<f64>>,
}

impl PolylineIntersection {
    /// Intersect polylines `a` and `b`.
    pub fn compute(a: &LineString<f64>, b: &LineString<f64>) -> Self {
        let mut points = BTreeSet::new();
        let mut overlaps = vec![];

        let mut visit = |la: Line<f64>, lb: Line<f64>| {
            match LineOrPoint::from(la).intersect(&LineOrPoint::from(lb)) {
                Some(LineOrPoint::Point(p)) => {
                    points.insert(p);
                }
                Some(LineOrPoint::Line(p, q)) => overlaps.push(Line::new(p.coord(), q.coord())),
                None => {}
            }
        };

        let pairs = a.lines().len() * b.lines().len();
        if pairs <= BRUTE_FORCE_PAIRS {
            for la in a.lines() {
                for lb in b.lines() {
                    visit(la, lb);
                }
            }
        } else {
            let tree_a = RTree::bulk_load(a.lines().map(IndexedLine).collect());
            let tree_b = RTree::bulk_load(b.lines().map(IndexedLine).collect());
            for (la, lb) in tree_a.intersection_candidates_with_other_tree(&tree_b) {
                visit(la.0, lb.0);
            }
        }

        let points = points
            .into_iter()
            .map(|p: LexPoint<f64>| p.coord())
            .filter(|&p| {
                !overlaps
                    .iter()
                    .any(|l: &Line<f64>| LineOrPoint::from(*l).contains(p))
            })
            .collect();

        PolylineIntersection { points, overlaps }
    }

    /// Whether the polylines share at least one point.
    #[inline]
    pub fn intersects(&self) -> bool {
        !self.points.is_empty() || !self.overlaps.is_empty()
    }

    /// Whether `a` and `b`, the polylines this was computed from, only
    /// touch: they intersect, but only at boundary points.
    ///
    /// The boundary of an open polyline is its pair of end points; a
    /// closed polyline has no boundary. An overlap always contains
    /// interior points of both, so it rules out touching.
    pub fn touches(&self, a: &LineString<f64>, b: &LineString<f64>) -> bool {
        self.intersects()
            && self.overlaps.is_empty()
            && self
                .points
                .iter()
                .all(|&p| on_boundary(a, p) || on_boundary(b, p))
    }

    /// Classify the intersection.
    pub fn shape(&self) -> IntersectionShape<'_> {
        if !self.overlaps.is_empty() {
            return IntersectionShape::Other {
                overlaps: self.overlaps.len(),
            };
        }
        match self.points.as_slice() {
            [] => IntersectionShape::Empty,
            [p] => IntersectionShape::Point(*p),
            points => IntersectionShape::MultiPoint(points),
        }
    }

    /// Distinct isolated intersection points.
    #[inline]
    pub fn points(&self) -> &[Coord<f64>] {
        &self.points
    }

    /// Collinear overlapping pieces.
    #[inline]
    pub fn overlaps(&self) -> &[Line<f64>] {
        &self.overlaps
    }
}

fn on_boundary(line: &LineString<f64>, p: Coord<f64>) -> bool {
    if line.is_closed() {
        return false;
    }
    line.0.first() == Some(&p) || line.0.last() == Some(&p)
}
