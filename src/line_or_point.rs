use geo::{
    kernels::{Kernel, Orientation},
    line_intersection::{line_intersection, LineIntersection},
    Coord, GeoFloat, Line,
};

use crate::lex_point::LexPoint;

/// Either a line segment or a point.
///
/// The coordinates are ordered (see [`LexPoint`]) and a line
/// segment must have distinct points (use the `Point` variant if the
/// coordinates are the equal). Polylines with repeated vertices
/// produce zero-length lines, which become points here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineOrPoint<T: GeoFloat> {
    Point(LexPoint<T>),
    Line(LexPoint<T>, LexPoint<T>),
}

/// Convert from a [`Line`] ensuring end point ordering.
impl<T: GeoFloat> From<Line<T>> for LineOrPoint<T> {
    fn from(l: Line<T>) -> Self {
        let start = l.start.into();
        let end = l.end.into();
        if start < end {
            LineOrPoint::Line(start, end)
        } else if start > end {
            LineOrPoint::Line(end, start)
        } else {
            LineOrPoint::Point(start)
        }
    }
}

/// Convert from a [`Coord`]
impl<T: GeoFloat> From<Coord<T>> for LineOrPoint<T> {
    fn from(c: Coord<T>) -> Self {
        LineOrPoint::Point(c.into())
    }
}

impl<T: GeoFloat> LineOrPoint<T> {
    /// Checks if the variant is a line.
    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, LineOrPoint::Line(_, _))
    }

    /// Return the geometry as a [`Line`]; a point becomes a
    /// zero-length line.
    #[inline]
    pub fn line(&self) -> Line<T> {
        match self {
            LineOrPoint::Line(p, q) => Line::new(p.coord(), q.coord()),
            LineOrPoint::Point(p) => Line::new(p.coord(), p.coord()),
        }
    }

    /// Intersect two geometries and return a point, an overlapping
    /// segment or `None`.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        match (*self, *other) {
            (LineOrPoint::Point(p), LineOrPoint::Point(q)) => (p == q).then_some(*self),
            (LineOrPoint::Line(_, _), LineOrPoint::Point(_)) => other.intersect(self),
            (LineOrPoint::Point(p), LineOrPoint::Line(ls, le)) => {
                let collinear =
                    T::Ker::orient2d(ls.coord(), p.coord(), le.coord()) == Orientation::Collinear;
                (collinear && p >= ls && p <= le).then_some(*self)
            }
            (LineOrPoint::Line(_, _), LineOrPoint::Line(_, _)) => {
                line_intersection(self.line(), other.line()).map(|l| match l {
                    LineIntersection::SinglePoint { intersection, .. } => intersection.into(),
                    LineIntersection::Collinear { intersection } => intersection.into(),
                })
            }
        }
    }

    /// Checks whether a coordinate lies on this geometry.
    #[inline]
    pub fn contains(&self, c: Coord<T>) -> bool {
        LineOrPoint::from(c).intersect(self).is_some()
    }
}
