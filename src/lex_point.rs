use std::cmp::Ordering;

use geo::{Coord, GeoFloat};

/// Wraps a [`Coord`] to support lexicographic ordering.
///
/// The ordering is by `x` and then by `y`. Implements `PartialOrd`,
/// `Ord` and `Eq` even though `Coord` doesn't implement these.  This
/// is necessary to collect intersection points in ordered sets, where
/// the same point reported by two adjacent lines collapses into one.
///
/// Note that the trait impls exist even when `T` is not `Eq` or
/// `Ord`. We must ensure that any lex point only contains values
/// that can be consistently ordered.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct LexPoint<T: GeoFloat>(Coord<T>);

impl<T: GeoFloat> LexPoint<T> {
    /// The wrapped coordinate.
    #[inline]
    pub fn coord(&self) -> Coord<T> {
        self.0
    }
}

/// Implement lexicographic ordering by `x` and then by `y`
/// coordinate.
impl<T: GeoFloat> PartialOrd for LexPoint<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.0.x.partial_cmp(&other.0.x) {
            Some(Ordering::Equal) => self.0.y.partial_cmp(&other.0.y),
            o => o,
        }
    }
}

/// Derive `Ord` from `PartialOrd` and expect to not fail.
impl<T: GeoFloat> Ord for LexPoint<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other)
            .expect("lex points only hold finite coordinates")
    }
}

/// We derive `Eq` manually to not require `T: Eq`.
impl<T: GeoFloat> Eq for LexPoint<T> {}

/// Create from `Coord` while checking the components are finite.
impl<T: GeoFloat> From<Coord<T>> for LexPoint<T> {
    fn from(pt: Coord<T>) -> Self {
        assert!(pt.x.is_finite(), "lex point requires a finite x-coordinate");
        assert!(pt.y.is_finite(), "lex point requires a finite y-coordinate");
        LexPoint(pt)
    }
}

impl<T: GeoFloat> From<(T, T)> for LexPoint<T> {
    fn from(pt: (T, T)) -> Self {
        Coord { x: pt.0, y: pt.1 }.into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_lex_point_ordering() {
        let p1 = LexPoint::from(Coord { x: 0., y: 0. });
        let p2 = LexPoint::from(Coord { x: 1., y: 0. });
        let p3 = LexPoint::from(Coord { x: 1., y: 1. });
        let p4 = LexPoint::from(Coord { x: 1., y: 1. });

        assert!(p1 < p2);
        assert!(p1 < p3);
        assert!(p2 < p3);
        assert!(p3 <= p4);
    }

    #[test]
    fn duplicates_collapse_in_sets() {
        let set: BTreeSet<LexPoint<f64>> = [(5., 0.), (1., 2.), (5., 0.), (1., -2.)]
            .into_iter()
            .map(LexPoint::from)
            .collect();
        let order: Vec<_> = set.iter().map(|p| (p.coord().x, p.coord().y)).collect();
        assert_eq!(order, vec![(1., -2.), (1., 2.), (5., 0.)]);
    }

    #[test]
    #[should_panic(expected = "finite x-coordinate")]
    fn rejects_nan() {
        let _ = LexPoint::from(Coord { x: f64::NAN, y: 0. });
    }
}
