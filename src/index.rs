//! Bounding-box indices used to generate crossing candidates.
//!
//! Indices are filled through a builder and become immutable once
//! built; queries take `&self` and are safe to run from many threads.
//! Every query is sound: it returns at least every key whose box
//! overlaps the (buffered) query box, including boxes that only share
//! an edge or a corner with it.
use geo::{Coord, Rect};

mod grid;
pub use grid::{GridIndex, GridIndexBuilder, MAX_CELLS_PER_BOX};

mod rtree;
pub use rtree::{SpatialIndex, SpatialIndexBuilder};

/// Interface for indices that produce intersection candidates.
pub trait CandidateIndex: Sync {
    type Key: Copy + Ord + Send + Sync;

    /// Return the keys of all boxes overlapping `bbox` expanded by
    /// `buffer` on all sides, sorted and without duplicates.
    ///
    /// # Panics
    ///
    /// If `buffer` is negative or not finite.
    fn query(&self, bbox: Rect<f64>, buffer: f64) -> Vec<Self::Key>;

    /// Number of boxes inserted.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Expand `bbox` by `buffer` on every side.
pub(crate) fn buffered(bbox: Rect<f64>, buffer: f64) -> Rect<f64> {
    assert!(
        buffer.is_finite() && buffer >= 0.,
        "query buffer must be finite and non-negative, got {}",
        buffer
    );
    let (min, max) = (bbox.min(), bbox.max());
    Rect::new(
        Coord {
            x: min.x - buffer,
            y: min.y - buffer,
        },
        Coord {
            x: max.x + buffer,
            y: max.y + buffer,
        },
    )
}

/// Whether two boxes share at least one point.
#[inline]
pub(crate) fn overlaps(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x && a.min().y <= b.max().y && b.min().y <= a.max().y
}

#[cfg(test)]
mod tests {
    use geo::coord;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::random::uniform_rect;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
        Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })
    }

    #[test]
    fn buffer_expands_all_sides() {
        let r = buffered(rect(0., 0., 1., 2.), 0.5);
        assert_eq!(r, rect(-0.5, -0.5, 1.5, 2.5));
    }

    #[test]
    #[should_panic(expected = "query buffer")]
    fn negative_buffer_panics() {
        buffered(rect(0., 0., 1., 1.), -1.);
    }

    #[test]
    fn overlap_includes_edges() {
        assert!(overlaps(&rect(0., 0., 1., 1.), &rect(1., 1., 2., 2.)));
        assert!(overlaps(&rect(0., 0., 10., 0.), &rect(5., -5., 5., 5.)));
        assert!(!overlaps(&rect(0., 0., 1., 1.), &rect(1.5, 0., 2., 1.)));
    }

    #[test]
    fn rtree_and_grid_agree_with_linear_scan() {
        let mut rng = StdRng::seed_from_u64(17);
        let bounds = rect(0., 0., 1000., 1000.);
        let boxes: Vec<_> = (0..500).map(|_| uniform_rect(&mut rng, bounds, 40.)).collect();

        let mut rtree = SpatialIndexBuilder::with_capacity(boxes.len());
        let mut grid = GridIndexBuilder::new(25.).unwrap();
        for (key, b) in boxes.iter().enumerate() {
            rtree.insert(key, *b);
            grid.insert(key, *b);
        }
        let rtree = rtree.build();
        let grid = grid.build().unwrap();
        assert_eq!(rtree.len(), boxes.len());
        assert_eq!(grid.len(), boxes.len());

        for _ in 0..200 {
            let query = uniform_rect(&mut rng, bounds, 60.);
            let buffer = if rng.gen_bool(0.5) { 0. } else { rng.gen_range(0.0..20.0) };
            let expanded = buffered(query, buffer);
            let expected: Vec<usize> = boxes
                .iter()
                .enumerate()
                .filter(|(_, b)| overlaps(b, &expanded))
                .map(|(k, _)| k)
                .collect();
            assert_eq!(rtree.query(query, buffer), expected);
            assert_eq!(grid.query(query, buffer), expected);
        }
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = rect(-50., -50., 50., 50.);
        let boxes: Vec<_> = (0..100).map(|_| uniform_rect(&mut rng, bounds, 10.)).collect();

        let mut forward = SpatialIndexBuilder::new();
        let mut backward = SpatialIndexBuilder::new();
        for (key, b) in boxes.iter().enumerate() {
            forward.insert(key, *b);
        }
        for (key, b) in boxes.iter().enumerate().rev() {
            backward.insert(key, *b);
        }
        let (forward, backward) = (forward.build(), backward.build());

        for b in &boxes {
            assert_eq!(forward.query(*b, 0.), backward.query(*b, 0.));
        }
    }
}
