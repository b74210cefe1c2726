#![allow(dead_code)]

use geo::{Coord, LineString, Rect};
use grade_crossings::{CandidateIndex, CrossingDetector, DetectorConfig, Segment, SegmentStore};
use rand::Rng;

use super::random::random_polyline;

/// A random network of walks, every fourth one an upper bridge.
pub fn random_network<R: Rng>(
    rng: &mut R,
    bbox: Rect<f64>,
    num_segments: usize,
    vertices: usize,
    step: f64,
) -> SegmentStore {
    let segments = (0..num_segments).map(|i| {
        let line: LineString<f64> = random_polyline(rng, bbox, vertices, step);
        let (category, layer, bridge) = if i % 4 == 0 {
            ("primary", 1, true)
        } else {
            ("residential", 0, false)
        };
        Segment::new(i as i64, line, category, layer, bridge)
            .expect("random walks have distinct vertices")
    });
    SegmentStore::new(segments).expect("ids are unique")
}

pub fn bbox(size: f64) -> Rect<f64> {
    Rect::new(Coord { x: 0., y: 0. }, Coord { x: size, y: size })
}

/// Offers every segment as a candidate of every query.
pub struct AllCandidates(usize);

impl CandidateIndex for AllCandidates {
    type Key = usize;

    fn query(&self, _bbox: Rect<f64>, _buffer: f64) -> Vec<usize> {
        (0..self.0).collect()
    }

    fn len(&self) -> usize {
        self.0
    }
}

/// Crossings found without any spatial pruning, classified exactly as
/// the detector does.
pub fn count_brute(store: &SegmentStore) -> usize {
    count_with(store, &AllCandidates(store.len()), false)
}

pub fn count_with<I>(store: &SegmentStore, index: &I, parallel: bool) -> usize
where
    I: CandidateIndex<Key = usize>,
{
    let config = DetectorConfig {
        parallel,
        progress_interval: 0,
        ..Default::default()
    };
    CrossingDetector::new(store, index, &config).detect().len()
}

pub fn count_rtree(store: &SegmentStore, parallel: bool) -> usize {
    count_with(store, &store.build_index(), parallel)
}

pub fn count_grid(store: &SegmentStore, cell_size: f64, parallel: bool) -> usize {
    let index = store
        .build_grid_index(cell_size)
        .expect("cell size suits the network");
    count_with(store, &index, parallel)
}
