use geo::Rect;
use itertools::Itertools;
use rstar::{RTree, RTreeObject, AABB};

use super::{buffered, CandidateIndex};

/// A key with its box, as stored in the tree.
#[derive(Debug, Clone, Copy)]
struct IndexedBox<K> {
    key: K,
    envelope: AABB<[f64; 2]>,
}

impl<K> RTreeObject for IndexedBox<K> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

#[inline]
fn envelope(bbox: Rect<f64>) -> AABB<[f64; 2]> {
    let (min, max) = (bbox.min(), bbox.max());
    AABB::from_corners([min.x, min.y], [max.x, max.y])
}

/// Collects boxes for a [`SpatialIndex`].
#[derive(Debug, Clone)]
pub struct SpatialIndexBuilder<K> {
    boxes: Vec<IndexedBox<K>>,
}

impl<K> Default for SpatialIndexBuilder<K> {
    fn default() -> Self {
        Self { boxes: vec![] }
    }
}

impl<K: Copy + Ord + Send + Sync> SpatialIndexBuilder<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            boxes: Vec::with_capacity(capacity),
        }
    }

    /// Record the bounding box of `key`.
    pub fn insert(&mut self, key: K, bbox: Rect<f64>) {
        self.boxes.push(IndexedBox {
            key,
            envelope: envelope(bbox),
        });
    }

    /// Bulk-load the recorded boxes into an R-tree.
    pub fn build(self) -> SpatialIndex<K> {
        SpatialIndex {
            tree: RTree::bulk_load(self.boxes),
        }
    }
}

/// Immutable R-tree over bounding boxes.
///
/// Queries cost `O(log n + k)` for `k` results.
pub struct SpatialIndex<K> {
    tree: RTree<IndexedBox<K>>,
}

impl<K: Copy + Ord + Send + Sync> CandidateIndex for SpatialIndex<K> {
    type Key = K;

    fn query(&self, bbox: Rect<f64>, buffer: f64) -> Vec<K> {
        let search = envelope(buffered(bbox, buffer));
        self.tree
            .locate_in_envelope_intersecting(&search)
            .map(|b| b.key)
            .sorted()
            .dedup()
            .collect()
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}
