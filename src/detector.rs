//! Classification of crossings between segments of different layers.
//!
//! For every eligible segment (the candidate "under" side) the
//! detector queries the spatial index for segments whose boxes overlap
//! it, keeps those on a strictly higher layer, and intersects the
//! exact geometries. The strict layer comparison is what keeps each
//! pair from being reported twice, and what keeps at-grade junctions
//! of same-layer roads out of the result.
use std::{fmt, time::Instant};

use geo::Coord;
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::{
    config::{DetectorConfig, IndexKind},
    error::Result,
    geometry::{IntersectionShape, PolylineIntersection},
    index::CandidateIndex,
    segment::{Segment, SegmentId},
    store::{SegmentKey, SegmentStore},
};

/// Annotation attached to a [`Crossing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossingComment {
    /// The upper segment is tagged as a bridge.
    Plain,
    /// The upper segment lacks a bridge tag. Such crossings are still
    /// reported.
    NotABridge,
    /// The point is one of several where the pair crosses.
    MultiplePoints,
}

impl CrossingComment {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossingComment::Plain => "",
            CrossingComment::NotABridge => "not a bridge",
            CrossingComment::MultiplePoints => "multiple intersection points",
        }
    }
}

impl fmt::Display for CrossingComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point where an eligible segment passes under a higher one.
#[derive(Debug, Clone, Copy)]
pub struct Crossing<'a> {
    pub point: Coord<f64>,
    /// The eligible, lower segment.
    pub under: &'a Segment,
    /// The segment on a strictly higher layer.
    pub over: &'a Segment,
    pub comment: CrossingComment,
}

/// A pair that intersects in something other than isolated points,
/// typically coincident geometry in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub under: SegmentId,
    pub over: SegmentId,
    pub under_category: String,
    pub over_category: String,
    /// Number of overlapping pieces.
    pub overlaps: usize,
}

/// Crossings and anomalies found while scanning one segment.
#[derive(Debug, Default)]
pub struct SegmentOutcome<'a> {
    pub crossings: Vec<Crossing<'a>>,
    pub anomalies: Vec<Anomaly>,
}

/// Append-only result of a detection run.
///
/// Crossings appear in discovery order: by store order of the lower
/// segment, then by candidate key, then by point.
#[derive(Debug, Default)]
pub struct Detection<'a> {
    crossings: Vec<Crossing<'a>>,
    anomalies: Vec<Anomaly>,
}

impl<'a> Detection<'a> {
    fn append(&mut self, mut outcome: SegmentOutcome<'a>) {
        self.crossings.append(&mut outcome.crossings);
        self.anomalies.append(&mut outcome.anomalies);
    }

    #[inline]
    pub fn crossings(&self) -> &[Crossing<'a>] {
        &self.crossings
    }

    #[inline]
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.crossings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.crossings.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Crossing<'a>>, Vec<Anomaly>) {
        (self.crossings, self.anomalies)
    }
}

impl<'a> FromIterator<SegmentOutcome<'a>> for Detection<'a> {
    fn from_iter<T: IntoIterator<Item = SegmentOutcome<'a>>>(iter: T) -> Self {
        let mut detection = Detection::default();
        for outcome in iter {
            detection.append(outcome);
        }
        detection
    }
}

/// Scans a [`SegmentStore`] for grade crossings using a prebuilt index.
///
/// The store and index are only read, so one detector can serve
/// many threads.
pub struct CrossingDetector<'s, 'i, I> {
    store: &'s SegmentStore,
    index: &'i I,
    config: &'i DetectorConfig,
}

impl<'s, 'i, I> CrossingDetector<'s, 'i, I>
where
    I: CandidateIndex<Key = SegmentKey>,
{
    /// Create a detector; `index` must have been built from `store`.
    pub fn new(store: &'s SegmentStore, index: &'i I, config: &'i DetectorConfig) -> Self {
        debug_assert_eq!(store.len(), index.len(), "index was built from another store");
        CrossingDetector {
            store,
            index,
            config,
        }
    }

    /// Scan all segments, sequentially or on the rayon pool as
    /// configured. Both modes give identical results.
    pub fn detect(&self) -> Detection<'s> {
        let start = Instant::now();
        let detection = if self.config.parallel {
            self.detect_parallel()
        } else {
            self.detect_sequential()
        };
        info!(
            "found {} crossings ({} anomalies) in {:.2} s",
            detection.crossings.len(),
            detection.anomalies.len(),
            start.elapsed().as_secs_f64()
        );
        detection
    }

    fn detect_sequential(&self) -> Detection<'s> {
        let store: &'s SegmentStore = self.store;
        let interval = self.config.progress_interval;
        store
            .segments()
            .iter()
            .enumerate()
            .map(|(n, segment)| {
                if interval > 0 && (n + 1) % interval == 0 {
                    info!("scanned {} of {} segments", n + 1, store.len());
                }
                self.detect_segment(segment)
            })
            .collect()
    }

    fn detect_parallel(&self) -> Detection<'s> {
        let store: &'s SegmentStore = self.store;
        // Indexed collect keeps store order across workers.
        let outcomes: Vec<_> = store
            .segments()
            .par_iter()
            .map(|segment| self.detect_segment(segment))
            .collect();
        outcomes.into_iter().collect()
    }

    /// Find the crossings where `under` passes beneath another segment.
    ///
    /// Returns an empty outcome for ineligible segments.
    pub fn detect_segment(&self, under: &'s Segment) -> SegmentOutcome<'s> {
        let mut outcome = SegmentOutcome::default();
        if !under.is_eligible() {
            return outcome;
        }

        let store: &'s SegmentStore = self.store;
        for key in self.index.query(under.bbox(), self.config.query_buffer) {
            let over = &store[key];
            if over.id() == under.id() || over.layer() <= under.layer() {
                continue;
            }
            classify_pair(under, over, &mut outcome);
        }
        outcome
    }
}

/// Intersect one candidate pair and record what it yields.
///
/// Requires `over.layer() > under.layer()`.
fn classify_pair<'s>(under: &'s Segment, over: &'s Segment, outcome: &mut SegmentOutcome<'s>) {
    let isec = PolylineIntersection::compute(under.line(), over.line());
    if !isec.intersects() {
        return;
    }
    if isec.touches(under.line(), over.line()) {
        trace!("{} only touches {}", under.id(), over.id());
        return;
    }

    let point = match isec.shape() {
        IntersectionShape::Empty => return,
        IntersectionShape::Point(p) => p,
        IntersectionShape::MultiPoint(points) => {
            // Shared end points are junction artifacts, not crossings.
            let (start, end) = under.endpoints();
            let interior: SmallVec<[Coord<f64>; 4]> = points
                .iter()
                .copied()
                .filter(|p| *p != start && *p != end)
                .collect();
            match interior.as_slice() {
                [] => return,
                [p] => *p,
                _ => {
                    debug!(
                        "{} crosses {} at {} points",
                        under.id(),
                        over.id(),
                        interior.len()
                    );
                    outcome
                        .crossings
                        .extend(interior.iter().map(|&point| Crossing {
                            point,
                            under,
                            over,
                            comment: CrossingComment::MultiplePoints,
                        }));
                    return;
                }
            }
        }
        IntersectionShape::Other { overlaps } => {
            warn!(
                "bad result for {}-{}: {} and {} overlap in {} piece(s)",
                under.category(),
                over.category(),
                under.id(),
                over.id(),
                overlaps
            );
            outcome.anomalies.push(Anomaly {
                under: under.id(),
                over: over.id(),
                under_category: under.category().to_string(),
                over_category: over.category().to_string(),
                overlaps,
            });
            return;
        }
    };

    let comment = if over.is_bridge() {
        CrossingComment::Plain
    } else {
        CrossingComment::NotABridge
    };
    outcome.crossings.push(Crossing {
        point,
        under,
        over,
        comment,
    });
}

/// Build the configured index over `store` and find all crossings.
///
/// This is the single entry point for one dataset. An invalid
/// configuration is reported before any index is built.
pub fn find_crossings<'s>(store: &'s SegmentStore, config: &DetectorConfig) -> Result<Detection<'s>> {
    config.validate()?;
    Ok(match config.index {
        IndexKind::RTree => {
            let index = store.build_index();
            CrossingDetector::new(store, &index, config).detect()
        }
        IndexKind::Grid { cell_size } => {
            let index = store.build_grid_index(cell_size)?;
            CrossingDetector::new(store, &index, config).detect()
        }
    })
}
