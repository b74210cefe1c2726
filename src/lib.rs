//! Finds grade crossings in road and rail networks: places where an
//! eligible road passes under a segment on a strictly higher layer.
//!
//! 1. [Segments](#segments)
//! 1. [Detection](#detection)
//! 1. [Datasets](#datasets)
//!
//! # Segments
//!
//! A [`Segment`] is a polyline with an id, a category (such as
//! `primary` or `rail`), a vertical layer and a bridge flag. Segments
//! are collected into a [`SegmentStore`], which assigns each one a
//! dense [`SegmentKey`] and rejects duplicate ids.
//!
//! # Detection
//!
//! Candidate pairs come from a bounding-box index implementing
//! [`CandidateIndex`]: a bulk-loaded R-tree ([`SpatialIndex`]) by
//! default, or a uniform grid ([`GridIndex`]). Each candidate pair is
//! then intersected exactly with [`PolylineIntersection`], and the
//! shape of the intersection decides whether it is a crossing, a mere
//! touch, or an [`Anomaly`].
//!
//! ## Usage
//!
//! ```rust
//! use grade_crossings::{find_crossings, DetectorConfig, Segment, SegmentStore};
//!
//! let store = SegmentStore::new(vec![
//!     Segment::new(1, vec![(0., 0.), (10., 0.)], "primary", 0, false).unwrap(),
//!     Segment::new(2, vec![(5., -5.), (5., 5.)], "primary", 1, true).unwrap(),
//! ])
//! .unwrap();
//! let detection = find_crossings(&store, &DetectorConfig::default()).unwrap();
//! assert_eq!(detection.len(), 1);
//! assert_eq!(detection.crossings()[0].under.id(), 1);
//! ```
//!
//! # Datasets
//!
//! The [`io`] module reads GeoJSON datasets and writes results as CSV
//! or GeoJSON points. The [`driver`] module processes a directory of
//! datasets in one batch.
mod error;
pub use error::{GradeError, Result};

mod lex_point;
pub use lex_point::LexPoint;

mod line_or_point;
pub use line_or_point::LineOrPoint;

mod geometry;
pub use geometry::{IntersectionShape, PolylineIntersection};

mod segment;
pub use segment::{Segment, SegmentId, ELIGIBLE_CATEGORIES};

mod config;
pub use config::{DetectorConfig, IndexKind};

pub mod index;
pub use index::{CandidateIndex, GridIndex, GridIndexBuilder, SpatialIndex, SpatialIndexBuilder};

mod store;
pub use store::{SegmentKey, SegmentStore};

mod detector;
pub use detector::{
    find_crossings, Anomaly, Crossing, CrossingComment, CrossingDetector, Detection,
    SegmentOutcome,
};

pub mod io;

pub mod driver;

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub mod random;
