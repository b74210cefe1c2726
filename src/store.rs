use std::{collections::HashMap, ops::Index};

use log::info;

use crate::{
    error::{GradeError, Result},
    index::{GridIndex, GridIndexBuilder, SpatialIndex, SpatialIndexBuilder},
    segment::{Segment, SegmentId},
};

/// Position of a segment in its [`SegmentStore`]; doubles as the
/// spatial index key.
pub type SegmentKey = usize;

/// Immutable arena of the segments of one dataset.
///
/// Segments keep their insertion order, which is also the order in
/// which the detector scans them.
#[derive(Debug, Clone, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
    by_id: HashMap<SegmentId, SegmentKey>,
}

impl SegmentStore {
    /// Store `segments`, rejecting duplicate ids.
    pub fn new<I: IntoIterator<Item = Segment>>(segments: I) -> Result<Self> {
        let segments: Vec<_> = segments.into_iter().collect();
        let mut by_id = HashMap::with_capacity(segments.len());
        for (key, segment) in segments.iter().enumerate() {
            if by_id.insert(segment.id(), key).is_some() {
                return Err(GradeError::DuplicateId(segment.id()));
            }
        }
        Ok(SegmentStore { segments, by_id })
    }

    /// Store the roads followed by the rails. Both streams share one
    /// id space.
    pub fn from_streams<R, S>(roads: R, rails: S) -> Result<Self>
    where
        R: IntoIterator<Item = Segment>,
        S: IntoIterator<Item = Segment>,
    {
        Self::new(roads.into_iter().chain(rails))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn get(&self, key: SegmentKey) -> Option<&Segment> {
        self.segments.get(key)
    }

    /// Look up a segment by id.
    pub fn by_id(&self, id: SegmentId) -> Option<&Segment> {
        self.key_of(id).map(|key| &self.segments[key])
    }

    #[inline]
    pub fn key_of(&self, id: SegmentId) -> Option<SegmentKey> {
        self.by_id.get(&id).copied()
    }

    /// All segments in store order.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> impl Iterator<Item = (SegmentKey, &Segment)> {
        self.segments.iter().enumerate()
    }

    /// Build an R-tree over the boxes of all segments.
    pub fn build_index(&self) -> SpatialIndex<SegmentKey> {
        let mut builder = SpatialIndexBuilder::with_capacity(self.len());
        for (key, segment) in self.iter() {
            builder.insert(key, segment.bbox());
        }
        info!("building R-tree over {} segments", self.len());
        builder.build()
    }

    /// Build a uniform grid over the boxes of all segments.
    pub fn build_grid_index(&self, cell_size: f64) -> Result<GridIndex<SegmentKey>> {
        let mut builder = GridIndexBuilder::new(cell_size)?;
        for (key, segment) in self.iter() {
            builder.insert(key, segment.bbox());
        }
        info!(
            "building grid over {} segments (cell size {})",
            self.len(),
            cell_size
        );
        builder.build()
    }
}

impl Index<SegmentKey> for SegmentStore {
    type Output = Segment;

    #[inline]
    fn index(&self, key: SegmentKey) -> &Segment {
        &self.segments[key]
    }
}
