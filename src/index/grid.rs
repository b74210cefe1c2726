use std::collections::HashMap;

use geo::Rect;
use itertools::Itertools;

use super::{buffered, overlaps, CandidateIndex};
use crate::error::{GradeError, Result};

type Cell = (i64, i64);

/// Most cells a single box may cover.
pub const MAX_CELLS_PER_BOX: usize = 1 << 16;

/// Cell coordinates beyond this magnitude are not exactly representable.
const MAX_CELL_COORD: f64 = (1u64 << 53) as f64;

/// Collects boxes for a [`GridIndex`].
#[derive(Debug, Clone)]
pub struct GridIndexBuilder<K> {
    cell_size: f64,
    entries: Vec<(K, Rect<f64>)>,
}

impl<K: Copy + Ord + Send + Sync> GridIndexBuilder<K> {
    /// Create a builder for square cells of `cell_size`.
    pub fn new(cell_size: f64) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.) {
            return Err(GradeError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            entries: vec![],
        })
    }

    /// Record the bounding box of `key`.
    pub fn insert(&mut self, key: K, bbox: Rect<f64>) {
        self.entries.push((key, bbox));
    }

    /// Register every box in each cell its extent covers.
    ///
    /// Fails if a box covers more than [`MAX_CELLS_PER_BOX`] cells,
    /// which means the cell size is far too small for the data.
    pub fn build(self) -> Result<GridIndex<K>> {
        let mut cells: HashMap<Cell, Vec<usize>> = HashMap::new();
        let mut extent: Option<(Cell, Cell)> = None;
        for (pos, (_, bbox)) in self.entries.iter().enumerate() {
            let (lo, hi) = covered_cells(self.cell_size, bbox)?;
            for cx in lo.0..=hi.0 {
                for cy in lo.1..=hi.1 {
                    cells.entry((cx, cy)).or_default().push(pos);
                }
            }
            extent = Some(match extent {
                None => (lo, hi),
                Some((elo, ehi)) => (
                    (elo.0.min(lo.0), elo.1.min(lo.1)),
                    (ehi.0.max(hi.0), ehi.1.max(hi.1)),
                ),
            });
        }
        log::debug!(
            "grid index: {} boxes in {} cells of size {}",
            self.entries.len(),
            cells.len(),
            self.cell_size
        );
        Ok(GridIndex {
            cell_size: self.cell_size,
            entries: self.entries,
            cells,
            extent,
        })
    }
}

/// Immutable uniform grid over bounding boxes.
///
/// Simpler than the R-tree; query cost depends on how well the cell
/// size matches the segment density.
pub struct GridIndex<K> {
    cell_size: f64,
    entries: Vec<(K, Rect<f64>)>,
    cells: HashMap<Cell, Vec<usize>>,
    /// Lowest and highest occupied cell, if any.
    extent: Option<(Cell, Cell)>,
}

impl<K> GridIndex<K> {
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }
}

impl<K: Copy + Ord + Send + Sync> CandidateIndex for GridIndex<K> {
    type Key = K;

    fn query(&self, bbox: Rect<f64>, buffer: f64) -> Vec<K> {
        let search = buffered(bbox, buffer);
        let (elo, ehi) = match self.extent {
            Some(extent) => extent,
            None => return vec![],
        };
        let (lo, hi) = cell_range(self.cell_size, &search);
        let (lo, hi) = (
            (lo.0.max(elo.0), lo.1.max(elo.1)),
            (hi.0.min(ehi.0), hi.1.min(ehi.1)),
        );
        if lo.0 > hi.0 || lo.1 > hi.1 {
            return vec![];
        }

        // Both ranges lie inside the extent, so the widths cannot overflow.
        let span = ((hi.0 - lo.0) as u64 + 1).saturating_mul((hi.1 - lo.1) as u64 + 1);
        let mut positions = vec![];
        if span > self.cells.len() as u64 {
            for ((cx, cy), cell) in &self.cells {
                if (lo.0..=hi.0).contains(cx) && (lo.1..=hi.1).contains(cy) {
                    positions.extend_from_slice(cell);
                }
            }
        } else {
            for cx in lo.0..=hi.0 {
                for cy in lo.1..=hi.1 {
                    if let Some(cell) = self.cells.get(&(cx, cy)) {
                        positions.extend_from_slice(cell);
                    }
                }
            }
        }
        positions
            .into_iter()
            .filter(|&pos| overlaps(&self.entries[pos].1, &search))
            .map(|pos| self.entries[pos].0)
            .sorted()
            .dedup()
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[inline]
fn cell_of(cell_size: f64, x: f64, y: f64) -> Cell {
    ((x / cell_size).floor() as i64, (y / cell_size).floor() as i64)
}

/// Lowest and highest cell touched by `bbox`. Saturates far outside
/// the representable range; queries clamp the result to the extent.
#[inline]
fn cell_range(cell_size: f64, bbox: &Rect<f64>) -> (Cell, Cell) {
    let (min, max) = (bbox.min(), bbox.max());
    (
        cell_of(cell_size, min.x, min.y),
        cell_of(cell_size, max.x, max.y),
    )
}

/// Like [`cell_range`], but checked for boxes being inserted.
fn covered_cells(cell_size: f64, bbox: &Rect<f64>) -> Result<(Cell, Cell)> {
    let (min, max) = (bbox.min(), bbox.max());
    let lo = ((min.x / cell_size).floor(), (min.y / cell_size).floor());
    let hi = ((max.x / cell_size).floor(), (max.y / cell_size).floor());
    let representable = [lo.0, lo.1, hi.0, hi.1]
        .iter()
        .all(|c| c.abs() < MAX_CELL_COORD);
    let cells = if representable {
        (hi.0 - lo.0 + 1.) * (hi.1 - lo.1 + 1.)
    } else {
        f64::INFINITY
    };
    if cells > MAX_CELLS_PER_BOX as f64 {
        return Err(GradeError::GridTooFine {
            cell_size,
            cells,
            limit: MAX_CELLS_PER_BOX,
        });
    }
    Ok(cell_range(cell_size, bbox))
}
