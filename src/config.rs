//! Configuration of the crossing detector.
use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result};

/// Which spatial index to build over the segments.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IndexKind {
    /// Bulk-loaded R-tree.
    #[default]
    RTree,
    /// Uniform grid with square cells of the given size, in dataset
    /// units. Works well when the cell size is tuned to segment density.
    Grid { cell_size: f64 },
}

/// Settings for one detection run.
///
/// Which segments may be the lower side of a crossing is not
/// configurable; see [`Segment::is_eligible`](crate::Segment::is_eligible).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Expansion of every candidate query box, in dataset units.
    /// Zero finds exactly the candidates whose boxes overlap.
    pub query_buffer: f64,
    pub index: IndexKind,
    /// Scan segments on the rayon thread pool.
    pub parallel: bool,
    /// Log progress every this many scanned segments (0 disables).
    /// Only honoured by sequential scans.
    pub progress_interval: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            query_buffer: 0.,
            index: IndexKind::RTree,
            parallel: false,
            progress_interval: 10_000,
        }
    }
}

impl DetectorConfig {
    /// Read a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a detection run would otherwise panic on.
    pub fn validate(&self) -> Result<()> {
        if !(self.query_buffer.is_finite() && self.query_buffer >= 0.) {
            return Err(GradeError::InvalidQueryBuffer(self.query_buffer));
        }
        if let IndexKind::Grid { cell_size } = self.index {
            if !(cell_size.is_finite() && cell_size > 0.) {
                return Err(GradeError::InvalidCellSize(cell_size));
            }
        }
        Ok(())
    }
}
