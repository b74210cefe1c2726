use std::{collections::HashSet, path::Path};

use log::{debug, info};

use crate::{
    error::{GradeError, Result},
    segment::SegmentId,
};

/// Ids of segments whose crossings were already reviewed, and are
/// left out of the exported rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownIds(HashSet<SegmentId>);

impl KnownIds {
    pub fn new<I: IntoIterator<Item = SegmentId>>(ids: I) -> Self {
        KnownIds(ids.into_iter().collect())
    }

    /// Read the first column of every CSV file in `dir`.
    ///
    /// Each file has a header row, which is skipped. A missing directory
    /// is an empty list.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            debug!("no known ids at {}", dir.display());
            return Ok(Self::default());
        }

        let pattern = dir.join("*");
        let mut ids = HashSet::new();
        for entry in glob::glob(&pattern.to_string_lossy())? {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if !path.is_file() {
                continue;
            }
            let before = ids.len();
            Self::read_file(&path, &mut ids)?;
            debug!("{}: {} ids", path.display(), ids.len() - before);
        }
        info!("{} known ids", ids.len());
        Ok(KnownIds(ids))
    }

    fn read_file(path: &Path, ids: &mut HashSet<SegmentId>) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        for (record, row) in reader.records().enumerate() {
            let row = row?;
            let value = match row.get(0).map(str::trim) {
                Some(value) if !value.is_empty() => value,
                _ => continue,
            };
            let id = value.parse().map_err(|_| GradeError::InvalidKnownId {
                path: path.to_path_buf(),
                record,
                value: value.to_string(),
            })?;
            ids.insert(id);
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, id: SegmentId) -> bool {
        self.0.contains(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let known = KnownIds::load_dir(&dir.path().join("nope")).unwrap();
        assert!(known.is_empty());
    }

    #[test]
    fn reads_first_column_of_every_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.csv"),
            "OSM_ID, LAT, LNG\n11, 1.0, 2.0\n\n12, 1.5, 2.5\n",
        )
        .unwrap();
        fs::write(dir.path().join("b.txt"), "id\n13\n 14 \n").unwrap();

        let known = KnownIds::load_dir(dir.path()).unwrap();
        assert_eq!(known.len(), 4);
        for id in [11, 12, 13, 14] {
            assert!(known.contains(id));
        }
        assert!(!known.contains(1));
    }

    #[test]
    fn header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "OSM_ID\n").unwrap();
        assert!(KnownIds::load_dir(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "OSM_ID\n12\nabc\n").unwrap();
        assert!(matches!(
            KnownIds::load_dir(dir.path()),
            Err(GradeError::InvalidKnownId { record: 1, .. })
        ));
    }
}
