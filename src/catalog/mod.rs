use std::fs;
use std::path::Path;

use crate::models::{CatalogEntry, MovieId};

/// Startup artifact failures. All of these are fatal: the process must not
/// serve queries over a missing or misaligned catalog.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed feature matrix: {0}")]
    Malformed(String),

    #[error("catalog/matrix row mismatch: catalog has {catalog} rows, matrix has {matrix}")]
    RowMismatch { catalog: usize, matrix: usize },

    #[error("catalog artifact is empty")]
    Empty,
}

/// Immutable in-memory catalog, loaded once at startup.
///
/// Row order is significant: entry i corresponds to row i of the feature
/// matrix. The store is never mutated after load, so shared references are
/// safe across request handlers.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    entries: Vec<CatalogEntry>,
}

impl CatalogStore {
    /// Loads the catalog artifact: an ordered JSON array of `{id, title}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        Self::from_entries(entries)
    }

    /// Builds a store from already-materialized entries.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, LoadError> {
        if entries.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, row: usize) -> &CatalogEntry {
        &self.entries[row]
    }

    pub fn title_at(&self, row: usize) -> &str {
        &self.entries[row].title
    }

    pub fn id_at(&self, row: usize) -> MovieId {
        self.entries[row].id
    }

    /// Exact lookup by lowercased title. Titles are not guaranteed unique;
    /// the first row in catalog order wins.
    pub fn row_index_of(&self, title_lowercase: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.title.to_lowercase() == title_lowercase)
    }

    /// Lowercased snapshot of every title, in row order. Used to build the
    /// fuzzy resolver once at startup.
    pub fn titles_lowercase(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.title.to_lowercase()).collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_entries() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry {
                id: MovieId(10),
                title: "Avengers".to_string(),
            },
            CatalogEntry {
                id: MovieId(20),
                title: "Cars".to_string(),
            },
            CatalogEntry {
                id: MovieId(30),
                title: "Cars".to_string(),
            },
        ]
    }

    #[test]
    fn test_load_from_artifact() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 10, "title": "Avengers"}}, {{"id": 20, "title": "Cars"}}]"#
        )
        .unwrap();

        let store = CatalogStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.title_at(0), "Avengers");
        assert_eq!(store.id_at(1), MovieId(20));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CatalogStore::load("/nonexistent/catalog.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_corrupt_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();

        let err = CatalogStore::load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = CatalogStore::from_entries(Vec::new()).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn test_row_index_of_is_case_normalized_and_first_wins() {
        let store = CatalogStore::from_entries(sample_entries()).unwrap();
        assert_eq!(store.row_index_of("avengers"), Some(0));
        // duplicate titles resolve to the first row in catalog order
        assert_eq!(store.row_index_of("cars"), Some(1));
        assert_eq!(store.row_index_of("unknown"), None);
    }

    #[test]
    fn test_titles_lowercase_preserves_row_order() {
        let store = CatalogStore::from_entries(sample_entries()).unwrap();
        assert_eq!(store.titles_lowercase(), vec!["avengers", "cars", "cars"]);
    }
}
