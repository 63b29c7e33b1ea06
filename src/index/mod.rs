use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::catalog::LoadError;

/// Immutable CSR sparse matrix holding one weighted term-frequency vector per
/// catalog row. Column indices within a row must be strictly ascending; the
/// loader enforces this so dot products can merge-join.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f32>,
}

/// On-disk shape of the feature matrix artifact.
#[derive(Debug, Deserialize)]
struct SparseMatrixArtifact {
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f32>,
}

impl SparseMatrix {
    /// Loads and validates the feature matrix artifact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: SparseMatrixArtifact =
            serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        Self::from_parts(
            artifact.cols,
            artifact.indptr,
            artifact.indices,
            artifact.data,
        )
    }

    /// Builds a matrix from raw CSR components, validating their shape.
    pub fn from_parts(
        cols: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f32>,
    ) -> Result<Self, LoadError> {
        if indptr.is_empty() || indptr[0] != 0 {
            return Err(LoadError::Malformed(
                "indptr must start with 0".to_string(),
            ));
        }
        if indices.len() != data.len() {
            return Err(LoadError::Malformed(format!(
                "indices/data length mismatch: {} vs {}",
                indices.len(),
                data.len()
            )));
        }
        if *indptr.last().unwrap() != indices.len() {
            return Err(LoadError::Malformed(format!(
                "indptr end {} does not match {} stored values",
                indptr.last().unwrap(),
                indices.len()
            )));
        }
        for window in indptr.windows(2) {
            if window[1] < window[0] || window[1] > indices.len() {
                return Err(LoadError::Malformed(
                    "indptr must be non-decreasing and within bounds".to_string(),
                ));
            }
            let row = &indices[window[0]..window[1]];
            if !row.windows(2).all(|w| w[0] < w[1]) {
                return Err(LoadError::Malformed(
                    "column indices must be strictly ascending within a row".to_string(),
                ));
            }
        }
        if indices.iter().any(|&c| c >= cols) {
            return Err(LoadError::Malformed(format!(
                "column index out of bounds (cols = {})",
                cols
            )));
        }

        Ok(Self {
            cols,
            indptr,
            indices,
            data,
        })
    }

    /// Builds a matrix from dense rows. Intended for tests and small fixtures.
    pub fn from_dense(rows: &[Vec<f32>]) -> Result<Self, LoadError> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut indptr = vec![0];
        let mut indices = Vec::new();
        let mut data = Vec::new();

        for row in rows {
            if row.len() != cols {
                return Err(LoadError::Malformed(
                    "dense rows must share a column count".to_string(),
                ));
            }
            for (col, &value) in row.iter().enumerate() {
                if value != 0.0 {
                    indices.push(col);
                    data.push(value);
                }
            }
            indptr.push(indices.len());
        }

        Self::from_parts(cols, indptr, indices, data)
    }

    pub fn rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Sparse view of one row as parallel (indices, values) slices.
    pub fn row(&self, i: usize) -> (&[usize], &[f32]) {
        let (start, end) = (self.indptr[i], self.indptr[i + 1]);
        (&self.indices[start..end], &self.data[start..end])
    }

    /// Dot product of two rows via merge join over sorted column indices.
    fn dot(&self, a: usize, b: usize) -> f32 {
        let (a_idx, a_val) = self.row(a);
        let (b_idx, b_val) = self.row(b);

        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < a_idx.len() && j < b_idx.len() {
            match a_idx[i].cmp(&b_idx[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_val[i] * b_val[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn norm(&self, i: usize) -> f32 {
        let (_, values) = self.row(i);
        values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }
}

/// Read-only nearest-neighbor structure over the feature matrix.
///
/// Built eagerly at startup; row norms are precomputed so each query is a
/// single scan of the matrix. Cosine distance = 1 - cosine similarity,
/// in [0, 2]; rows with zero norm get similarity 0, i.e. distance 1.0.
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    matrix: SparseMatrix,
    norms: Vec<f32>,
}

impl NeighborIndex {
    pub fn new(matrix: SparseMatrix) -> Self {
        let norms = (0..matrix.rows()).map(|i| matrix.norm(i)).collect();
        Self { matrix, norms }
    }

    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    /// Cosine distance between two rows.
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        let denom = self.norms[a] * self.norms[b];
        if denom == 0.0 {
            return 1.0;
        }
        (1.0 - self.matrix.dot(a, b) / denom).clamp(0.0, 2.0)
    }

    /// Returns up to k nearest neighbors of `row`, self excluded, ordered by
    /// ascending distance. Distance ties break by ascending row index.
    pub fn k_nearest(&self, row: usize, k: usize) -> Vec<(usize, f32)> {
        let mut neighbors: Vec<(usize, f32)> = (0..self.rows())
            .filter(|&other| other != row)
            .map(|other| (other, self.distance(row, other)))
            .collect();

        neighbors.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        neighbors.truncate(k);
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn index_from_dense(rows: &[Vec<f32>]) -> NeighborIndex {
        NeighborIndex::new(SparseMatrix::from_dense(rows).unwrap())
    }

    #[test]
    fn test_load_artifact_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"cols": 3, "indptr": [0, 2, 3], "indices": [0, 2, 1], "data": [1.0, 2.0, 3.0]}}"#
        )
        .unwrap();

        let matrix = SparseMatrix::load(file.path()).unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.cols(), 3);
        assert_eq!(matrix.row(0), (&[0usize, 2][..], &[1.0f32, 2.0][..]));
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let err = SparseMatrix::load("/nonexistent/features.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_from_parts_rejects_bad_indptr() {
        let err = SparseMatrix::from_parts(2, vec![0, 2, 1], vec![0, 1], vec![1.0, 1.0]);
        assert!(matches!(err, Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_from_parts_rejects_out_of_bounds_column() {
        let err = SparseMatrix::from_parts(2, vec![0, 1], vec![5], vec![1.0]);
        assert!(matches!(err, Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_from_parts_rejects_length_mismatch() {
        let err = SparseMatrix::from_parts(2, vec![0, 2], vec![0, 1], vec![1.0]);
        assert!(matches!(err, Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_distance_identical_and_orthogonal() {
        let index = index_from_dense(&[
            vec![1.0, 0.0],
            vec![2.0, 0.0], // same direction as row 0
            vec![0.0, 1.0], // orthogonal to row 0
        ]);

        assert!(index.distance(0, 1).abs() < 1e-6);
        assert!((index.distance(0, 2) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_norm_row_gets_distance_one() {
        let index = index_from_dense(&[vec![1.0, 0.0], vec![0.0, 0.0]]);
        assert!((index.distance(0, 1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_k_nearest_excludes_self_and_orders_ascending() {
        let index = index_from_dense(&[
            vec![1.0, 0.0, 0.0],
            vec![1.0, 0.5, 0.0],
            vec![1.0, 0.1, 0.0],
            vec![0.0, 1.0, 0.0],
        ]);

        let neighbors = index.k_nearest(0, 3);
        let rows: Vec<usize> = neighbors.iter().map(|(r, _)| *r).collect();
        assert_eq!(rows, vec![2, 1, 3]);
        assert!(neighbors.iter().all(|&(r, _)| r != 0));
        assert!(neighbors.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_k_nearest_caps_at_k() {
        let index = index_from_dense(&[
            vec![1.0, 0.0],
            vec![1.0, 0.1],
            vec![1.0, 0.2],
            vec![1.0, 0.3],
        ]);
        assert_eq!(index.k_nearest(0, 2).len(), 2);
    }

    #[test]
    fn test_k_nearest_with_fewer_rows_than_k() {
        let index = index_from_dense(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let neighbors = index.k_nearest(0, 10);
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].0, 1);
    }

    #[test]
    fn test_k_nearest_breaks_distance_ties_by_row_index() {
        // rows 1, 2 and 3 are identical, so they are exactly equidistant
        // from row 0
        let index = index_from_dense(&[
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        ]);

        let neighbors = index.k_nearest(0, 3);
        let rows: Vec<usize> = neighbors.iter().map(|(r, _)| *r).collect();
        assert_eq!(rows, vec![1, 2, 3]);
    }
}
