use crate::{RecommenderError, Result};
use ndarray::{Array2, ArrayView1};
use serde::Serialize;

/// Fixed-length vectors, one row per article, in corpus load order.
/// Built only through `from_array`/`from_rows`, which reject non-finite values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorTable {
    data: Array2<f32>,
}

impl VectorTable {
    pub fn from_array(data: Array2<f32>) -> Result<Self> {
        if let Some((row, _)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(RecommenderError::LoadError(format!(
                "vector {} contains a non-finite value",
                row.0
            )));
        }
        Ok(Self { data })
    }

    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = rows.first().map_or(0, Vec::len);
        if let Some(position) = rows.iter().position(|row| row.len() != dimension) {
            return Err(RecommenderError::LoadError(format!(
                "vector {} has {} components, expected {}",
                position,
                rows[position].len(),
                dimension
            )));
        }

        let count = rows.len();
        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((count, dimension), flat)
            .map_err(|e| RecommenderError::LoadError(format!("Invalid vector table shape: {}", e)))?;
        Self::from_array(data)
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    pub fn dimension(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, position: usize) -> Option<ArrayView1<'_, f32>> {
        (position < self.len()).then(|| self.data.row(position))
    }

    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, f32>> {
        self.data.rows().into_iter()
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_rows() {
        let table = VectorTable::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.dimension(), 2);
        assert_eq!(table.row(1).unwrap().to_vec(), vec![3.0, 4.0]);
        assert!(table.row(3).is_none());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = VectorTable::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, RecommenderError::LoadError(_)));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = VectorTable::from_rows(vec![vec![1.0, f32::NAN]]).unwrap_err();
        assert!(matches!(err, RecommenderError::LoadError(_)));
    }

    #[test]
    fn empty_table() {
        let table = VectorTable::from_rows(Vec::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.dimension(), 0);
    }
}
