use crate::utils::cosine_similarity;
use crate::vector::VectorTable;
use ndarray::ArrayView1;

/// Exhaustive cosine scan over every row of a vector table.
pub struct BruteForceIndex<'a> {
    vectors: &'a VectorTable,
}

impl<'a> BruteForceIndex<'a> {
    pub fn new(vectors: &'a VectorTable) -> Self {
        Self { vectors }
    }

    /// Similarity of `query` against every row, in row order.
    pub fn scores(&self, query: ArrayView1<'_, f32>) -> Vec<f32> {
        self.vectors
            .rows()
            .map(|row| cosine_similarity(query, row))
            .collect()
    }

    /// Every row as `(position, score)`, best first. Equal scores keep row order.
    pub fn rank(&self, query: ArrayView1<'_, f32>) -> Vec<(usize, f32)> {
        let mut results: Vec<(usize, f32)> = self.scores(query).into_iter().enumerate().collect();

        // stable sort: ties stay in corpus order. Scores are finite and
        // never negative zero, so total_cmp agrees with numeric equality.
        results.sort_by(|a, b| b.1.total_cmp(&a.1));
        results
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn ranks_by_descending_similarity() {
        let table = VectorTable::from_rows(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ])
        .unwrap();
        let index = BruteForceIndex::new(&table);

        let ranked = index.rank(arr1(&[1.0, 0.1]).view());
        let order: Vec<usize> = ranked.iter().map(|(pos, _)| *pos).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert!(ranked[0].1 >= ranked[1].1 && ranked[1].1 >= ranked[2].1);
    }

    #[test]
    fn ties_keep_row_order() {
        let table = VectorTable::from_rows(vec![
            vec![0.0, 5.0],
            vec![2.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 3.0],
        ])
        .unwrap();
        let index = BruteForceIndex::new(&table);

        let order: Vec<usize> = index
            .rank(arr1(&[0.0, 1.0]).view())
            .into_iter()
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(order, vec![0, 2, 4, 1, 3]);
    }

    #[test]
    fn duplicates_of_huge_vectors_rank_first() {
        let table = VectorTable::from_rows(vec![
            vec![1e20, 0.0],
            vec![0.0, 1.0],
            vec![1e20, 0.0],
        ])
        .unwrap();
        let index = BruteForceIndex::new(&table);

        let ranked = index.rank(table.row(0).unwrap());
        assert_eq!(ranked, vec![(0, 1.0), (2, 1.0), (1, 0.0)]);
    }

    #[test]
    fn zero_query_scores_zero_everywhere() {
        let table = VectorTable::from_rows(vec![vec![1.0, 2.0], vec![0.0, 0.0]]).unwrap();
        let index = BruteForceIndex::new(&table);
        assert_eq!(index.scores(arr1(&[0.0, 0.0]).view()), vec![0.0, 0.0]);
    }
}
