use ndarray::ArrayView1;

fn dot_f64(v1: ArrayView1<'_, f32>, v2: ArrayView1<'_, f32>) -> f64 {
    v1.iter().zip(v2.iter()).map(|(a, b)| *a as f64 * *b as f64).sum()
}

/// Cosine of the angle between `v1` and `v2`; 0 when either has zero norm.
///
/// Accumulates in `f64`: squares of any finite `f32`, subnormals included,
/// neither overflow nor flush to zero there.
pub fn cosine_similarity(v1: ArrayView1<'_, f32>, v2: ArrayView1<'_, f32>) -> f32 {
    let dot_product = dot_f64(v1, v2);
    let norm1 = dot_f64(v1, v1).sqrt();
    let norm2 = dot_f64(v2, v2).sqrt();

    if norm1 == 0.0 || norm2 == 0.0 {
        0.0
    } else {
        // + 0.0 folds a negative zero into 0.0
        (dot_product / (norm1 * norm2)) as f32 + 0.0
    }
}

/// Rounds for display only; stored scores keep full precision.
pub fn round_score(score: f32, places: u32) -> f32 {
    let factor = 10f32.powi(places as i32);
    (score * factor).round() / factor
}

pub fn generate_random_vectors(dim: usize, num: usize) -> Vec<Vec<f32>> {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    (0..num)
        .map(|_| (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn perpendicular_vectors_score_zero() {
        let v1 = arr1(&[1.0, 0.0, 0.0]);
        let v2 = arr1(&[0.0, 1.0, 0.0]);
        assert_eq!(cosine_similarity(v1.view(), v2.view()), 0.0);
    }

    #[test]
    fn magnitude_does_not_matter() {
        let v1 = arr1(&[1.0, 2.0, 3.0]);
        let v2 = arr1(&[10.0, 20.0, 30.0]);
        assert!((cosine_similarity(v1.view(), v2.view()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let v1 = arr1(&[1.0, -2.0]);
        let v2 = arr1(&[-1.0, 2.0]);
        assert!((cosine_similarity(v1.view(), v2.view()) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_norm_scores_zero() {
        let zero = arr1(&[0.0, 0.0]);
        let other = arr1(&[3.0, 4.0]);
        assert_eq!(cosine_similarity(zero.view(), other.view()), 0.0);
        assert_eq!(cosine_similarity(zero.view(), zero.view()), 0.0);
    }

    #[test]
    fn extreme_magnitudes_keep_self_similarity() {
        let big = arr1(&[1e20, 1e20]);
        let tiny = arr1(&[1e-25, 0.0]);
        let subnormal = arr1(&[f32::from_bits(1), 0.0]);

        assert_eq!(cosine_similarity(big.view(), big.view()), 1.0);
        assert_eq!(cosine_similarity(tiny.view(), tiny.view()), 1.0);
        assert_eq!(cosine_similarity(subnormal.view(), subnormal.view()), 1.0);
        assert!((cosine_similarity(big.view(), tiny.view()) - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);

        let max = arr1(&[f32::MAX, -f32::MAX, f32::MAX]);
        assert_eq!(cosine_similarity(max.view(), max.view()), 1.0);
    }

    #[test]
    fn orthogonal_negative_components_score_positive_zero() {
        let v1 = arr1(&[-1.0, 0.0]);
        let v2 = arr1(&[0.0, -1.0]);
        let score = cosine_similarity(v1.view(), v2.view());
        assert_eq!(score, 0.0);
        assert!(score.is_sign_positive());
    }

    #[test]
    fn rounds_for_display() {
        assert_eq!(round_score(0.123456, 4), 0.1235);
        assert_eq!(round_score(1.0, 4), 1.0);
    }
}
