use super::InteractionMatrix;

/// Computes the square item-item cosine similarity matrix.
///
/// Entry (i, j) is `dot(a, b) / (‖a‖ · ‖b‖)` over the two items' rating
/// vectors, defined as 0.0 when either vector has zero norm (an item with no
/// ratings), so the result never contains NaN. The matrix is symmetric and
/// the diagonal is exactly 1.0 for items with at least one rating.
pub fn item_similarity(interactions: &InteractionMatrix) -> Vec<Vec<f64>> {
    let n = interactions.num_items();

    let norms: Vec<f64> = (0..n)
        .map(|i| {
            interactions
                .row(i)
                .iter()
                .map(|v| v * v)
                .sum::<f64>()
                .sqrt()
        })
        .collect();

    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        matrix[i][i] = if norms[i] > 0.0 { 1.0 } else { 0.0 };
        for j in (i + 1)..n {
            let sim = if norms[i] > 0.0 && norms[j] > 0.0 {
                let dot: f64 = interactions
                    .row(i)
                    .iter()
                    .zip(interactions.row(j))
                    .map(|(a, b)| a * b)
                    .sum();
                dot / (norms[i] * norms[j])
            } else {
                0.0
            };
            matrix[i][j] = sim;
            matrix[j][i] = sim;
        }
    }

    tracing::info!(num_items = n, "Computed item-item similarity matrix");
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;

    const EPS: f64 = 1e-10;

    fn matrix_for(data: &[(i64, i64, f64)]) -> Vec<Vec<f64>> {
        let ratings: Vec<Rating> = data
            .iter()
            .map(|&(u, m, r)| Rating::new(u, m, r))
            .collect();
        let interactions = InteractionMatrix::from_ratings(&ratings).unwrap();
        item_similarity(&interactions)
    }

    #[test]
    fn test_identical_vectors_have_unit_similarity() {
        // Items 10 and 20 rated identically by both users
        let sim = matrix_for(&[(1, 10, 4.0), (2, 10, 2.0), (1, 20, 4.0), (2, 20, 2.0)]);
        assert!((sim[0][1] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_orthogonal_vectors_have_zero_similarity() {
        // Disjoint rater sets
        let sim = matrix_for(&[(1, 10, 5.0), (2, 20, 5.0)]);
        assert!(sim[0][1].abs() < EPS);
    }

    #[test]
    fn test_diagonal_is_one() {
        let sim = matrix_for(&[(1, 10, 4.0), (1, 20, 3.0), (2, 20, 5.0)]);
        for (i, row) in sim.iter().enumerate() {
            assert_eq!(row[i], 1.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let sim = matrix_for(&[
            (1, 10, 4.0),
            (1, 20, 3.0),
            (2, 10, 2.0),
            (2, 30, 5.0),
            (3, 20, 4.5),
            (3, 30, 1.0),
        ]);
        for i in 0..sim.len() {
            for j in 0..sim.len() {
                assert_eq!(sim[i][j], sim[j][i]);
            }
        }
    }

    #[test]
    fn test_known_cosine_value() {
        // Item 10: [4, 3], item 20: [2, 0]
        // cos = (4*2) / (5 * 2) = 0.8
        let sim = matrix_for(&[(1, 10, 4.0), (2, 10, 3.0), (1, 20, 2.0)]);
        assert!((sim[0][1] - 0.8).abs() < EPS);
    }
}
