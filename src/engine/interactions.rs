use std::collections::{BTreeSet, HashMap};

use crate::error::{AppError, AppResult};
use crate::models::{MovieId, Rating, UserId};

/// Item-by-user interaction matrix.
///
/// Row i holds the ratings item i received from every user observed in the
/// input, 0.0 where the user did not rate it. Rows are ordered by ascending
/// movie id; `movie_ids` is the canonical item index mapping row position
/// back to movie id.
#[derive(Debug, Clone)]
pub struct InteractionMatrix {
    rows: Vec<Vec<f64>>,
    movie_ids: Vec<MovieId>,
    num_users: usize,
}

impl InteractionMatrix {
    /// Pivots rating triples into the item-by-user matrix.
    ///
    /// Duplicate (user, movie) pairs are aggregated by mean so the result is
    /// independent of input order. An empty input cannot produce a usable
    /// model and fails with [`AppError::DataIntegrity`].
    pub fn from_ratings(ratings: &[Rating]) -> AppResult<Self> {
        if ratings.is_empty() {
            return Err(AppError::DataIntegrity(
                "no ratings available to build the interaction matrix".to_string(),
            ));
        }

        let movie_ids: Vec<MovieId> = ratings
            .iter()
            .map(|r| r.movie_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let user_ids: Vec<UserId> = ratings
            .iter()
            .map(|r| r.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let movie_index: HashMap<MovieId, usize> = movie_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();
        let user_index: HashMap<UserId, usize> = user_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        // (sum, count) per cell so duplicates average out
        let mut cells: HashMap<(usize, usize), (f64, u32)> = HashMap::new();
        for rating in ratings {
            let item = movie_index[&rating.movie_id];
            let user = user_index[&rating.user_id];
            let cell = cells.entry((item, user)).or_insert((0.0, 0));
            cell.0 += rating.rating;
            cell.1 += 1;
        }

        let mut rows = vec![vec![0.0; user_ids.len()]; movie_ids.len()];
        for ((item, user), (sum, count)) in cells {
            rows[item][user] = sum / count as f64;
        }

        tracing::info!(
            num_items = movie_ids.len(),
            num_users = user_ids.len(),
            num_ratings = ratings.len(),
            "Built item-user interaction matrix"
        );

        Ok(Self {
            rows,
            movie_ids,
            num_users: user_ids.len(),
        })
    }

    pub fn num_items(&self) -> usize {
        self.rows.len()
    }

    pub fn num_users(&self) -> usize {
        self.num_users
    }

    /// Item index: movie ids in row order
    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    /// Rating vector of item `i` across all users
    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triples(data: &[(i64, i64, f64)]) -> Vec<Rating> {
        data.iter()
            .map(|&(u, m, r)| Rating::new(u, m, r))
            .collect()
    }

    #[test]
    fn test_pivot_shape_and_index_order() {
        let ratings = triples(&[(1, 20, 4.0), (1, 10, 3.0), (2, 20, 5.0)]);
        let matrix = InteractionMatrix::from_ratings(&ratings).unwrap();

        assert_eq!(matrix.num_items(), 2);
        assert_eq!(matrix.num_users(), 2);
        // Item index is ascending movie id regardless of input order
        assert_eq!(matrix.movie_ids(), &[10, 20]);

        assert_eq!(matrix.row(0), &[3.0, 0.0]);
        assert_eq!(matrix.row(1), &[4.0, 5.0]);
    }

    #[test]
    fn test_missing_ratings_are_zero() {
        let ratings = triples(&[(1, 10, 2.5), (2, 30, 4.5)]);
        let matrix = InteractionMatrix::from_ratings(&ratings).unwrap();

        assert_eq!(matrix.row(0), &[2.5, 0.0]);
        assert_eq!(matrix.row(1), &[0.0, 4.5]);
    }

    #[test]
    fn test_duplicate_pairs_aggregate_by_mean() {
        let ratings = triples(&[(1, 10, 2.0), (1, 10, 4.0), (2, 10, 5.0)]);
        let matrix = InteractionMatrix::from_ratings(&ratings).unwrap();

        assert_eq!(matrix.row(0), &[3.0, 5.0]);

        // Mean aggregation makes the result order-independent
        let reversed = triples(&[(2, 10, 5.0), (1, 10, 4.0), (1, 10, 2.0)]);
        let matrix2 = InteractionMatrix::from_ratings(&reversed).unwrap();
        assert_eq!(matrix.row(0), matrix2.row(0));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let result = InteractionMatrix::from_ratings(&[]);
        assert!(matches!(
            result,
            Err(crate::error::AppError::DataIntegrity(_))
        ));
    }
}
