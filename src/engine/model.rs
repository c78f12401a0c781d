use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::error::{AppError, AppResult};
use crate::models::{MovieId, Rating, Recommendation};

use super::{interactions::InteractionMatrix, similarity};

/// Default number of recommendations returned per request
pub const DEFAULT_TOP_K: usize = 10;

/// A trained item-based collaborative filtering model.
///
/// Holds the item-item similarity matrix together with the item index that
/// maps matrix positions back to movie ids; the two are meaningless apart and
/// are only ever constructed, stored, and loaded as a pair. The model is
/// immutable after construction, so concurrent recommendation requests share
/// one instance behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct SimilarityModel {
    matrix: Vec<Vec<f64>>,
    movie_ids: Vec<MovieId>,
    id_to_index: HashMap<MovieId, usize>,
}

impl SimilarityModel {
    /// Assembles a model from a similarity matrix and its item index.
    ///
    /// Rejects mismatched shapes so a truncated or reordered artifact can
    /// never be served.
    pub fn new(matrix: Vec<Vec<f64>>, movie_ids: Vec<MovieId>) -> AppResult<Self> {
        let n = movie_ids.len();
        if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
            return Err(AppError::Internal(format!(
                "similarity matrix shape does not match item index length {}",
                n
            )));
        }

        let id_to_index = movie_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        Ok(Self {
            matrix,
            movie_ids,
            id_to_index,
        })
    }

    /// Trains a model from rating triples: pivots them into the interaction
    /// matrix and computes item-item cosine similarity.
    pub fn fit(ratings: &[Rating]) -> AppResult<Self> {
        let interactions = InteractionMatrix::from_ratings(ratings)?;
        let matrix = similarity::item_similarity(&interactions);
        Self::new(matrix, interactions.movie_ids().to_vec())
    }

    pub fn num_items(&self) -> usize {
        self.movie_ids.len()
    }

    /// Item index in matrix row order
    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    /// Whether the movie id is part of the trained item index
    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.id_to_index.contains_key(&movie_id)
    }

    /// Generates top-K recommendations for a set of liked movies.
    ///
    /// Each liked movie contributes its full similarity row; candidate scores
    /// accumulate by summation, so a movie similar to several liked ones
    /// outranks a movie similar to just one. Liked movies are never
    /// candidates themselves, and liked ids absent from the item index are
    /// skipped rather than failing the request. Results are sorted by score
    /// descending with ascending movie id as tie-break, normalized so the
    /// best pre-truncation candidate scores 1.0, and cut to `top_k` last.
    pub fn recommend(&self, liked_movie_ids: &[MovieId], top_k: usize) -> Vec<Recommendation> {
        let liked: HashSet<MovieId> = liked_movie_ids.iter().copied().collect();

        let mut scores: HashMap<MovieId, f64> = HashMap::new();
        for liked_id in liked_movie_ids {
            let Some(&row) = self.id_to_index.get(liked_id) else {
                tracing::debug!(movie_id = *liked_id, "Liked movie not in item index, skipping");
                continue;
            };

            for (idx, &sim) in self.matrix[row].iter().enumerate() {
                let candidate = self.movie_ids[idx];
                if liked.contains(&candidate) {
                    continue;
                }
                *scores.entry(candidate).or_insert(0.0) += sim;
            }
        }

        if scores.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(MovieId, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        // Normalize against the best accumulated score over all candidates,
        // not just the returned prefix
        let max_score = ranked[0].1;
        ranked
            .into_iter()
            .take(top_k)
            .map(|(movie_id, score)| Recommendation {
                movie_id,
                score: if max_score > 0.0 { score / max_score } else { 0.0 },
            })
            .collect()
    }
}
