use serde::{Deserialize, Serialize};

/// MovieLens user identifier
pub type UserId = i64;

/// MovieLens movie identifier
pub type MovieId = i64;

/// Lowest rating a user can give
pub const MIN_RATING: f64 = 0.5;

/// Highest rating a user can give
pub const MAX_RATING: f64 = 5.0;

/// A single (user, movie, rating) triple from the ratings source.
///
/// Immutable once ingested; the offline pipeline and the evaluation harness
/// both consume slices of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: f64,
}

impl Rating {
    pub fn new(user_id: UserId, movie_id: MovieId, rating: f64) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
        }
    }

    /// Whether the rating value lies in the valid MovieLens range
    pub fn is_valid(&self) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }
}

/// Movie metadata record served by the catalog endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub movie_id: MovieId,
    pub title: String,
    pub year: Option<i32>,
    /// Pipe-separated genre names, e.g. "Comedy|Romance"
    #[serde(default)]
    pub genres: String,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub rating_count: u32,
    #[serde(default)]
    pub rating_mean: f64,
}

/// A ranked recommendation: movie id plus a score normalized to [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub score: f64,
}
