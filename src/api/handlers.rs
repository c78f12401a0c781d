use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::model::DEFAULT_TOP_K;
use crate::error::{AppError, AppResult};
use crate::models::{Movie, MovieId};

use super::AppState;

/// Cap on the search result page size
const MAX_SEARCH_LIMIT: usize = 50;

/// Default search result page size
const DEFAULT_SEARCH_LIMIT: usize = 20;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub liked_movie_ids: Vec<MovieId>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// A recommendation joined with catalog metadata where available
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub movie_id: MovieId,
    pub score: f64,
    pub title: Option<String>,
    pub poster_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

/// Compact movie representation for list endpoints
#[derive(Debug, Serialize)]
pub struct MovieSummary {
    pub movie_id: MovieId,
    pub title: String,
    pub year: Option<i32>,
    pub genres: String,
    pub poster_url: String,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            movie_id: movie.movie_id,
            title: movie.title.clone(),
            year: movie.year,
            genres: movie.genres.clone(),
            poster_url: movie.poster_url.clone(),
        }
    }
}

// Handlers

/// Health check endpoint; also reports whether a model is active
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "model_loaded": state.model_loaded(),
    }))
}

/// Generates recommendations for a set of liked movies.
///
/// Returns 503 while no model is loaded. An empty result is a success: it
/// means no candidate accumulated any similarity, not that the request
/// failed.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<RecommendationResponse>>> {
    if request.top_k == 0 {
        return Err(AppError::InvalidInput("top_k must be at least 1".to_string()));
    }

    let model = state.model()?;
    let recommendations = model.recommend(&request.liked_movie_ids, request.top_k);

    tracing::debug!(
        liked = request.liked_movie_ids.len(),
        returned = recommendations.len(),
        "Served recommendation request"
    );

    let response = recommendations
        .into_iter()
        .map(|rec| {
            let movie = state.catalog().get(rec.movie_id);
            RecommendationResponse {
                movie_id: rec.movie_id,
                score: rec.score,
                title: movie.map(|m| m.title.clone()),
                poster_url: movie.map(|m| m.poster_url.clone()),
            }
        })
        .collect();

    Ok(Json(response))
}

/// Full metadata for one movie
pub async fn movie_detail(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<Movie>> {
    state
        .catalog()
        .get(movie_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("movieId {} not found", movie_id)))
}

/// Case-insensitive substring title search
pub async fn search_movies(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    if query.q.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "query parameter q must not be empty".to_string(),
        ));
    }
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);

    let results = state
        .catalog()
        .search(&query.q, limit)
        .into_iter()
        .map(MovieSummary::from)
        .collect();
    Ok(Json(results))
}

/// The precomputed most-popular list
pub async fn popular_movies(State(state): State<AppState>) -> Json<Vec<MovieSummary>> {
    let movies = state
        .catalog()
        .popular()
        .into_iter()
        .map(MovieSummary::from)
        .collect();
    Json(movies)
}

/// Distinct genre names across the catalog
pub async fn genres(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog().genres().to_vec())
}
