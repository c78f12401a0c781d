use axum_test::TestServer;
use serde_json::json;

use cinerec_api::api::{create_router, AppState};
use cinerec_api::catalog::MovieCatalog;
use cinerec_api::engine::SimilarityModel;
use cinerec_api::models::Movie;

fn fixture_model() -> SimilarityModel {
    let matrix = vec![
        vec![1.0, 0.8, 0.1],
        vec![0.8, 1.0, 0.05],
        vec![0.1, 0.05, 1.0],
    ];
    SimilarityModel::new(matrix, vec![10, 20, 30]).unwrap()
}

fn fixture_catalog() -> MovieCatalog {
    let movie = |id: i64, title: &str, genres: &str, count: u32, mean: f64| Movie {
        movie_id: id,
        title: title.to_string(),
        year: Some(1999),
        genres: genres.to_string(),
        poster_url: format!("https://posters.example/{}.jpg", id),
        overview: String::new(),
        rating_count: count,
        rating_mean: mean,
    };
    MovieCatalog::from_movies(vec![
        movie(10, "The Matrix", "Action|Sci-Fi", 278, 4.19),
        movie(20, "Fight Club", "Action|Drama", 218, 4.27),
        movie(30, "Office Space", "Comedy|Crime", 94, 3.85),
    ])
}

fn create_test_server() -> TestServer {
    let state = AppState::new(Some(fixture_model()), fixture_catalog());
    TestServer::new(create_router(state)).unwrap()
}

fn create_modelless_server() -> TestServer {
    let state = AppState::new(None, fixture_catalog());
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_check_reports_model_state() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);

    let server = create_modelless_server();
    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_recommendations_ranked_and_normalized() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "liked_movie_ids": [10], "top_k": 2 }))
        .await;
    response.assert_status_ok();

    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0]["movie_id"], 20);
    assert_eq!(recs[0]["score"], 1.0);
    assert_eq!(recs[0]["title"], "Fight Club");
    assert_eq!(recs[1]["movie_id"], 30);
    assert_eq!(recs[1]["score"], 0.125);
}

#[tokio::test]
async fn test_recommendations_exclude_liked_movies() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "liked_movie_ids": [10, 20], "top_k": 5 }))
        .await;
    response.assert_status_ok();

    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["movie_id"], 30);
    assert_eq!(recs[0]["score"], 1.0);
}

#[tokio::test]
async fn test_recommendations_default_top_k() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "liked_movie_ids": [10] }))
        .await;
    response.assert_status_ok();
    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs.len(), 2);
}

#[tokio::test]
async fn test_recommendations_empty_and_unknown_liked_ids() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "liked_movie_ids": [] }))
        .await;
    response.assert_status_ok();
    let recs: Vec<serde_json::Value> = response.json();
    assert!(recs.is_empty());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "liked_movie_ids": [999, 1000] }))
        .await;
    response.assert_status_ok();
    let recs: Vec<serde_json::Value> = response.json();
    assert!(recs.is_empty());
}

#[tokio::test]
async fn test_recommendations_without_model_return_503() {
    let server = create_modelless_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "liked_movie_ids": [10] }))
        .await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_recommendations_reject_zero_top_k() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "liked_movie_ids": [10], "top_k": 0 }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_movie_detail() {
    let server = create_test_server();

    let response = server.get("/api/v1/movies/10").await;
    response.assert_status_ok();
    let movie: serde_json::Value = response.json();
    assert_eq!(movie["title"], "The Matrix");
    assert_eq!(movie["year"], 1999);
}

#[tokio::test]
async fn test_movie_detail_unknown_id_is_404() {
    let server = create_test_server();
    let response = server.get("/api/v1/movies/999").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_movie_search() {
    let server = create_test_server();

    let response = server.get("/api/v1/movies/search?q=matrix").await;
    response.assert_status_ok();
    let results: Vec<serde_json::Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["movie_id"], 10);
}

#[tokio::test]
async fn test_movie_search_requires_query() {
    let server = create_test_server();
    let response = server.get("/api/v1/movies/search?q=%20").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_popular_movies_ordering() {
    let server = create_test_server();

    let response = server.get("/api/v1/movies/popular").await;
    response.assert_status_ok();
    let movies: Vec<serde_json::Value> = response.json();
    assert_eq!(movies.len(), 3);
    assert_eq!(movies[0]["movie_id"], 10);
    assert_eq!(movies[1]["movie_id"], 20);
    assert_eq!(movies[2]["movie_id"], 30);
}

#[tokio::test]
async fn test_genres_listing() {
    let server = create_test_server();

    let response = server.get("/api/v1/genres").await;
    response.assert_status_ok();
    let genres: Vec<String> = response.json();
    assert_eq!(genres, vec!["Action", "Comedy", "Crime", "Drama", "Sci-Fi"]);
}
