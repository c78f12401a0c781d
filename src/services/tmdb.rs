//! TMDB metadata enrichment
//!
//! Offline pipeline step that joins the base movie CSV against The Movie
//! Database to pick up poster URLs and plot overviews, writing the enriched
//! master CSV the catalog prefers at serving time. TMDB is an external
//! collaborator: a failed lookup leaves that movie un-enriched and the
//! pipeline keeps going.

use std::path::Path;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::MovieId;

/// Fallback poster base when the configuration endpoint is unreachable
const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Poster size segment appended to the image base URL
const POSTER_SIZE: &str = "w500";

/// Only the most-rated movies are enriched; TMDB lookups are rate-limited
/// and the long tail rarely surfaces in the UI.
const ENRICH_LIMIT: usize = 500;

/// TMDB API client authenticated with a bearer token
pub struct TmdbClient {
    http_client: HttpClient,
    token: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiConfiguration {
    images: ApiImageConfiguration,
}

#[derive(Debug, Deserialize)]
struct ApiImageConfiguration {
    secure_base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiMovieDetails {
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
}

/// Poster URL and overview fetched for one movie
#[derive(Debug, Clone, Default)]
pub struct MovieDetails {
    pub poster_url: String,
    pub overview: String,
}

impl TmdbClient {
    pub fn new(token: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            token,
            api_url,
        }
    }

    /// Resolves the poster image base URL from the configuration endpoint,
    /// falling back to the well-known default
    pub async fn image_base_url(&self) -> String {
        let url = format!("{}/configuration", self.api_url);
        match self.get_json::<ApiConfiguration>(&url).await {
            Ok(config) => config.images.secure_base_url,
            Err(e) => {
                tracing::warn!(error = %e, "TMDB configuration lookup failed, using default image base");
                DEFAULT_IMAGE_BASE_URL.to_string()
            }
        }
    }

    /// Fetches poster URL and overview for one TMDB movie id
    pub async fn movie_details(&self, tmdb_id: i64, image_base: &str) -> AppResult<MovieDetails> {
        let url = format!("{}/movie/{}", self.api_url, tmdb_id);
        let details = self.get_json::<ApiMovieDetails>(&url).await?;

        Ok(MovieDetails {
            poster_url: details
                .poster_path
                .map(|path| format!("{}{}{}", image_base, POSTER_SIZE, path))
                .unwrap_or_default(),
            overview: details.overview.unwrap_or_default(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.token)
            .header("accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "TMDB returned {} for {}",
                response.status(),
                url
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Base CSV row carried through enrichment; extra columns are preserved
/// positionally by re-serializing the full record.
#[derive(Debug, Serialize, Deserialize)]
struct BaseMovieRecord {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    #[serde(default)]
    title_clean: Option<String>,
    #[serde(default)]
    year: Option<f64>,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default)]
    rating_count: Option<u32>,
    #[serde(default)]
    rating_mean: Option<f64>,
    #[serde(rename = "tmdbId", default)]
    tmdb_id: Option<f64>,
    #[serde(default)]
    poster_url: Option<String>,
    #[serde(default)]
    overview: Option<String>,
}

/// Enriches the base movies CSV into the master CSV.
///
/// The [`ENRICH_LIMIT`] most-rated movies with a TMDB id get poster and
/// overview fields populated; everything else passes through untouched.
/// Returns the number of movies successfully enriched.
pub async fn enrich_catalog(
    client: &TmdbClient,
    base_csv: impl AsRef<Path>,
    master_csv: impl AsRef<Path>,
) -> AppResult<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(base_csv.as_ref())?;
    let mut records: Vec<BaseMovieRecord> = Vec::new();
    for result in reader.deserialize::<BaseMovieRecord>() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(error = %e, "Skipping unparseable movie row"),
        }
    }

    // Rank by popularity and remember which rows to enrich
    let mut candidates: Vec<usize> = (0..records.len())
        .filter(|&i| records[i].tmdb_id.is_some())
        .collect();
    candidates.sort_by(|&a, &b| {
        records[b]
            .rating_count
            .unwrap_or(0)
            .cmp(&records[a].rating_count.unwrap_or(0))
    });
    candidates.truncate(ENRICH_LIMIT);

    let image_base = client.image_base_url().await;
    let mut enriched = 0usize;
    for idx in candidates {
        let tmdb_id = records[idx].tmdb_id.unwrap_or_default() as i64;
        match client.movie_details(tmdb_id, &image_base).await {
            Ok(details) => {
                records[idx].poster_url = Some(details.poster_url);
                records[idx].overview = Some(details.overview);
                enriched += 1;
            }
            Err(e) => {
                tracing::warn!(tmdb_id, error = %e, "TMDB lookup failed, leaving row un-enriched");
            }
        }
    }

    let mut writer = csv::Writer::from_path(master_csv.as_ref())?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!(
        total = records.len(),
        enriched,
        path = %master_csv.as_ref().display(),
        "Wrote enriched movie catalog"
    );
    Ok(enriched)
}
