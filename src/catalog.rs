use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, MovieId};

/// Size of the precomputed popularity list
const POPULAR_LIMIT: usize = 100;

/// Genre placeholder MovieLens uses for unclassified movies
const NO_GENRES: &str = "(no genres listed)";

/// Raw row of the movies CSV. Everything beyond id and title is optional;
/// the enriched master CSV and the plain base CSV share this shape.
#[derive(Debug, Deserialize)]
struct MovieRecord {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    #[serde(default)]
    title_clean: Option<String>,
    // pandas writes nullable integer columns as floats ("1995.0")
    #[serde(default)]
    year: Option<f64>,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default)]
    poster_url: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    rating_count: Option<u32>,
    #[serde(default)]
    rating_mean: Option<f64>,
}

impl From<MovieRecord> for Movie {
    fn from(record: MovieRecord) -> Self {
        Movie {
            movie_id: record.movie_id,
            title: record.title_clean.filter(|t| !t.is_empty()).unwrap_or(record.title),
            year: record.year.map(|y| y as i32),
            genres: record.genres.unwrap_or_default(),
            poster_url: record.poster_url.unwrap_or_default(),
            overview: record.overview.unwrap_or_default(),
            rating_count: record.rating_count.unwrap_or(0),
            rating_mean: record.rating_mean.unwrap_or(0.0),
        }
    }
}

/// In-memory movie metadata catalog.
///
/// Loaded once at startup and read-only afterwards; lookup, search,
/// popularity, and genre listings are all served from precomputed structures.
pub struct MovieCatalog {
    movies: HashMap<MovieId, Movie>,
    /// (movie id, lowercase title) pairs in catalog order, for substring search
    search_index: Vec<(MovieId, String)>,
    /// Movie ids sorted by (rating_count, rating_mean) descending, capped
    popular: Vec<MovieId>,
    /// Sorted distinct genre names
    genres: Vec<String>,
}

impl MovieCatalog {
    /// Loads the catalog from the first existing path, preferring the
    /// enriched master CSV over the base CSV.
    pub fn load(paths: &[&Path]) -> AppResult<Self> {
        for path in paths {
            if path.exists() {
                let file = std::fs::File::open(path)?;
                let catalog = Self::from_reader(file)?;
                tracing::info!(
                    path = %path.display(),
                    movies = catalog.len(),
                    "Loaded movie catalog"
                );
                return Ok(catalog);
            }
        }
        Err(AppError::DataIntegrity(format!(
            "no movie catalog CSV found at any of: {}",
            paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let mut movies = Vec::new();
        let mut dropped = 0usize;
        for result in csv_reader.deserialize::<MovieRecord>() {
            match result {
                Ok(record) => movies.push(Movie::from(record)),
                Err(_) => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::warn!(dropped, "Dropped unparseable movie rows");
        }

        Ok(Self::from_movies(movies))
    }

    /// Builds a catalog directly from movie records
    pub fn from_movies(movies: Vec<Movie>) -> Self {
        let search_index: Vec<(MovieId, String)> = movies
            .iter()
            .map(|m| (m.movie_id, m.title.to_lowercase()))
            .collect();

        let mut by_popularity: Vec<&Movie> = movies.iter().collect();
        by_popularity.sort_by(|a, b| {
            b.rating_count
                .cmp(&a.rating_count)
                .then_with(|| {
                    b.rating_mean
                        .partial_cmp(&a.rating_mean)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.movie_id.cmp(&b.movie_id))
        });
        let popular: Vec<MovieId> = by_popularity
            .into_iter()
            .take(POPULAR_LIMIT)
            .map(|m| m.movie_id)
            .collect();

        let mut genres: Vec<String> = movies
            .iter()
            .flat_map(|m| m.genres.split('|'))
            .map(str::trim)
            .filter(|g| !g.is_empty() && *g != NO_GENRES)
            .map(str::to_string)
            .collect();
        genres.sort();
        genres.dedup();

        let movies: HashMap<MovieId, Movie> =
            movies.into_iter().map(|m| (m.movie_id, m)).collect();

        Self {
            movies,
            search_index,
            popular,
            genres,
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, movie_id: MovieId) -> Option<&Movie> {
        self.movies.get(&movie_id)
    }

    /// Case-insensitive substring title search, first `limit` matches in
    /// catalog order
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Movie> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.search_index
            .iter()
            .filter(|(_, title)| title.contains(&needle))
            .filter_map(|(id, _)| self.movies.get(id))
            .take(limit)
            .collect()
    }

    /// Most-rated movies, ties broken by mean rating
    pub fn popular(&self) -> Vec<&Movie> {
        self.popular
            .iter()
            .filter_map(|id| self.movies.get(id))
            .collect()
    }

    /// Sorted distinct genre names
    pub fn genres(&self) -> &[String] {
        &self.genres
    }
}
