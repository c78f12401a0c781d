use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::Rating;

/// Raw row of the ratings CSV. Fields are optional so a row with a missing
/// value deserializes instead of erroring, letting us drop it with a count.
#[derive(Debug, Deserialize)]
struct RatingRecord {
    #[serde(rename = "userId")]
    user_id: Option<i64>,
    #[serde(rename = "movieId")]
    movie_id: Option<i64>,
    rating: Option<f64>,
}

/// Loads rating triples from a MovieLens-style CSV
/// (`userId,movieId,rating[,timestamp]`).
///
/// Rows with a missing or unparseable field, or a rating outside
/// [0.5, 5.0], are dropped and counted rather than failing the load. An
/// input with no usable rows at all is a [`AppError::DataIntegrity`] failure.
pub fn load_ratings(path: impl AsRef<Path>) -> AppResult<Vec<Rating>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        AppError::DataIntegrity(format!("cannot open ratings file {}: {}", path.display(), e))
    })?;
    let ratings = read_ratings(file)?;
    tracing::info!(path = %path.display(), count = ratings.len(), "Loaded ratings");
    Ok(ratings)
}

/// Reader-based variant of [`load_ratings`]
pub fn read_ratings<R: Read>(reader: R) -> AppResult<Vec<Rating>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut ratings = Vec::new();
    let mut dropped = 0usize;

    for result in csv_reader.deserialize::<RatingRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };

        let (Some(user_id), Some(movie_id), Some(value)) =
            (record.user_id, record.movie_id, record.rating)
        else {
            dropped += 1;
            continue;
        };

        let rating = Rating::new(user_id, movie_id, value);
        if !rating.is_valid() {
            dropped += 1;
            continue;
        }
        ratings.push(rating);
    }

    if dropped > 0 {
        tracing::warn!(dropped, kept = ratings.len(), "Dropped unusable rating rows");
    }

    if ratings.is_empty() {
        return Err(AppError::DataIntegrity(
            "ratings input contained no usable rows".to_string(),
        ));
    }

    Ok(ratings)
}
