//! Offline model build pipeline.
//!
//! Reads the cleaned ratings CSV, fits the item-item similarity model, and
//! persists the artifact the serving process loads at startup. When a TMDB
//! token is configured, the movie catalog is enriched with posters and
//! overviews as a final step.

use anyhow::Context;

use cinerec_api::config::Config;
use cinerec_api::engine::{ModelStore, SimilarityModel};
use cinerec_api::ingest;
use cinerec_api::services::tmdb::{self, TmdbClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let ratings = ingest::load_ratings(&config.ratings_csv)
        .with_context(|| format!("failed to load ratings from {}", config.ratings_csv))?;

    let model = SimilarityModel::fit(&ratings).context("failed to fit similarity model")?;
    tracing::info!(num_items = model.num_items(), "Fitted similarity model");

    ModelStore::new(&config.model_dir)
        .save(&model)
        .context("failed to save model artifact")?;

    match &config.tmdb_token {
        Some(token) => {
            let client = TmdbClient::new(token.clone(), config.tmdb_api_url.clone());
            match tmdb::enrich_catalog(&client, &config.movies_base_csv, &config.movies_master_csv)
                .await
            {
                Ok(enriched) => tracing::info!(enriched, "Catalog enrichment complete"),
                // Enrichment is best-effort; the model artifact is already saved
                Err(e) => tracing::warn!(error = %e, "Catalog enrichment failed"),
            }
        }
        None => tracing::info!("TMDB_TOKEN not set, skipping catalog enrichment"),
    }

    Ok(())
}
