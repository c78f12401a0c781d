//! Offline evaluation of recommendation quality.
//!
//! Splits the ratings 80/20 per user, fits a model on the train split only,
//! and reports precision@K, recall@K, NDCG@K, and hit rate over the held-out
//! split.

use anyhow::Context;

use cinerec_api::config::Config;
use cinerec_api::engine::eval;
use cinerec_api::ingest;

const TOP_K: usize = 10;
const SEED: u64 = 42;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let ratings = ingest::load_ratings(&config.ratings_csv)
        .with_context(|| format!("failed to load ratings from {}", config.ratings_csv))?;

    let report = eval::evaluate(&ratings, TOP_K, SEED).context("evaluation failed")?;

    println!("========================================");
    println!("Results for top-{} recommendations", TOP_K);
    println!("========================================");
    println!("Users evaluated   : {}", report.users_evaluated);
    println!("Average Precision : {:.4}", report.precision);
    println!("Average Recall    : {:.4}", report.recall);
    println!("Average NDCG      : {:.4}", report.ndcg);
    println!("Hit Rate          : {:.4}", report.hit_rate);
    println!("========================================");

    Ok(())
}
