use std::path::Path;

use anyhow::Context;

use cinerec_api::api::{create_router, AppState};
use cinerec_api::catalog::MovieCatalog;
use cinerec_api::config::Config;
use cinerec_api::engine::ModelStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let catalog = MovieCatalog::load(&[
        Path::new(&config.movies_master_csv),
        Path::new(&config.movies_base_csv),
    ])
    .context("failed to load movie catalog")?;

    // A missing model is recoverable: start in model-inactive mode and serve
    // catalog endpoints while recommendations answer 503
    let model = match ModelStore::new(&config.model_dir).load() {
        Ok(model) => Some(model),
        Err(e) => {
            tracing::warn!(error = %e, "Starting without a similarity model");
            None
        }
    };

    let state = AppState::new(model, catalog);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
