use std::sync::Arc;

use crate::catalog::MovieCatalog;
use crate::engine::SimilarityModel;
use crate::error::{AppError, AppResult};

/// Shared application state.
///
/// The similarity model and the catalog are both immutable after startup, so
/// handlers read them concurrently through plain `Arc`s without locking. A
/// missing model is a normal state: the service answers metadata requests and
/// returns 503 for recommendations until a model is deployed.
#[derive(Clone)]
pub struct AppState {
    model: Option<Arc<SimilarityModel>>,
    catalog: Arc<MovieCatalog>,
}

impl AppState {
    pub fn new(model: Option<SimilarityModel>, catalog: MovieCatalog) -> Self {
        Self {
            model: model.map(Arc::new),
            catalog: Arc::new(catalog),
        }
    }

    /// The loaded similarity model, or [`AppError::ModelUnavailable`]
    pub fn model(&self) -> AppResult<&Arc<SimilarityModel>> {
        self.model.as_ref().ok_or_else(|| {
            AppError::ModelUnavailable("similarity model is not loaded".to_string())
        })
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn catalog(&self) -> &MovieCatalog {
        &self.catalog
    }
}
