//! Item-based collaborative filtering engine
//!
//! The offline pipeline flows one way: rating triples are pivoted into an
//! item-by-user interaction matrix, cosine similarity between item rows
//! produces the item-item similarity matrix, and the matrix is persisted
//! together with its item index as a single artifact. The serving path only
//! ever reads a loaded [`model::SimilarityModel`].

pub mod eval;
pub mod interactions;
pub mod model;
pub mod similarity;
pub mod store;

pub use interactions::InteractionMatrix;
pub use model::SimilarityModel;
pub use store::ModelStore;
