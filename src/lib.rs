pub mod api;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod services;
