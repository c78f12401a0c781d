use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the persisted similarity model artifact
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Cleaned ratings CSV consumed by the offline pipeline
    #[serde(default = "default_ratings_csv")]
    pub ratings_csv: String,

    /// Enriched movie metadata CSV (preferred catalog source)
    #[serde(default = "default_movies_master_csv")]
    pub movies_master_csv: String,

    /// Base movie metadata CSV, used when the enriched one is absent
    #[serde(default = "default_movies_base_csv")]
    pub movies_base_csv: String,

    /// TMDB API bearer token; enrichment is skipped when unset
    #[serde(default)]
    pub tmdb_token: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_model_dir() -> String {
    "data/model".to_string()
}

fn default_ratings_csv() -> String {
    "data/processed/ratings_clean.csv".to_string()
}

fn default_movies_master_csv() -> String {
    "data/processed/movies_master.csv".to_string()
}

fn default_movies_base_csv() -> String {
    "data/processed/movies_base.csv".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
