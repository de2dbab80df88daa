use serde::Deserialize;

use crate::services::recommendations::{Randomness, RecommendationMode};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Comma separated list of origins allowed by CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,

    /// Strategy used when a request does not pick one
    #[serde(default)]
    pub recommendation_mode: RecommendationMode,

    /// Fixes the shuffle seed. Only meant for tests and demos.
    #[serde(default)]
    pub recommendation_seed: Option<u64>,

    /// Per-category cap on search results
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Number of entries in the recent-activity feed
    #[serde(default = "default_feed_size")]
    pub feed_size: usize,

    /// Log entries fetched to build the feed, before deduplication
    #[serde(default = "default_feed_oversample")]
    pub feed_oversample: u32,
}

fn default_database_url() -> String {
    "sqlite://catalog.db?mode=rwc".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> String {
    "http://localhost:19006,http://localhost:8081".to_string()
}

fn default_search_limit() -> u32 {
    50
}

fn default_feed_size() -> usize {
    20
}

fn default_feed_oversample() -> u32 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            recommendation_mode: RecommendationMode::default(),
            recommendation_seed: None,
            search_limit: default_search_limit(),
            feed_size: default_feed_size(),
            feed_oversample: default_feed_oversample(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Log entries read per feed request. Never below `feed_size`, otherwise
    /// the feed could come back short even without any repeats.
    pub fn feed_window(&self) -> u32 {
        let size = u32::try_from(self.feed_size).unwrap_or(u32::MAX);
        if self.feed_oversample < size {
            tracing::warn!(
                feed_size = self.feed_size,
                feed_oversample = self.feed_oversample,
                "Feed oversample is below the feed size; reading feed_size entries instead"
            );
        }
        self.feed_oversample.max(size)
    }

    pub fn randomness(&self) -> Randomness {
        match self.recommendation_seed {
            Some(seed) => Randomness::Seeded(seed),
            None => Randomness::Store,
        }
    }
}
