use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDB image CDN base URL (size segment is appended per use)
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// OMDb API key
    pub omdb_api_key: String,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Firebase web API key, used by the identity provider
    pub firebase_api_key: String,

    /// Identity Toolkit base URL
    #[serde(default = "default_identity_api_url")]
    pub identity_api_url: String,

    /// Secure Token API base URL, used to refresh ID tokens
    #[serde(default = "default_token_api_url")]
    pub token_api_url: String,

    /// Firestore project holding the comments collection.
    /// Comments are kept in memory when unset.
    #[serde(default)]
    pub firebase_project_id: Option<String>,

    /// Firestore REST base URL
    #[serde(default = "default_firestore_api_url")]
    pub firestore_api_url: String,

    /// Maximum number of movies per listing
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    /// Poll interval for live comment subscriptions, in seconds
    #[serde(default = "default_comment_poll_secs")]
    pub comment_poll_secs: u64,

    /// Sessions unused for this many seconds are forgotten
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_identity_api_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_token_api_url() -> String {
    "https://securetoken.googleapis.com/v1".to_string()
}

fn default_firestore_api_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_result_limit() -> usize {
    20
}

fn default_comment_poll_secs() -> u64 {
    5
}

fn default_session_idle_secs() -> u64 {
    24 * 60 * 60
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

    pub fn comment_poll_interval(&self) -> Duration {
        Duration::from_secs(self.comment_poll_secs.max(1))
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs.max(1))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
