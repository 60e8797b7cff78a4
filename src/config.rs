use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FEED_URL: &str = "https://feeds.nbcnews.com/nbcnews/public/world";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub feed_url: String,
    /// Connect and request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Responses larger than this are rejected
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "MediaNews/1.0 (RSS Reader)".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
