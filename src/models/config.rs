//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and pacing behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Platform endpoint hosts
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if !self.endpoints.api_base.starts_with("http") {
            return Err(AppError::validation("endpoints.api_base must be a URL"));
        }
        if !self.endpoints.video_cdn.starts_with("http") {
            return Err(AppError::validation("endpoints.video_cdn must be a URL"));
        }
        Ok(())
    }
}

/// HTTP client and request pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between search page requests in milliseconds
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,

    /// Delay between note detail requests in milliseconds
    #[serde(default = "defaults::detail_delay")]
    pub detail_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_delay_ms: defaults::page_delay(),
            detail_delay_ms: defaults::detail_delay(),
        }
    }
}

/// Platform endpoint hosts.
///
/// The API host serves the search and feed endpoints; the explore and user
/// hosts are only used to build canonical URLs in output records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// API host for search and feed requests
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Base URL for canonical note pages
    #[serde(default = "defaults::explore_base")]
    pub explore_base: String,

    /// Base URL for author profile pages
    #[serde(default = "defaults::user_base")]
    pub user_base: String,

    /// CDN host prepended to origin video keys
    #[serde(default = "defaults::video_cdn")]
    pub video_cdn: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            explore_base: defaults::explore_base(),
            user_base: defaults::user_base(),
            video_cdn: defaults::video_cdn(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn page_delay() -> u64 {
        1000
    }
    pub fn detail_delay() -> u64 {
        500
    }

    // Endpoint defaults
    pub fn api_base() -> String {
        "https://edith.xiaohongshu.com".into()
    }
    pub fn explore_base() -> String {
        "https://www.xiaohongshu.com/explore".into()
    }
    pub fn user_base() -> String {
        "https://www.xiaohongshu.com/user/profile".into()
    }
    pub fn video_cdn() -> String {
        "https://sns-video-bd.xhscdn.com".into()
    }
}
