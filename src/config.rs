use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_BASE_URL: &str = "https://music.youtube.com/youtubei/v1/";
pub const DEFAULT_CLIENT_VERSION: &str = "1.20240918.01.00";
pub const DEFAULT_PLAYER_CLIENT_VERSION: &str = "7.27.52";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub client_version: String,
    pub player_client_version: String,
    pub language: String,
    pub region: String,
    pub request_timeout: Duration,
    /// Deadline for the whole home feed aggregate. `None` waits for every section.
    pub feed_deadline: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            player_client_version: DEFAULT_PLAYER_CLIENT_VERSION.to_string(),
            language: "en".to_string(),
            region: "US".to_string(),
            request_timeout: Duration::from_secs(15),
            feed_deadline: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = match lookup("YTM_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => defaults.base_url,
        };

        let request_timeout = match lookup("YTM_REQUEST_TIMEOUT_SECS") {
            Some(raw) => match parse_secs("YTM_REQUEST_TIMEOUT_SECS", &raw)? {
                0 => {
                    return Err(AppError::Config(
                        "YTM_REQUEST_TIMEOUT_SECS must be greater than zero".into(),
                    ));
                }
                secs => Duration::from_secs(secs),
            },
            None => defaults.request_timeout,
        };

        let feed_deadline = match lookup("YTM_FEED_DEADLINE_SECS") {
            Some(raw) => match parse_secs("YTM_FEED_DEADLINE_SECS", &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        Ok(Self {
            base_url,
            client_version: lookup("YTM_CLIENT_VERSION").unwrap_or(defaults.client_version),
            player_client_version: lookup("YTM_PLAYER_CLIENT_VERSION")
                .unwrap_or(defaults.player_client_version),
            language: lookup("YTM_LANGUAGE").unwrap_or(defaults.language),
            region: lookup("YTM_REGION").unwrap_or(defaults.region),
            request_timeout,
            feed_deadline,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<String> {
    // Endpoint names are joined onto the base, which only works with a trailing slash.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    Url::parse(&normalized)
        .map(|url| url.to_string())
        .map_err(|e| AppError::Config(format!("Invalid YTM_BASE_URL: {}", e)))
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be a whole number of seconds", key)))
}
