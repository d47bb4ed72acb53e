//! Process configuration loaded from the environment.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::source::Credentials;

pub const DEFAULT_TWITCH_USERS_URL: &str = "https://api.twitch.tv/helix/users";
pub const DEFAULT_TWITCH_GAMES_URL: &str = "https://api.twitch.tv/helix/games";
pub const DEFAULT_TWITCH_STREAMS_URL: &str = "https://api.twitch.tv/helix/streams";
pub const DEFAULT_LAMODA_PRODUCTS_URL: &str = "http://127.0.0.1:8090/products";
pub const DEFAULT_BROKER_RETENTION: usize = 10_000;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub twitch_client_id: Option<String>,
    pub twitch_access_token: Option<String>,
    pub twitch_users_url: String,
    pub twitch_games_url: String,
    pub twitch_streams_url: String,
    pub lamoda_products_url: String,
    pub poll_interval: Duration,
    /// Messages kept per topic by the in-memory broker.
    pub broker_retention: usize,
    pub http_addr: String,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            twitch_client_id: None,
            twitch_access_token: None,
            twitch_users_url: DEFAULT_TWITCH_USERS_URL.to_string(),
            twitch_games_url: DEFAULT_TWITCH_GAMES_URL.to_string(),
            twitch_streams_url: DEFAULT_TWITCH_STREAMS_URL.to_string(),
            lamoda_products_url: DEFAULT_LAMODA_PRODUCTS_URL.to_string(),
            poll_interval: Duration::from_millis(50),
            broker_retention: DEFAULT_BROKER_RETENTION,
            http_addr: "0.0.0.0:8000".to_string(),
            log_filter: "info,tlparser=debug".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from any variable lookup. Unset variables take
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let or_default = |name: &str, default: String| lookup(name).unwrap_or(default);

        let poll_interval = match lookup("BROKER_POLL_INTERVAL_MS") {
            Some(value) => Duration::from_millis(
                value
                    .parse()
                    .context("BROKER_POLL_INTERVAL_MS must be a valid number")?,
            ),
            None => defaults.poll_interval,
        };

        let broker_retention = match lookup("BROKER_RETENTION") {
            Some(value) => value
                .parse()
                .context("BROKER_RETENTION must be a valid number")?,
            None => defaults.broker_retention,
        };

        Ok(Self {
            twitch_client_id: lookup("TWITCH_CLIENT_ID").filter(|v| !v.is_empty()),
            twitch_access_token: lookup("TWITCH_ACCESS_TOKEN").filter(|v| !v.is_empty()),
            twitch_users_url: or_default("TWITCH_USERS_URL", defaults.twitch_users_url),
            twitch_games_url: or_default("TWITCH_GAMES_URL", defaults.twitch_games_url),
            twitch_streams_url: or_default("TWITCH_STREAMS_URL", defaults.twitch_streams_url),
            lamoda_products_url: or_default("LAMODA_PRODUCTS_URL", defaults.lamoda_products_url),
            poll_interval,
            broker_retention,
            http_addr: or_default("HTTP_ADDR", defaults.http_addr),
            log_filter: or_default("RUST_LOG", defaults.log_filter),
        })
    }

    /// Credentials sent to the Twitch API.
    pub fn twitch_credentials(&self) -> Credentials {
        Credentials {
            client_id: self.twitch_client_id.clone(),
            access_token: self.twitch_access_token.clone(),
        }
    }
}
