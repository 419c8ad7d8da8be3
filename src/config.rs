//! Feed configuration loaded from a JSON file.
//!
//! ```json
//! {
//!   "news": {
//!     "refresh_seconds": 60,
//!     "telegram": { "token": "123:abc", "channel": "@my_channel" },
//!     "discord":  { "token": "xyz", "channel": "123456789012345678" }
//!   }
//! }
//! ```
//!
//! Every key is optional.  A source with an empty token is left out.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ProviderError};

pub const DEFAULT_REFRESH_SECS: u64 = 60;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub news: NewsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsConfig {
    /// Seconds between refreshes; 0 or missing means [`DEFAULT_REFRESH_SECS`].
    #[serde(default)]
    pub refresh_seconds: u64,

    /// HTTP timeout for upstream calls.  Unset means no timeout.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    /// Channel username, with or without `@`.
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Ring buffer size for accumulated posts.
    #[serde(default)]
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub token: String,
    /// Numeric channel id.
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

impl NewsConfig {
    pub fn refresh_interval(&self) -> Duration {
        let secs = match self.refresh_seconds {
            0 => DEFAULT_REFRESH_SECS,
            n => n,
        };
        Duration::from_secs(secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl TelegramConfig {
    pub fn is_enabled(&self) -> bool {
        !self.token.is_empty()
    }

    /// Token and channel, or which one is missing.
    pub fn credentials(&self) -> Result<(&str, &str), ProviderError> {
        require(&self.token, &self.channel, "telegram.token", "telegram.channel")
    }
}

impl DiscordConfig {
    pub fn is_enabled(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn credentials(&self) -> Result<(&str, &str), ProviderError> {
        require(&self.token, &self.channel, "discord.token", "discord.channel")
    }
}

fn require<'a>(
    token: &'a str,
    channel: &'a str,
    token_field: &'static str,
    channel_field: &'static str,
) -> Result<(&'a str, &'a str), ProviderError> {
    if token.is_empty() {
        return Err(ProviderError::NotConfigured { field: token_field });
    }
    if channel.is_empty() {
        return Err(ProviderError::NotConfigured { field: channel_field });
    }
    Ok((token, channel))
}
