//! Discord channel provider.
//!
//! Stateless: every fetch asks the REST API for the channel's latest messages
//! and converts them from scratch.  Nothing is retained between calls, so a
//! failed fetch has no stale data to offer.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{format_timestamp, get_json, NewsItem, Provider};
use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://discord.com/api/v10";

/// The channel messages endpoint refuses larger pages.
const MAX_PAGE: usize = 100;

/// One entry of `GET /channels/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct DiscordMessage {
    pub id: String,
    #[serde(default)]
    pub content: String,
    /// ISO 8601 with a numeric offset, e.g. `2024-01-15T12:00:00.000000+00:00`.
    #[serde(default)]
    pub timestamp: String,
}

pub struct DiscordProvider {
    client: Client,
    base_url: String,
    authorization: String,
    channel: String,
}

impl DiscordProvider {
    pub fn new(client: Client, token: &str, channel: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            authorization: format!("Bot {token}"),
            channel: channel.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Convert a page of messages into [`NewsItem`]s.
    ///
    /// Messages with no content (embeds, attachments, joins) are dropped, but
    /// every item's `id` is its 1-based position in the original page.
    pub fn parse_messages(messages: Vec<DiscordMessage>) -> Vec<NewsItem> {
        messages
            .into_iter()
            .enumerate()
            .filter(|(_, msg)| !msg.content.is_empty())
            .map(|(i, msg)| {
                let created_at = normalize_timestamp(&msg.timestamp).unwrap_or_else(|| {
                    warn!(
                        message_id = %msg.id,
                        timestamp = %msg.timestamp,
                        "unparseable discord timestamp, keeping it verbatim"
                    );
                    msg.timestamp.clone()
                });
                NewsItem::from_text(i as i64 + 1, &msg.content, created_at, None)
            })
            .collect()
    }
}

/// Re-render an offset timestamp as whole-second UTC with a `Z` suffix.
fn normalize_timestamp(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| format_timestamp(dt.with_timezone(&Utc)))
}

impl Provider for DiscordProvider {
    fn name(&self) -> &str {
        "discord"
    }

    fn fetch(&self, limit: usize) -> Result<Vec<NewsItem>, FetchError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/channels/{}/messages", self.base_url, self.channel);
        let request = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.authorization.as_str())
            .query(&[("limit", limit.min(MAX_PAGE))]);

        let messages: Vec<DiscordMessage> = get_json(request).map_err(|e| {
            warn!(channel = %self.channel, error = %e, "discord fetch failed");
            FetchError::new(e)
        })?;

        let mut items = Self::parse_messages(messages);
        items.truncate(limit);
        debug!(channel = %self.channel, count = items.len(), "fetched discord messages");
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
