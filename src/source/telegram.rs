//! Telegram channel provider.
//!
//! Telegram bots cannot list a channel's history; they only see an update
//! stream.  [`TelegramProvider`] long-polls `getUpdates` with a resume cursor,
//! keeps the posts from its target channel, and serves the most recent of
//! them from a local ring buffer.
//!
//! The parsing and accumulation logic is in [`PollState`] and has no I/O, so
//! tests can drive it with hand-built updates.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::DateTime;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{format_timestamp, get_json, NewsItem, Provider, MAX_TITLE_CHARS};
use crate::error::{FetchError, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// How many posts are kept when no cap is configured.
pub const DEFAULT_MAX_ITEMS: usize = 1000;

/// Updates requested per poll (the Bot API maximum).
const UPDATES_PER_POLL: &str = "100";

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UpdatesResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Vec<Update>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub channel_post: Option<ChannelPost>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelPost {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    /// Unix seconds.
    pub date: i64,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    #[serde(default)]
    pub username: Option<String>,
}

// ---------------------------------------------------------------------------
// Poll state
// ---------------------------------------------------------------------------

/// Resume cursor plus the posts accumulated so far.
///
/// `cursor` never decreases.  `accumulated` holds at most `max_items` posts in
/// the order they were observed; the oldest are evicted first.
#[derive(Debug)]
pub struct PollState {
    cursor: i64,
    accumulated: VecDeque<NewsItem>,
    max_items: usize,
}

impl PollState {
    pub fn new(max_items: usize) -> Self {
        Self {
            cursor: 0,
            accumulated: VecDeque::new(),
            max_items: max_items.max(1),
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.accumulated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulated.is_empty()
    }

    /// Apply one batch of updates.  Returns how many posts were appended.
    ///
    /// `channel` is compared without a leading `@` and ignoring case.
    pub fn ingest(&mut self, updates: Vec<Update>, channel: &str) -> usize {
        let target = channel.trim_start_matches('@');
        let mut added = 0;

        for update in updates {
            if update.update_id >= self.cursor {
                self.cursor = update.update_id.saturating_add(1);
            }

            let Some(post) = update.channel_post else {
                continue;
            };
            let Some(text) = post.text.as_deref().filter(|t| !t.is_empty()) else {
                continue;
            };
            let from = post.chat.username.as_deref().unwrap_or_default();
            if !same_channel(from, target) {
                continue;
            }

            let created_at = DateTime::from_timestamp(post.date, 0)
                .map(format_timestamp)
                .unwrap_or_else(|| post.date.to_string());

            self.push(NewsItem::from_text(
                post.message_id,
                text,
                created_at,
                Some(MAX_TITLE_CHARS),
            ));
            added += 1;
        }

        added
    }

    /// The last `limit` posts, most recently observed first.
    pub fn latest(&self, limit: usize) -> Vec<NewsItem> {
        self.accumulated.iter().rev().take(limit).cloned().collect()
    }

    fn push(&mut self, item: NewsItem) {
        while self.accumulated.len() >= self.max_items {
            self.accumulated.pop_front();
        }
        self.accumulated.push_back(item);
    }
}

fn same_channel(a: &str, b: &str) -> bool {
    let a = a.trim_start_matches('@');
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Incrementally polls one bot's update stream for one channel's posts.
///
/// The whole of [`fetch`](Provider::fetch) runs under one lock, so concurrent
/// callers (for example a single-source cache and a merged cache sharing this
/// provider) see a consistent cursor.
pub struct TelegramProvider {
    client: Client,
    base_url: String,
    token: String,
    channel: String,
    state: Mutex<PollState>,
}

impl TelegramProvider {
    /// `channel` may be given with or without a leading `@`.
    pub fn new(client: Client, token: impl Into<String>, channel: &str) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            channel: channel.trim_start_matches('@').to_string(),
            state: Mutex::new(PollState::new(DEFAULT_MAX_ITEMS)),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Cap the number of posts kept in memory.
    pub fn with_max_items(self, max_items: usize) -> Self {
        Self {
            state: Mutex::new(PollState::new(max_items)),
            ..self
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn cursor(&self) -> i64 {
        self.lock_state().cursor()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, PollState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poll(&self, cursor: i64) -> Result<Vec<Update>, ProviderError> {
        let url = format!("{}/bot{}/getUpdates", self.base_url, self.token);
        let offset = cursor.to_string();
        let request = self.client.get(url).query(&[
            ("limit", UPDATES_PER_POLL),
            ("allowed_updates", r#"["channel_post"]"#),
            ("offset", offset.as_str()),
        ]);

        let response: UpdatesResponse = get_json(request)?;
        if !response.ok {
            return Err(ProviderError::Rejected(
                response.description.unwrap_or_else(|| "ok: false".into()),
            ));
        }
        Ok(response.result)
    }
}

impl Provider for TelegramProvider {
    fn name(&self) -> &str {
        "telegram"
    }

    fn fetch(&self, limit: usize) -> Result<Vec<NewsItem>, FetchError> {
        let mut state = self.lock_state();

        match self.poll(state.cursor()) {
            Ok(updates) => {
                let received = updates.len();
                let added = state.ingest(updates, &self.channel);
                debug!(
                    channel = %self.channel,
                    received,
                    added,
                    cursor = state.cursor(),
                    stored = state.len(),
                    "polled telegram updates"
                );
                Ok(state.latest(limit))
            }
            Err(e) => {
                warn!(channel = %self.channel, error = %e, "telegram poll failed");
                Err(FetchError::with_partial(e, state.latest(limit)))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
