//! Wiring: turn a [`NewsConfig`] into running caches.
//!
//! Up to three feeds are exposed:
//!
//! * `telegram` — the Telegram channel alone.
//! * `discord` — the Discord channel alone.
//! * `combined` — both merged newest first, or whichever one is configured.
//!
//! Leaf providers are built once and shared by their single-source cache and
//! the combined cache.  Two independent Telegram pollers on one bot token
//! would acknowledge each other's updates and each would miss posts.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::cache::{Cache, FeedReader};
use crate::config::NewsConfig;
use crate::error::CacheError;
use crate::source::{http_client, DiscordProvider, MultiProvider, NewsItem, Provider, TelegramProvider};

/// Which feed a reader wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedKind {
    Combined,
    Telegram,
    Discord,
}

/// Stands in for a feed whose source is not configured.
pub struct EmptyFeed;

impl FeedReader for EmptyFeed {
    fn get(&self, _limit: usize, _offset: usize) -> Vec<NewsItem> {
        Vec::new()
    }
}

pub struct Feeds {
    telegram: Option<Arc<Cache>>,
    discord: Option<Arc<Cache>>,
    combined: Option<Arc<Cache>>,
}

impl Feeds {
    /// Build (but do not start) the caches for every configured source.
    pub fn from_config(config: &NewsConfig) -> Result<Self> {
        let client = http_client(config.request_timeout()).context("failed to build HTTP client")?;
        Ok(Self::build(config, client))
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied client.
    pub fn build(config: &NewsConfig, client: Client) -> Self {
        let interval = config.refresh_interval();

        let telegram: Option<Arc<dyn Provider>> = if config.telegram.is_enabled() {
            match config.telegram.credentials() {
                Ok((token, channel)) => {
                    let mut provider = TelegramProvider::new(client.clone(), token, channel);
                    if let Some(url) = &config.telegram.base_url {
                        provider = provider.with_base_url(url.as_str());
                    }
                    if let Some(max) = config.telegram.max_items {
                        provider = provider.with_max_items(max);
                    }
                    info!(channel = provider.channel(), "telegram feed configured");
                    Some(Arc::new(provider) as Arc<dyn Provider>)
                }
                Err(e) => {
                    warn!(error = %e, "telegram feed disabled");
                    None
                }
            }
        } else {
            None
        };

        let discord: Option<Arc<dyn Provider>> = if config.discord.is_enabled() {
            match config.discord.credentials() {
                Ok((token, channel)) => {
                    let mut provider = DiscordProvider::new(client, token, channel);
                    if let Some(url) = &config.discord.base_url {
                        provider = provider.with_base_url(url.as_str());
                    }
                    info!(channel = provider.channel(), "discord feed configured");
                    Some(Arc::new(provider) as Arc<dyn Provider>)
                }
                Err(e) => {
                    warn!(error = %e, "discord feed disabled");
                    None
                }
            }
        } else {
            None
        };

        let telegram_cache = telegram
            .clone()
            .map(|p| Arc::new(Cache::new("telegram", p, interval)));
        let discord_cache = discord
            .clone()
            .map(|p| Arc::new(Cache::new("discord", p, interval)));

        let combined = match (telegram, discord) {
            (Some(tg), Some(dc)) => {
                let multi = MultiProvider::new(vec![tg, dc]);
                Some(Arc::new(Cache::new("combined", Arc::new(multi), interval)))
            }
            _ => telegram_cache.clone().or_else(|| discord_cache.clone()),
        };
        if combined.is_none() {
            warn!("no news source configured, every feed will be empty");
        }

        Self {
            telegram: telegram_cache,
            discord: discord_cache,
            combined,
        }
    }

    pub fn cache(&self, kind: FeedKind) -> Option<&Arc<Cache>> {
        match kind {
            FeedKind::Combined => self.combined.as_ref(),
            FeedKind::Telegram => self.telegram.as_ref(),
            FeedKind::Discord => self.discord.as_ref(),
        }
    }

    /// The feed for `kind`, or an always-empty one if it is not configured.
    pub fn reader(&self, kind: FeedKind) -> Arc<dyn FeedReader> {
        match self.cache(kind) {
            Some(cache) => Arc::clone(cache) as Arc<dyn FeedReader>,
            None => Arc::new(EmptyFeed),
        }
    }

    /// Distinct caches; the combined feed may alias a single-source one.
    fn distinct(&self) -> Vec<&Arc<Cache>> {
        let mut caches: Vec<&Arc<Cache>> = Vec::new();
        for cache in [&self.telegram, &self.discord, &self.combined].into_iter().flatten() {
            if !caches.iter().any(|c| Arc::ptr_eq(c, cache)) {
                caches.push(cache);
            }
        }
        caches
    }

    /// Start every cache; each performs its first fetch before this returns.
    pub fn start(&self) -> Result<(), CacheError> {
        for cache in self.distinct() {
            cache.start()?;
        }
        Ok(())
    }

    /// Stop every cache and wait for their refresh threads.
    pub fn shutdown(&self) {
        for cache in self.distinct() {
            cache.stop();
        }
    }
}
