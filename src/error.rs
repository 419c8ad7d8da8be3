//! Error types for providers, the cache and configuration loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::source::NewsItem;

/// Why a single provider fetch failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (DNS, connect, reset, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success HTTP status.
    #[error("HTTP error: {status}")]
    Status { status: u16 },

    /// The response body was not the JSON shape we expect.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The upstream answered `ok: false`.
    #[error("upstream rejected request: {0}")]
    Rejected(String),

    /// A token or channel was not supplied.
    #[error("not configured: missing {field}")]
    NotConfigured { field: &'static str },

    /// Every sub-provider of a merged feed failed.
    #[error("all {attempted} sources failed")]
    AllSourcesFailed { attempted: usize },
}

/// A failed fetch, plus whatever the provider could still offer.
///
/// Stateful providers return their last known items in `partial` so callers
/// that want best-effort data can use it.  An error never implies that
/// `partial` is empty.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct FetchError {
    #[source]
    pub error: ProviderError,
    pub partial: Vec<NewsItem>,
}

impl FetchError {
    pub fn new(error: ProviderError) -> Self {
        Self {
            error,
            partial: Vec::new(),
        }
    }

    pub fn with_partial(error: ProviderError, partial: Vec<NewsItem>) -> Self {
        Self { error, partial }
    }
}

impl From<ProviderError> for FetchError {
    fn from(error: ProviderError) -> Self {
        Self::new(error)
    }
}

/// Lifecycle errors from [`crate::cache::Cache`].
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache is already running")]
    AlreadyRunning,

    /// A stopped cache cannot be restarted.
    #[error("cache has been stopped")]
    Stopped,

    #[error("failed to spawn refresh thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Errors while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// `true` when the file simply does not exist.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
