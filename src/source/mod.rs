//! News provider abstraction layer.
//!
//! This module defines the [`Provider`] trait and the common [`NewsItem`]
//! type.  Concrete providers live in sub-modules:
//!
//! * [`telegram`] — incremental long-poll over a bot's update stream.
//! * [`discord`] — stateless REST fetch of a channel's latest messages.
//! * [`multi`] — merges several providers into one newest-first feed.
//!
//! ## For contributors — adding a new provider
//!
//! 1. Create a new file in this directory (e.g. `mastodon.rs`).
//! 2. Define a struct and implement [`Provider`] for it.
//! 3. Add `mod mastodon;` below and re-export your struct in the `pub use` block.
//! 4. Construct it in [`crate::feeds`] and hand it to a [`crate::cache::Cache`].
//!
//! The cache, the merge layer and the viewer are all provider-agnostic.

pub mod discord;
pub mod multi;
mod news_item;
pub mod telegram;

#[cfg(test)]
pub(crate) mod mock;
#[cfg(test)]
pub(crate) mod test_server;

pub use discord::DiscordProvider;
pub use multi::MultiProvider;
pub use news_item::{format_timestamp, split_title, truncate_chars, NewsItem, MAX_TITLE_CHARS};
pub use telegram::TelegramProvider;

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::{FetchError, ProviderError};

/// Trait that every news provider must implement.
///
/// A [`crate::cache::Cache`] calls [`fetch()`](Provider::fetch) from its
/// background refresh thread (and once from the caller during start-up), and
/// one provider may be shared by several caches, so implementations must be
/// [`Send`] + [`Sync`] and guard any internal state themselves.
///
/// ## Implementing a new provider
///
/// ```ignore
/// pub struct MyProvider { /* config fields */ }
///
/// impl Provider for MyProvider {
///     fn name(&self) -> &str { "my-provider" }
///
///     fn fetch(&self, limit: usize) -> Result<Vec<NewsItem>, FetchError> {
///         // Perform HTTP / IO, then convert into at most `limit` NewsItems.
///         todo!()
///     }
/// }
/// ```
pub trait Provider: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Fetch at most `limit` items.
    ///
    /// Ordering is provider-defined.  On failure the returned [`FetchError`]
    /// may still carry best-effort items in `partial`.
    fn fetch(&self, limit: usize) -> Result<Vec<NewsItem>, FetchError>;
}

/// Build the blocking HTTP client shared by the leaf providers.
///
/// `timeout` of `None` means requests may block for as long as the upstream
/// takes.
pub fn http_client(timeout: Option<Duration>) -> Result<Client, ProviderError> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Send `request` and decode a JSON body.
///
/// Non-2xx responses become [`ProviderError::Status`] without looking at the
/// body.  Transport errors have their URL stripped, since bot tokens travel
/// in the path.
pub(crate) fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
    let response = request.send().map_err(reqwest::Error::without_url)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
        });
    }
    let body = response.text().map_err(reqwest::Error::without_url)?;
    Ok(serde_json::from_str(&body)?)
}
