//! livescroll-news — a background-refreshed news cache over Telegram and
//! Discord channels.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────────────┐
//! │ TelegramProvider │──┐
//! └──────────────────┘  │   ┌───────────────┐  fetch()  ┌─────────┐  get()  ┌────────┐
//!                       ├──►│ MultiProvider │ ◄──────── │  Cache  │ ◄────── │ reader │
//! ┌──────────────────┐  │   └───────────────┘  (thread) └─────────┘         └────────┘
//! │ DiscordProvider  │──┘
//! └──────────────────┘
//! ```
//!
//! * **`source/`** — the [`Provider`](source::Provider) trait, the shared
//!   [`NewsItem`](source::NewsItem) type and the concrete providers.
//! * **`cache`** — the snapshot cache and its refresh thread.
//! * **`feeds`** — builds the telegram / discord / combined caches from config.
//! * **`config`** — the JSON configuration file.
//! * **`error`** — error types.

pub mod cache;
pub mod config;
pub mod error;
pub mod feeds;
pub mod source;

pub use cache::{Cache, FeedReader};
pub use error::{CacheError, ConfigError, FetchError, ProviderError};
pub use feeds::{FeedKind, Feeds};
pub use source::{NewsItem, Provider};
