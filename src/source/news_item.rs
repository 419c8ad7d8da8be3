//! The core data type shared across all news providers.
//!
//! `NewsItem` represents a single post from any provider (Telegram, Discord,
//! or a merged feed).  Every provider converts its native message format into
//! `NewsItem`s so the cache and the viewer can stay provider-agnostic.
//!
//! ## For contributors
//!
//! If you are adding a new provider you do **not** need to modify this file.
//! Build items with [`NewsItem::from_text`] so titles are derived the same way
//! everywhere, and format timestamps with [`format_timestamp`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Longest title, in Unicode code points, a polling provider will emit.
pub const MAX_TITLE_CHARS: usize = 100;

/// A single news post, normalised from any provider.
///
/// Serialises with the field names the launcher front-end expects
/// (`createdAt` in camel case).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Identifier assigned by the provider.
    pub id: i64,

    /// First line of the post.
    pub title: String,

    /// Full original text of the post, title line included.
    pub description: String,

    /// Publication time as RFC 3339 in UTC (`2024-01-15T12:00:00Z`).
    ///
    /// Providers that cannot parse the upstream timestamp pass the raw string
    /// through, so this is not guaranteed to parse.
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl NewsItem {
    /// Build an item whose title is the first line of `text` and whose
    /// description is the whole of `text`.
    ///
    /// `max_title_chars` truncates the title to that many code points;
    /// `None` keeps the first line as is.
    pub fn from_text(
        id: i64,
        text: &str,
        created_at: impl Into<String>,
        max_title_chars: Option<usize>,
    ) -> Self {
        let (first_line, _) = split_title(text);
        let title = match max_title_chars {
            Some(max) => truncate_chars(first_line, max),
            None => first_line,
        };

        Self {
            id,
            title: title.to_string(),
            description: text.to_string(),
            created_at: created_at.into(),
        }
    }

    /// The publication time, if `created_at` is valid RFC 3339.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Split `text` on its first newline into `(title, rest)`.
///
/// `rest` is empty when there is no newline.
pub fn split_title(text: &str) -> (&str, &str) {
    text.split_once('\n').unwrap_or((text, ""))
}

/// Cut `s` down to at most `max` Unicode code points.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Format an instant the way every provider reports `createdAt`.
///
/// Whole seconds with a `Z` suffix, so normalised timestamps are all the same
/// width.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn split_title_on_first_newline_only() {
        assert_eq!(split_title("Head\nBody\nMore"), ("Head", "Body\nMore"));
        assert_eq!(split_title("Single line"), ("Single line", ""));
        assert_eq!(split_title(""), ("", ""));
    }

    #[test]
    fn truncate_counts_code_points_not_bytes() {
        let cyrillic = "Ж".repeat(150);
        let cut = truncate_chars(&cyrillic, MAX_TITLE_CHARS);
        assert_eq!(cut.chars().count(), 100);
        assert_eq!(cut.len(), 200, "two bytes per Ж");
    }

    #[test]
    fn truncate_leaves_short_strings_alone() {
        assert_eq!(truncate_chars("short", 100), "short");
        let exact = "a".repeat(100);
        assert_eq!(truncate_chars(&exact, 100), exact);
    }

    #[test]
    fn from_text_keeps_full_description() {
        let item = NewsItem::from_text(7, "Server update\nNew plugins", "2024-01-15T12:00:00Z", None);
        assert_eq!(item.id, 7);
        assert_eq!(item.title, "Server update");
        assert_eq!(item.description, "Server update\nNew plugins");
        assert_eq!(item.created_at, "2024-01-15T12:00:00Z");
    }

    #[test]
    fn from_text_applies_title_limit() {
        let text = format!("{}\nbody", "x".repeat(120));
        let item = NewsItem::from_text(1, &text, "2024-01-15T12:00:00Z", Some(MAX_TITLE_CHARS));
        assert_eq!(item.title.chars().count(), 100);
        assert_eq!(item.description, text);
    }

    #[test]
    fn format_timestamp_is_fixed_width_utc() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn published_parses_normalised_and_rejects_garbage() {
        let ok = NewsItem::from_text(1, "t", "2024-01-15T12:00:00Z", None);
        assert_eq!(ok.published(), Some(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()));

        let bad = NewsItem::from_text(2, "t", "yesterday", None);
        assert!(bad.published().is_none());
    }

    #[test]
    fn serialises_created_at_in_camel_case() {
        let item = NewsItem::from_text(1, "Title", "2024-01-15T12:00:00Z", None);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["createdAt"], "2024-01-15T12:00:00Z");
        assert_eq!(json["id"], 1);
        assert!(json.get("created_at").is_none());
    }
}
