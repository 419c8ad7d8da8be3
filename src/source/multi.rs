//! Merged feed over several providers.

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{NewsItem, Provider};
use crate::error::{FetchError, ProviderError};

/// Fans a fetch out to each sub-provider in order and merges the results
/// newest first.
///
/// A failing sub-provider is logged and skipped.  Only when every
/// sub-provider fails does the merged fetch fail, so a cache in front of it
/// keeps serving its previous snapshot through a total outage.
pub struct MultiProvider {
    providers: Vec<Arc<dyn Provider>>,
}

impl MultiProvider {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Sort newest first by parsed `created_at`.
///
/// Items whose timestamp does not parse sink below all dated items; ties keep
/// their fetch order.
pub fn sort_newest_first(items: &mut [NewsItem]) {
    items.sort_by_cached_key(|item| Reverse(item.published()));
}

impl Provider for MultiProvider {
    fn name(&self) -> &str {
        "multi"
    }

    fn fetch(&self, limit: usize) -> Result<Vec<NewsItem>, FetchError> {
        let mut all = Vec::new();
        let mut failed = 0;

        for provider in &self.providers {
            match provider.fetch(limit) {
                Ok(items) => all.extend(items),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "provider failed, skipping");
                    failed += 1;
                }
            }
        }

        if failed > 0 && failed == self.providers.len() {
            return Err(FetchError::new(ProviderError::AllSourcesFailed { attempted: failed }));
        }

        let undated = all.iter().filter(|i| i.published().is_none()).count();
        if undated > 0 {
            warn!(undated, "items with unparseable createdAt sorted last");
        }

        sort_newest_first(&mut all);
        all.truncate(limit);
        debug!(sources = self.providers.len(), failed, merged = all.len(), "merged feed");
        Ok(all)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::mock::{item, MockProvider};

    fn multi(providers: Vec<MockProvider>) -> MultiProvider {
        MultiProvider::new(
            providers
                .into_iter()
                .map(|p| Arc::new(p) as Arc<dyn Provider>)
                .collect(),
        )
    }

    #[test]
    fn merges_newest_first() {
        let feed = multi(vec![
            MockProvider::returning("older", vec![item(2, "2024-01-14T10:00:00Z")]),
            MockProvider::returning("newer", vec![item(1, "2024-01-15T12:00:00Z")]),
        ]);

        let items = feed.fetch(10).unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn truncates_to_limit() {
        let feed = multi(vec![
            MockProvider::returning("a", vec![item(1, "2024-01-15T12:00:00Z")]),
            MockProvider::returning("b", vec![item(2, "2024-01-14T10:00:00Z")]),
        ]);

        let items = feed.fetch(1).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].created_at, "2024-01-15T12:00:00Z");
    }

    #[test]
    fn failing_source_is_skipped() {
        let feed = multi(vec![
            MockProvider::failing("down"),
            MockProvider::returning("up", vec![item(5, "2024-01-15T12:00:00Z")]),
        ]);

        let items = feed.fetch(10).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 5);
    }

    #[test]
    fn all_sources_failing_is_an_error() {
        let feed = multi(vec![MockProvider::failing("a"), MockProvider::failing("b")]);

        let err = feed.fetch(10).unwrap_err();
        assert!(matches!(err.error, ProviderError::AllSourcesFailed { attempted: 2 }));
    }

    #[test]
    fn no_sources_is_an_empty_feed() {
        let feed = MultiProvider::new(Vec::new());
        assert!(feed.is_empty());
        assert!(feed.fetch(10).unwrap().is_empty());
    }

    #[test]
    fn every_source_is_asked_for_the_full_limit() {
        let a = Arc::new(MockProvider::returning("a", vec![item(1, "2024-01-01T00:00:00Z")]));
        let b = Arc::new(MockProvider::returning("b", vec![item(2, "2024-01-02T00:00:00Z")]));
        let feed = MultiProvider::new(vec![a.clone() as Arc<dyn Provider>, b.clone()]);

        feed.fetch(3).unwrap();
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[test]
    fn unparseable_timestamps_sort_last() {
        let mut items = vec![
            item(1, "last tuesday"),
            item(2, "2024-01-14T10:00:00Z"),
            item(3, "2024-01-15T12:00:00Z"),
        ];
        sort_newest_first(&mut items);
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn equal_timestamps_keep_source_order() {
        let mut items = vec![item(1, "2024-01-15T12:00:00Z"), item(2, "2024-01-15T12:00:00Z")];
        sort_newest_first(&mut items);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[1].id, 2);
    }
}
