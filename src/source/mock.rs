//! Scriptable in-memory provider for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

use super::{NewsItem, Provider};
use crate::error::{FetchError, ProviderError};

pub struct MockProvider {
    name: String,
    outcome: Mutex<Option<Vec<NewsItem>>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl MockProvider {
    pub fn returning(name: &str, items: Vec<NewsItem>) -> Self {
        Self {
            name: name.to_string(),
            outcome: Mutex::new(Some(items)),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            paused: Mutex::new(false),
            resumed: Condvar::new(),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: Mutex::new(None),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            paused: Mutex::new(false),
            resumed: Condvar::new(),
        }
    }

    pub fn set_items(&self, items: Vec<NewsItem>) {
        *self.outcome.lock().unwrap() = Some(items);
    }

    pub fn set_failing(&self) {
        *self.outcome.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make subsequent fetches block until [`resume`](Self::resume).
    pub fn pause(&self) {
        *self.paused.lock().unwrap() = true;
    }

    pub fn resume(&self) {
        *self.paused.lock().unwrap() = false;
        self.resumed.notify_all();
    }

    /// Fetches that have started and not yet returned.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, limit: usize) -> Result<Vec<NewsItem>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let mut paused = self.paused.lock().unwrap();
        while *paused {
            paused = self.resumed.wait(paused).unwrap();
        }
        drop(paused);

        let result = match self.outcome.lock().unwrap().as_ref() {
            Some(items) => Ok(items.iter().take(limit).cloned().collect()),
            None => Err(FetchError::new(ProviderError::Status { status: 503 })),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// An item with the given id and timestamp.
pub fn item(id: i64, created_at: &str) -> NewsItem {
    NewsItem::from_text(id, &format!("Item {id}"), created_at, None)
}
