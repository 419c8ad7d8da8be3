//! Background-refreshed news cache.
//!
//! A [`Cache`] owns one [`Provider`] and a snapshot of its last successful
//! fetch.  A dedicated thread re-fetches on a timer and swaps the snapshot in
//! place; readers call [`Cache::get`] and never wait on the network.
//!
//! ```text
//!            start()                      stop()
//!  Created ──────────► Running ─────────────────► Stopped
//!            │            │ every `interval`
//!            │            ▼
//!            └──► refresh: provider.fetch(REFRESH_BATCH)
//!                   Ok  → replace snapshot
//!                   Err → keep snapshot (stale-serve)
//! ```
//!
//! ## For contributors
//!
//! The refresh thread is the only writer.  The write lock is held just long
//! enough to swap an `Arc`, so a slow upstream never blocks readers.  Stopping
//! is a channel send plus a `join`, which is why no refresh can still be in
//! flight once [`Cache::stop`] returns.

use std::mem;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::CacheError;
use crate::source::{NewsItem, Provider};

/// How many items each refresh asks the provider for.
pub const REFRESH_BATCH: usize = 100;

/// Shortest refresh period accepted; anything lower would spin.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Longest refresh period accepted, so the schedule never overflows `Instant`.
const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Read access to a paginated feed.
///
/// This is what the serving layer (the terminal viewer) depends on, so it can
/// be driven by a fixed list in tests.
pub trait FeedReader: Send + Sync {
    /// Up to `limit` items starting at `offset`; `limit == 0` means no limit.
    fn get(&self, limit: usize, offset: usize) -> Vec<NewsItem>;
}

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

enum Lifecycle {
    Created,
    /// First fetch in progress; the lifecycle lock is not held across it.
    Starting,
    Running(Worker),
    Stopped,
}

/// State shared between the cache handle and its refresh thread.
struct Shared {
    name: String,
    provider: Arc<dyn Provider>,
    snapshot: RwLock<Arc<Vec<NewsItem>>>,
}

impl Shared {
    fn refresh(&self) {
        match self.provider.fetch(REFRESH_BATCH) {
            Ok(items) => {
                let count = items.len();
                *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(items);
                debug!(cache = %self.name, count, "snapshot refreshed");
            }
            Err(e) => {
                warn!(
                    cache = %self.name,
                    provider = self.provider.name(),
                    error = %e,
                    "refresh failed, serving stale snapshot"
                );
            }
        }
    }

    fn current(&self) -> Arc<Vec<NewsItem>> {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*snapshot)
    }
}

/// A provider fronted by a periodically refreshed snapshot.
pub struct Cache {
    shared: Arc<Shared>,
    interval: Duration,
    lifecycle: Mutex<Lifecycle>,
}

impl Cache {
    /// Bind a cache to `provider`.  Nothing is fetched until [`start`](Self::start).
    pub fn new(name: impl Into<String>, provider: Arc<dyn Provider>, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                provider,
                snapshot: RwLock::new(Arc::new(Vec::new())),
            }),
            interval: interval.clamp(MIN_INTERVAL, MAX_INTERVAL),
            lifecycle: Mutex::new(Lifecycle::Created),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch once on the calling thread, then spawn the refresh loop.
    ///
    /// A failing first fetch is not an error: the cache starts empty and the
    /// loop keeps trying.  If [`stop`](Self::stop) runs while the first fetch
    /// is in progress, no loop is spawned and this returns
    /// [`CacheError::Stopped`].
    pub fn start(&self) -> Result<(), CacheError> {
        {
            let mut lifecycle = self.lock_lifecycle();
            match *lifecycle {
                Lifecycle::Created => *lifecycle = Lifecycle::Starting,
                Lifecycle::Starting | Lifecycle::Running(_) => return Err(CacheError::AlreadyRunning),
                Lifecycle::Stopped => return Err(CacheError::Stopped),
            }
        }

        self.shared.refresh();

        let mut lifecycle = self.lock_lifecycle();
        if !matches!(*lifecycle, Lifecycle::Starting) {
            debug!(cache = %self.shared.name, "stopped during first fetch");
            return Err(CacheError::Stopped);
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        let spawned = thread::Builder::new()
            .name(format!("refresh-{}", self.shared.name))
            .spawn(move || refresh_loop(&shared, interval, &stop_rx));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                *lifecycle = Lifecycle::Stopped;
                return Err(CacheError::Spawn(e));
            }
        };

        *lifecycle = Lifecycle::Running(Worker { stop_tx, handle });
        info!(cache = %self.shared.name, interval_secs = interval.as_secs_f64(), "cache started");
        Ok(())
    }

    /// Signal the refresh loop and wait for it to exit.
    ///
    /// Safe to call more than once and on a cache that never started.  After
    /// this returns the snapshot no longer changes.
    pub fn stop(&self) {
        let previous = mem::replace(&mut *self.lock_lifecycle(), Lifecycle::Stopped);

        if let Lifecycle::Running(worker) = previous {
            // A send error means the loop already exited; join still applies.
            let _ = worker.stop_tx.send(());
            if worker.handle.join().is_err() {
                warn!(cache = %self.shared.name, "refresh thread panicked");
            }
            info!(cache = %self.shared.name, "cache stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lock_lifecycle(), Lifecycle::Running(_))
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of items in the current snapshot.
    pub fn len(&self) -> usize {
        self.shared.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of up to `limit` items starting at `offset`.
    ///
    /// `limit == 0` returns everything from `offset` on; an `offset` past the
    /// end returns an empty list.
    pub fn get(&self, limit: usize, offset: usize) -> Vec<NewsItem> {
        let snapshot = self.shared.current();
        let Some(rest) = snapshot.get(offset..) else {
            return Vec::new();
        };
        let end = if limit == 0 { rest.len() } else { limit.min(rest.len()) };
        rest[..end].to_vec()
    }
}

impl FeedReader for Cache {
    fn get(&self, limit: usize, offset: usize) -> Vec<NewsItem> {
        Cache::get(self, limit, offset)
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Refresh on a fixed schedule until told to stop.
///
/// Ticks missed while a slow fetch was running are skipped, not queued.
fn refresh_loop(shared: &Shared, interval: Duration, stop_rx: &mpsc::Receiver<()>) {
    let mut next = Instant::now() + interval;
    loop {
        let wait = next.saturating_duration_since(Instant::now());
        match stop_rx.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {
                shared.refresh();
                next += interval;
                let now = Instant::now();
                if next < now {
                    next = now + interval;
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
