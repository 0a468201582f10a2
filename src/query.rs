//! Query cache and fetch orchestrator.
//!
//! A process-wide map from cache key (page index, page size) to fetch state.
//! Display reads go through [`QueryCache::snapshot`], which keeps the last
//! shown page on screen while a changed key is still in flight. Successful
//! foreground fetches trigger a background prefetch of the following page so
//! an advance is usually served from cache.

use std::collections::HashMap;
use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::error::Result;
use crate::pagination::QueryKey;
use crate::responses::TeamsPage;

/// Successful results younger than this are served without a refetch.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30);

/// The remote source of team pages. The HTTP client implements this; tests
/// substitute a scripted source.
#[async_trait]
pub trait TeamsSource: Send + Sync {
    async fn fetch_page(&self, key: QueryKey) -> Result<TeamsPage>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Per-key fetch state. Results supersede one another; data survives a later
/// failed refetch for the same key.
#[derive(Default)]
struct QueryState {
    status: Option<QueryStatus>,
    data: Option<TeamsPage>,
    error: Option<String>,
    fetched_at: Option<Instant>,
    // ticket of the newest fetch issued for this key; older resolutions
    // are discarded (last request wins)
    issued: u64,
    force_refetch: bool,
}

impl QueryState {
    fn status(&self) -> QueryStatus {
        self.status.unwrap_or(QueryStatus::Idle)
    }

    fn is_fresh(&self, stale_after: Duration) -> bool {
        self.status() == QueryStatus::Success
            && self
                .fetched_at
                .map(|at| at.elapsed() < stale_after)
                .unwrap_or(false)
    }
}

/// What the view gets to render: the keyed entry's status plus, when that key
/// has no data of its own yet, the last shown page flagged as previous.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub status: QueryStatus,
    pub data: Option<TeamsPage>,
    pub error: Option<String>,
    /// Data belongs to a previously displayed key, kept on screen while the
    /// current key resolves.
    pub is_previous: bool,
}

impl QuerySnapshot {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }
}

enum Plan {
    Serve,
    Wait,
    Start(u64),
}

#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, QueryState>>>,
    // key whose data the view last rendered; fallback for snapshots
    last_shown: Arc<Mutex<Option<QueryKey>>>,
    changed: Arc<Notify>,
    ticket: Arc<AtomicU64>,
    source: Arc<dyn TeamsSource>,
    stale_after: Duration,
}

impl QueryCache {
    pub fn new(source: Arc<dyn TeamsSource>) -> Self {
        Self::with_stale_after(source, DEFAULT_STALE_AFTER)
    }

    pub fn with_stale_after(source: Arc<dyn TeamsSource>, stale_after: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            last_shown: Arc::new(Mutex::new(None)),
            changed: Arc::new(Notify::new()),
            ticket: Arc::new(AtomicU64::new(0)),
            source,
            stale_after,
        }
    }

    /// Foreground fetch for `key`. Fresh cached data is served as-is; an
    /// in-flight fetch for the same key is awaited rather than duplicated;
    /// anything else issues a request. Returns the snapshot to render.
    pub async fn fetch(&self, key: QueryKey) -> QuerySnapshot {
        let plan = {
            let mut entries = self.entries.lock().unwrap();
            let entry = entries.entry(key).or_default();
            match entry.status() {
                QueryStatus::Success if entry.is_fresh(self.stale_after) && !entry.force_refetch => {
                    Plan::Serve
                }
                QueryStatus::Loading if !entry.force_refetch => Plan::Wait,
                _ => {
                    let ticket = self.ticket.fetch_add(1, Ordering::Relaxed) + 1;
                    entry.status = Some(QueryStatus::Loading);
                    entry.issued = ticket;
                    entry.force_refetch = false;
                    Plan::Start(ticket)
                }
            }
        };

        match plan {
            Plan::Serve => {}
            Plan::Wait => self.wait_resolved(key).await,
            Plan::Start(ticket) => {
                let result = self.source.fetch_page(key).await;
                self.resolve(key, ticket, result, FetchOrigin::Foreground);
            }
        }

        self.mark_shown(key);
        self.snapshot(key)
    }

    /// Background prefetch: one fetch for `key` unless it is already cached
    /// or in flight.
    pub fn prefetch(&self, key: QueryKey) {
        let ticket = {
            let mut entries = self.entries.lock().unwrap();
            let entry = entries.entry(key).or_default();
            match entry.status() {
                QueryStatus::Loading => return,
                _ if entry.data.is_some() => return,
                _ => {
                    let ticket = self.ticket.fetch_add(1, Ordering::Relaxed) + 1;
                    entry.status = Some(QueryStatus::Loading);
                    entry.issued = ticket;
                    entry.force_refetch = false;
                    ticket
                }
            }
        };

        let cache = self.clone();
        tokio::spawn(async move {
            let result = cache.source.fetch_page(key).await;
            cache.resolve(key, ticket, result, FetchOrigin::Prefetch);
        });
    }

    /// Read-only view for rendering. While the keyed entry has no data of
    /// its own, the last shown page is carried over and flagged as previous.
    pub fn snapshot(&self, key: QueryKey) -> QuerySnapshot {
        let entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get(&key) {
            if entry.data.is_some() {
                return QuerySnapshot {
                    status: entry.status(),
                    data: entry.data.clone(),
                    error: entry.error.clone(),
                    is_previous: false,
                };
            }
        }

        let status = entries.get(&key).map(|e| e.status()).unwrap_or(QueryStatus::Idle);
        let error = entries.get(&key).and_then(|e| e.error.clone());
        let previous = self
            .last_shown
            .lock()
            .unwrap()
            .and_then(|shown| entries.get(&shown))
            .and_then(|e| e.data.clone());

        QuerySnapshot {
            status,
            is_previous: previous.is_some(),
            data: previous,
            error,
        }
    }

    /// Force the next fetch for `key` to hit the source, bypassing the
    /// freshness window and overriding any in-flight request.
    pub fn refresh(&self, key: QueryKey) {
        let mut entries = self.entries.lock().unwrap();
        entries.entry(key).or_default().force_refetch = true;
    }

    fn resolve(&self, key: QueryKey, ticket: u64, result: Result<TeamsPage>, origin: FetchOrigin) {
        let next = {
            let mut entries = self.entries.lock().unwrap();
            let entry = entries.entry(key).or_default();
            if entry.issued != ticket {
                // a newer fetch for this key was issued; discard
                return;
            }
            match result {
                Ok(page) => {
                    let next = page.has_next().then(|| key.next());
                    entry.status = Some(QueryStatus::Success);
                    entry.error = None;
                    entry.fetched_at = Some(Instant::now());
                    entry.data = Some(page);
                    next
                }
                Err(e) => {
                    entry.status = Some(QueryStatus::Error);
                    entry.error = Some(e.display_message());
                    entry.fetched_at = Some(Instant::now());
                    // earlier data for this key is superseded, not destroyed
                    None
                }
            }
        };

        // chained prefetches would walk the whole table; only user-driven
        // fetches look ahead
        if origin == FetchOrigin::Foreground {
            if let Some(next_key) = next {
                self.prefetch(next_key);
            }
        }

        self.changed.notify_waiters();
    }

    async fn wait_resolved(&self, key: QueryKey) {
        loop {
            let mut notified = pin!(self.changed.notified());
            notified.as_mut().enable();
            let loading = {
                let entries = self.entries.lock().unwrap();
                entries
                    .get(&key)
                    .map(|e| e.status() == QueryStatus::Loading)
                    .unwrap_or(false)
            };
            if !loading {
                return;
            }
            notified.await;
        }
    }

    fn mark_shown(&self, key: QueryKey) {
        let entries = self.entries.lock().unwrap();
        if entries.get(&key).map(|e| e.data.is_some()).unwrap_or(false) {
            *self.last_shown.lock().unwrap() = Some(key);
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum FetchOrigin {
    Foreground,
    Prefetch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CourtsideError;
    use crate::types::Team;
    use std::collections::VecDeque;

    fn team(id: u64, name: &str) -> Team {
        Team {
            id,
            abbreviation: name[..3.min(name.len())].to_uppercase(),
            city: format!("{name} City"),
            conference: if id % 2 == 0 { "East" } else { "West" }.to_string(),
            division: "Atlantic".to_string(),
            full_name: format!("{name} Full"),
            name: name.to_string(),
        }
    }

    fn page(index: u32, size: u32, total_pages: u32) -> TeamsPage {
        let current = index + 1;
        TeamsPage {
            data: (0..size)
                .map(|i| team(u64::from(index * size + i + 1), &format!("team-{index}-{i}")))
                .collect(),
            meta: crate::responses::PageMeta {
                current_page: current,
                next_page: (current < total_pages).then_some(current + 1),
                per_page: size,
                total_count: u64::from(total_pages * size),
                total_pages,
            },
        }
    }

    enum Scripted {
        Ok { page: TeamsPage, delay: Duration },
        Err { status: u16, delay: Duration },
    }

    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<HashMap<QueryKey, VecDeque<Scripted>>>,
        calls: Mutex<Vec<QueryKey>>,
    }

    impl ScriptedSource {
        fn script(&self, key: QueryKey, response: Scripted) {
            self.responses
                .lock()
                .unwrap()
                .entry(key)
                .or_default()
                .push_back(response);
        }

        fn ok(&self, key: QueryKey, page: TeamsPage) {
            self.script(
                key,
                Scripted::Ok {
                    page,
                    delay: Duration::ZERO,
                },
            );
        }

        fn calls_for(&self, key: QueryKey) -> usize {
            self.calls.lock().unwrap().iter().filter(|k| **k == key).count()
        }
    }

    #[async_trait]
    impl TeamsSource for ScriptedSource {
        async fn fetch_page(&self, key: QueryKey) -> Result<TeamsPage> {
            self.calls.lock().unwrap().push(key);
            let scripted = self
                .responses
                .lock()
                .unwrap()
                .get_mut(&key)
                .and_then(|queue| queue.pop_front());
            match scripted {
                Some(Scripted::Ok { page, delay }) => {
                    tokio::time::sleep(delay).await;
                    Ok(page)
                }
                Some(Scripted::Err { status, delay }) => {
                    tokio::time::sleep(delay).await;
                    Err(CourtsideError::Api {
                        status,
                        message: "Internal Server Error".to_string(),
                    })
                }
                None => Err(CourtsideError::Api {
                    status: 404,
                    message: format!("no scripted response for {key:?}"),
                }),
            }
        }
    }

    fn cache_with(source: Arc<ScriptedSource>) -> QueryCache {
        QueryCache::new(source)
    }

    #[tokio::test]
    async fn first_fetch_returns_success_snapshot() {
        let source = Arc::new(ScriptedSource::default());
        let key = QueryKey::new(0, 5);
        source.ok(key, page(0, 5, 1));
        let cache = cache_with(source.clone());

        let snap = cache.fetch(key).await;
        assert_eq!(snap.status, QueryStatus::Success);
        assert!(!snap.is_previous);
        assert_eq!(snap.data.unwrap().data.len(), 5);
    }

    #[tokio::test]
    async fn fresh_key_is_not_refetched() {
        let source = Arc::new(ScriptedSource::default());
        let key = QueryKey::new(0, 5);
        source.ok(key, page(0, 5, 1));
        let cache = cache_with(source.clone());

        cache.fetch(key).await;
        let snap = cache.fetch(key).await;
        assert_eq!(snap.status, QueryStatus::Success);
        assert_eq!(source.calls_for(key), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_key_is_refetched_after_window() {
        let source = Arc::new(ScriptedSource::default());
        let key = QueryKey::new(0, 5);
        source.ok(key, page(0, 5, 1));
        source.ok(key, page(0, 5, 1));
        let cache = QueryCache::with_stale_after(source.clone(), Duration::from_millis(50));

        cache.fetch(key).await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        cache.fetch(key).await;
        assert_eq!(source.calls_for(key), 2);
    }

    #[tokio::test]
    async fn successful_fetch_prefetches_next_page() {
        let source = Arc::new(ScriptedSource::default());
        let first = QueryKey::new(0, 5);
        let second = first.next();
        source.ok(first, page(0, 5, 3));
        source.ok(second, page(1, 5, 3));
        let cache = cache_with(source.clone());

        cache.fetch(first).await;
        // let the spawned prefetch run
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        assert_eq!(source.calls_for(second), 1);
        // advancing is served from cache, no loading state and no new call
        let snap = cache.fetch(second).await;
        assert_eq!(snap.status, QueryStatus::Success);
        assert!(!snap.is_previous);
        assert_eq!(source.calls_for(second), 1);
    }

    #[tokio::test]
    async fn last_page_triggers_no_prefetch() {
        let source = Arc::new(ScriptedSource::default());
        let key = QueryKey::new(2, 5);
        source.ok(key, page(2, 5, 3));
        let cache = cache_with(source.clone());

        cache.fetch(key).await;
        tokio::task::yield_now().await;
        assert_eq!(source.calls_for(key.next()), 0);
    }

    #[tokio::test]
    async fn changed_key_keeps_previous_data_visible() {
        let source = Arc::new(ScriptedSource::default());
        let first = QueryKey::new(0, 5);
        source.ok(first, page(0, 5, 1));
        let cache = cache_with(source.clone());
        cache.fetch(first).await;

        // nothing cached for the new key yet: snapshot falls back
        let unseen = QueryKey::new(0, 25);
        let snap = cache.snapshot(unseen);
        assert_eq!(snap.status, QueryStatus::Idle);
        assert!(snap.is_previous);
        assert_eq!(snap.data.unwrap().meta.per_page, 5);
    }

    #[tokio::test]
    async fn page_size_change_does_not_touch_old_entry() {
        let source = Arc::new(ScriptedSource::default());
        let small = QueryKey::new(0, 5);
        let large = QueryKey::new(0, 25);
        source.ok(small, page(0, 5, 2));
        source.ok(large, page(0, 25, 1));
        let cache = cache_with(source.clone());

        let before = cache.fetch(small).await;
        cache.fetch(large).await;
        let after = cache.snapshot(small);
        assert_eq!(after.status, QueryStatus::Success);
        assert_eq!(after.data, before.data);
    }

    #[tokio::test]
    async fn server_error_marks_only_its_key() {
        let source = Arc::new(ScriptedSource::default());
        let first = QueryKey::new(0, 5);
        let second = first.next();
        source.ok(first, page(0, 5, 1));
        source.script(
            second,
            Scripted::Err {
                status: 500,
                delay: Duration::ZERO,
            },
        );
        let cache = cache_with(source.clone());

        cache.fetch(first).await;
        let snap = cache.fetch(second).await;
        assert_eq!(snap.status, QueryStatus::Error);
        assert!(snap.error.unwrap().contains("500"));
        // previous page stays on screen
        assert!(snap.is_previous);
        assert!(snap.data.is_some());

        let untouched = cache.snapshot(first);
        assert_eq!(untouched.status, QueryStatus::Success);
        assert!(!untouched.is_previous);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_fetch_wins_over_older_in_flight() {
        let source = Arc::new(ScriptedSource::default());
        let key = QueryKey::new(0, 5);
        let mut slow = page(0, 5, 1);
        slow.data.truncate(1);
        source.script(
            key,
            Scripted::Ok {
                page: slow,
                delay: Duration::from_millis(500),
            },
        );
        source.ok(key, page(0, 5, 1));
        let cache = cache_with(source.clone());

        // old fetch in flight via prefetch
        cache.prefetch(key);
        tokio::task::yield_now().await;

        // user forces a refresh; the new fetch overrides the old ticket
        cache.refresh(key);
        let snap = cache.fetch(key).await;
        assert_eq!(snap.data.as_ref().unwrap().data.len(), 5);

        // let the old fetch resolve late; its result must be discarded
        tokio::time::sleep(Duration::from_millis(600)).await;
        let snap = cache.snapshot(key);
        assert_eq!(snap.data.unwrap().data.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_joins_in_flight_request_for_same_key() {
        let source = Arc::new(ScriptedSource::default());
        let key = QueryKey::new(0, 5);
        source.script(
            key,
            Scripted::Ok {
                page: page(0, 5, 1),
                delay: Duration::from_millis(100),
            },
        );
        let cache = cache_with(source.clone());

        cache.prefetch(key);
        tokio::task::yield_now().await;

        // joins the prefetch instead of issuing a duplicate
        let snap = cache.fetch(key).await;
        assert_eq!(snap.status, QueryStatus::Success);
        assert_eq!(source.calls_for(key), 1);
    }

    #[tokio::test]
    async fn refresh_bypasses_freshness_window() {
        let source = Arc::new(ScriptedSource::default());
        let key = QueryKey::new(0, 5);
        source.ok(key, page(0, 5, 1));
        source.ok(key, page(0, 5, 1));
        let cache = cache_with(source.clone());

        cache.fetch(key).await;
        cache.refresh(key);
        cache.fetch(key).await;
        assert_eq!(source.calls_for(key), 2);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_superseded_data() {
        let source = Arc::new(ScriptedSource::default());
        let key = QueryKey::new(0, 5);
        source.ok(key, page(0, 5, 1));
        source.script(
            key,
            Scripted::Err {
                status: 503,
                delay: Duration::ZERO,
            },
        );
        let cache = cache_with(source.clone());

        cache.fetch(key).await;
        cache.refresh(key);
        let snap = cache.fetch(key).await;
        assert_eq!(snap.status, QueryStatus::Error);
        // the old payload is still there for display
        assert!(!snap.is_previous);
        assert!(snap.data.is_some());
    }
}
