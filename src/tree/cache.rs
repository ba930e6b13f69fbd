//! Cached tree projection
//!
//! Wraps tree construction with a TTL cache and an explicit bypass.
//! Rebuilds are copy-on-rebuild: a fresh tree is assembled off to the
//! side and swapped in under the lock, so a reader of a still-valid tree
//! never waits on the network and never observes a half-built tree.

use log::{debug, warn};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::remote::PageStore;
use crate::remote::store::bounded_call;

use super::builder::build_tree;
use super::clock::Clock;
use super::node::DirectoryNode;

/// How the returned tree relates to the remote namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Built from an enumeration that just succeeded
    Fresh,
    /// Enumeration failed; this is the previously built tree
    Stale,
    /// Enumeration failed and nothing was ever built
    Empty,
}

/// One generation of the projected tree.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    pub root: Arc<DirectoryNode>,
    pub freshness: Freshness,
}

struct CachedTree {
    snapshot: TreeSnapshot,
    built_at: Instant,
}

pub struct TreeCache<S, C> {
    store: Arc<S>,
    clock: C,
    ttl: Duration,
    remote_timeout: Duration,
    state: Mutex<Option<CachedTree>>,
}

impl<S: PageStore, C: Clock> TreeCache<S, C> {
    pub fn new(store: Arc<S>, ttl: Duration, remote_timeout: Duration, clock: C) -> Self {
        Self {
            store,
            clock,
            ttl,
            remote_timeout,
            state: Mutex::new(None),
        }
    }

    /// Drop the cached tree so the next resolution rebuilds, cached or not.
    pub fn invalidate(&self) {
        *self.lock_state() = None;
        debug!("tree cache invalidated");
    }

    /// Return the current tree, rebuilding from a fresh enumeration when
    /// the cache is cold, expired, or explicitly bypassed.
    ///
    /// The timestamp is refreshed even when enumeration fails, so a
    /// flapping remote is retried at most once per TTL window.
    pub async fn current(&self, use_cache: bool) -> TreeSnapshot {
        let now = self.clock.now();
        let previous = {
            let state = self.lock_state();
            match state.as_ref() {
                Some(cached) => {
                    if use_cache && now.duration_since(cached.built_at) < self.ttl {
                        return cached.snapshot.clone();
                    }
                    Some(Arc::clone(&cached.snapshot.root))
                }
                None => None,
            }
        };

        let snapshot =
            match bounded_call("enumerate", self.remote_timeout, self.store.enumerate()).await {
                Ok(pages) => {
                    debug!("rebuilt page tree from {} descriptors", pages.len());
                    TreeSnapshot {
                        root: Arc::new(build_tree(&pages)),
                        freshness: Freshness::Fresh,
                    }
                }
                Err(err) => match previous {
                    Some(root) => {
                        warn!("enumeration failed, keeping previous tree: {}", err);
                        TreeSnapshot {
                            root,
                            freshness: Freshness::Stale,
                        }
                    }
                    None => {
                        warn!("enumeration failed with nothing built yet: {}", err);
                        TreeSnapshot {
                            root: Arc::new(DirectoryNode::new()),
                            freshness: Freshness::Empty,
                        }
                    }
                },
            };

        let mut state = self.lock_state();
        *state = Some(CachedTree {
            snapshot: snapshot.clone(),
            built_at: self.clock.now(),
        });
        snapshot
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Option<CachedTree>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::memory::MemoryPageStore;
    use crate::tree::clock::ManualClock;

    const TTL: Duration = Duration::from_secs(5);
    const REMOTE_TIMEOUT: Duration = Duration::from_secs(2);

    fn cache_over(
        store: &Arc<MemoryPageStore>,
    ) -> TreeCache<MemoryPageStore, ManualClock> {
        TreeCache::new(Arc::clone(store), TTL, REMOTE_TIMEOUT, ManualClock::new())
    }

    #[tokio::test]
    async fn test_cached_resolutions_share_one_enumeration() {
        let store = Arc::new(MemoryPageStore::new());
        store.seed("a:b", b"content", 1_000);
        let cache = cache_over(&store);

        let first = cache.current(true).await;
        let second = cache.current(true).await;

        assert_eq!(store.enumerate_calls(), 1);
        assert_eq!(first.freshness, Freshness::Fresh);
        assert!(Arc::ptr_eq(&first.root, &second.root));
    }

    #[tokio::test]
    async fn test_expired_cache_rebuilds_once() {
        let store = Arc::new(MemoryPageStore::new());
        let cache = TreeCache::new(
            Arc::clone(&store),
            TTL,
            REMOTE_TIMEOUT,
            ManualClock::new(),
        );

        cache.current(true).await;
        cache.clock.advance(TTL + Duration::from_secs(1));
        cache.current(true).await;
        cache.current(true).await;

        assert_eq!(store.enumerate_calls(), 2);
    }

    #[tokio::test]
    async fn test_bypass_forces_rebuild() {
        let store = Arc::new(MemoryPageStore::new());
        let cache = cache_over(&store);

        cache.current(true).await;
        cache.current(false).await;

        assert_eq!(store.enumerate_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_rebuild_within_ttl() {
        let store = Arc::new(MemoryPageStore::new());
        store.seed("a", b"x", 1_000);
        let cache = cache_over(&store);

        cache.current(true).await;
        cache.invalidate();
        cache.current(true).await;

        assert_eq!(store.enumerate_calls(), 2);
    }

    #[tokio::test]
    async fn test_enumeration_failure_keeps_previous_tree() {
        let store = Arc::new(MemoryPageStore::new());
        store.seed("a:b", b"content", 1_000);
        let cache = TreeCache::new(
            Arc::clone(&store),
            TTL,
            REMOTE_TIMEOUT,
            ManualClock::new(),
        );

        let fresh = cache.current(true).await;
        assert_eq!(fresh.freshness, Freshness::Fresh);

        store.set_fail_enumerate(true);
        cache.clock.advance(TTL + Duration::from_secs(1));
        let stale = cache.current(true).await;

        assert_eq!(stale.freshness, Freshness::Stale);
        assert!(Arc::ptr_eq(&stale.root, &fresh.root));
    }

    #[tokio::test]
    async fn test_failed_rebuild_still_refreshes_timestamp() {
        let store = Arc::new(MemoryPageStore::new());
        store.set_fail_enumerate(true);
        let cache = cache_over(&store);

        cache.current(true).await;
        cache.current(true).await;

        // The failure is cached for a full TTL window; no retry storm.
        assert_eq!(store.enumerate_calls(), 1);
    }

    #[tokio::test]
    async fn test_never_built_failure_yields_empty_tree() {
        let store = Arc::new(MemoryPageStore::new());
        store.set_fail_enumerate(true);
        let cache = cache_over(&store);

        let snapshot = cache.current(true).await;

        assert_eq!(snapshot.freshness, Freshness::Empty);
        assert!(snapshot.root.is_empty());
    }
}
