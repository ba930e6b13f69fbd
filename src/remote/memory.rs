//! In-memory page store
//!
//! A `PageStore` backed by a map, with operation recording and failure
//! injection. Used by the crate's own tests and handy for driving the
//! engine without a live wiki.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use crate::error::RemoteError;

use super::store::{LockAck, PageDescriptor, PageStore};

#[derive(Debug, Clone)]
struct PageRecord {
    content: Vec<u8>,
    modified_at: i64,
}

/// In-memory remote store.
///
/// `store` with empty content removes the page, and a successful store
/// releases the caller's lock, matching the live remote's behavior. Every
/// call is appended to a journal (`"lock:<id>"`, `"store:<id>"`, ...) so
/// tests can assert on call ordering.
pub struct MemoryPageStore {
    pages: Mutex<BTreeMap<String, PageRecord>>,
    locked: Mutex<BTreeSet<String>>,
    journal: Mutex<Vec<String>>,
    next_modified: AtomicI64,
    enumerate_calls: AtomicUsize,
    fail_enumerate: AtomicBool,
    fail_store: AtomicBool,
    deny_lock: AtomicBool,
    deny_unlock: AtomicBool,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(BTreeMap::new()),
            locked: Mutex::new(BTreeSet::new()),
            journal: Mutex::new(Vec::new()),
            next_modified: AtomicI64::new(1_000),
            enumerate_calls: AtomicUsize::new(0),
            fail_enumerate: AtomicBool::new(false),
            fail_store: AtomicBool::new(false),
            deny_lock: AtomicBool::new(false),
            deny_unlock: AtomicBool::new(false),
        }
    }

    /// Insert a page directly, without going through `store`
    pub fn seed(&self, id: &str, content: &[u8], modified_at: i64) {
        self.pages().insert(
            id.to_string(),
            PageRecord {
                content: content.to_vec(),
                modified_at,
            },
        );
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pages().contains_key(id)
    }

    pub fn content(&self, id: &str) -> Option<Vec<u8>> {
        self.pages().get(id).map(|record| record.content.clone())
    }

    pub fn locked_ids(&self) -> Vec<String> {
        self.locks().iter().cloned().collect()
    }

    pub fn enumerate_calls(&self) -> usize {
        self.enumerate_calls.load(Ordering::SeqCst)
    }

    /// Every remote call made so far, in order
    pub fn journal(&self) -> Vec<String> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_fail_enumerate(&self, fail: bool) {
        self.fail_enumerate.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_store(&self, fail: bool) {
        self.fail_store.store(fail, Ordering::SeqCst);
    }

    /// Make lock requests come back with an empty acknowledgment set
    pub fn set_deny_lock(&self, deny: bool) {
        self.deny_lock.store(deny, Ordering::SeqCst);
    }

    /// Make unlock requests come back with an empty acknowledgment set
    pub fn set_deny_unlock(&self, deny: bool) {
        self.deny_unlock.store(deny, Ordering::SeqCst);
    }

    fn pages(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, PageRecord>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn locks(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.locked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, entry: String) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

impl Default for MemoryPageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore for MemoryPageStore {
    async fn enumerate(&self) -> Result<Vec<PageDescriptor>, RemoteError> {
        self.record("enumerate".to_string());
        self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_enumerate.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("enumeration refused".to_string()));
        }
        Ok(self
            .pages()
            .iter()
            .map(|(id, record)| PageDescriptor {
                id: id.clone(),
                size: record.content.len() as u64,
                modified_at: record.modified_at,
            })
            .collect())
    }

    async fn fetch(&self, id: &str) -> Result<Vec<u8>, RemoteError> {
        self.record(format!("fetch:{}", id));
        self.pages()
            .get(id)
            .map(|record| record.content.clone())
            .ok_or_else(|| RemoteError::PageNotFound(id.to_string()))
    }

    async fn store(
        &self,
        id: &str,
        content: &[u8],
        _message: &str,
        _minor: bool,
    ) -> Result<(), RemoteError> {
        self.record(format!("store:{}", id));
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("store refused".to_string()));
        }
        if content.is_empty() {
            self.pages().remove(id);
        } else {
            let modified_at = self.next_modified.fetch_add(1, Ordering::SeqCst);
            self.pages().insert(
                id.to_string(),
                PageRecord {
                    content: content.to_vec(),
                    modified_at,
                },
            );
        }
        // A successful store releases the writer's lock.
        self.locks().remove(id);
        Ok(())
    }

    async fn lock(&self, id: &str) -> Result<LockAck, RemoteError> {
        self.record(format!("lock:{}", id));
        if self.deny_lock.load(Ordering::SeqCst) {
            return Ok(LockAck::default());
        }
        self.locks().insert(id.to_string());
        Ok(LockAck {
            locked: vec![id.to_string()],
            unlocked: Vec::new(),
        })
    }

    async fn unlock(&self, id: &str) -> Result<LockAck, RemoteError> {
        self.record(format!("unlock:{}", id));
        if self.deny_unlock.load(Ordering::SeqCst) {
            return Ok(LockAck::default());
        }
        self.locks().remove(id);
        Ok(LockAck {
            locked: Vec::new(),
            unlocked: vec![id.to_string()],
        })
    }
}
