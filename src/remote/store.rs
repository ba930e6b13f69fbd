//! Page store capability surface
//!
//! Defines the operations the engine may ask of the remote wiki. Any
//! transport (XML-RPC, REST, in-memory) implements `PageStore`.

use std::future::Future;
use std::time::Duration;

use crate::error::RemoteError;

/// Character separating namespace segments in remote page identifiers.
pub const HIERARCHY_SEPARATOR: char = ':';

/// One record from a remote enumeration: a page's identifier plus the
/// metadata the tree is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    /// Colon-delimited hierarchical page name, unique within the wiki
    pub id: String,
    /// Content size in bytes
    pub size: u64,
    /// Last modification time, seconds since the epoch
    pub modified_at: i64,
}

/// Acknowledgment sets returned by lock and unlock calls.
///
/// The remote reports which of the requested identifiers it actually
/// locked or unlocked; a request absent from its set was refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockAck {
    pub locked: Vec<String>,
    pub unlocked: Vec<String>,
}

impl LockAck {
    /// Whether the remote confirmed a lock on `id`
    pub fn confirms_lock(&self, id: &str) -> bool {
        self.locked.iter().any(|locked| locked == id)
    }

    /// Whether the remote confirmed releasing the lock on `id`
    pub fn confirms_unlock(&self, id: &str) -> bool {
        self.unlocked.iter().any(|unlocked| unlocked == id)
    }
}

/// Remote directory store client.
///
/// Each call is a single bounded network round trip. Two contract points
/// the engine relies on: storing empty content deletes the page, and a
/// successful store releases the caller's lock on that page.
pub trait PageStore: Send + Sync {
    /// List every page the remote store knows about
    fn enumerate(&self) -> impl Future<Output = Result<Vec<PageDescriptor>, RemoteError>> + Send;

    /// Fetch the full content of one page
    fn fetch(&self, id: &str) -> impl Future<Output = Result<Vec<u8>, RemoteError>> + Send;

    /// Replace the full content of one page
    fn store(
        &self,
        id: &str,
        content: &[u8],
        message: &str,
        minor: bool,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Request a cooperative write lock on one page
    fn lock(&self, id: &str) -> impl Future<Output = Result<LockAck, RemoteError>> + Send;

    /// Release a previously acquired lock on one page
    fn unlock(&self, id: &str) -> impl Future<Output = Result<LockAck, RemoteError>> + Send;
}

/// Run one remote call under an explicit deadline; expiry counts as a
/// remote failure.
pub(crate) async fn bounded_call<T, F>(
    op: &str,
    limit: Duration,
    call: F,
) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout(op.to_string())),
    }
}
