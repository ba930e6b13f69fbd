//! Filesystem operations
//!
//! Maps each filesystem primitive onto the remote page store through the
//! cached tree. Operations are one-shot: no handle state survives a call,
//! and every remote failure is converted to a filesystem error at the
//! boundary of the operation that hit it.

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::config::WikiFsConfig;
use crate::error::FsError;
use crate::remote::PageStore;
use crate::remote::store::bounded_call;
use crate::resolve::operations::resolve_path;
use crate::resolve::results::{DocumentRef, Resolution};
use crate::tree::cache::TreeCache;
use crate::tree::clock::{Clock, SystemClock};

use super::results::{DirEntry, FileAttributes, FileKind, FsStatistics, StoreFlow};
use super::validation;

/// Content a page is born with when created before its first write
const NEW_PAGE_CONTENT: &[u8] = b"placeholder";
const CREATE_MESSAGE: &str = "created by mknod";
const WRITE_MESSAGE: &str = "written via filesystem";

/// The projection engine: filesystem primitives over a remote page store.
pub struct WikiFs<S, C = SystemClock> {
    store: Arc<S>,
    cache: TreeCache<S, C>,
    remote_timeout: Duration,
}

impl<S: PageStore> WikiFs<S, SystemClock> {
    pub fn new(store: Arc<S>, config: &WikiFsConfig) -> Self {
        Self::with_clock(
            store,
            config.cache_ttl(),
            config.remote_timeout(),
            SystemClock,
        )
    }
}

impl<S: PageStore, C: Clock> WikiFs<S, C> {
    pub fn with_clock(
        store: Arc<S>,
        cache_ttl: Duration,
        remote_timeout: Duration,
        clock: C,
    ) -> Self {
        let cache = TreeCache::new(Arc::clone(&store), cache_ttl, remote_timeout, clock);
        Self {
            store,
            cache,
            remote_timeout,
        }
    }

    /// Attributes of the entry at `path`
    pub async fn getattr(&self, path: &str) -> Result<FileAttributes, FsError> {
        debug!("getattr({})", path);
        match resolve_path(&self.cache, path, true).await {
            Resolution::NotFound => Err(FsError::NotFound(path.to_string())),
            Resolution::Directory(dir) => {
                debug!("directory with {} entries", dir.children.len());
                Ok(FileAttributes::directory())
            }
            Resolution::Document(doc) => Ok(FileAttributes::document(doc.size, doc.modified_at)),
        }
    }

    /// List the children of the directory at `path`
    pub async fn readdir(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        debug!("readdir({})", path);
        match resolve_path(&self.cache, path, true).await {
            Resolution::NotFound => Err(FsError::NotFound(path.to_string())),
            Resolution::Document(_) => {
                Err(FsError::NotSupported(format!("list a document: {}", path)))
            }
            Resolution::Directory(dir) => Ok(dir.children),
        }
    }

    /// Check that the document at `path` can be opened.
    ///
    /// No handle state is retained; reads and writes re-resolve the path.
    pub async fn open(&self, path: &str) -> Result<(), FsError> {
        debug!("open({})", path);
        match resolve_path(&self.cache, path, true).await {
            Resolution::NotFound => Err(FsError::NotImplemented(path.to_string())),
            Resolution::Directory(_) => Err(FsError::IsDirectory(path.to_string())),
            Resolution::Document(_) => Ok(()),
        }
    }

    /// Read up to `size` bytes starting at `offset`.
    ///
    /// The whole document is fetched on every read; only the tree is
    /// cached, never content.
    pub async fn read(&self, path: &str, offset: u64, size: u32) -> Result<Vec<u8>, FsError> {
        debug!("read({}, offset {}, size {})", path, offset, size);
        let doc = self.document(path, true).await?;
        let content = self.fetch(&doc.id).await?;

        let len = content.len() as u64;
        let start = offset.min(len) as usize;
        let end = (offset.min(len) + u64::from(size)).min(len) as usize;
        Ok(content[start..end].to_vec())
    }

    /// Write `data` to the document at `path`.
    ///
    /// Offset 0 replaces the whole document; empty `data` deletes the
    /// page remotely and invalidates the cached tree. A nonzero offset
    /// keeps the first `offset` bytes of the current content and appends
    /// `data` - any existing tail past that point is dropped, so this is
    /// an append emulation, not a positional overwrite.
    pub async fn write(&self, path: &str, data: &[u8], offset: u64) -> Result<usize, FsError> {
        info!("write({}, {} bytes, offset {})", path, data.len(), offset);
        let doc = self.document(path, true).await?;

        match self.store_locked(&doc.id, data, offset).await? {
            StoreFlow::Stored => {
                if data.is_empty() {
                    info!("page {} removed by empty write", doc.id);
                    self.cache.invalidate();
                }
                Ok(data.len())
            }
            StoreFlow::LockRefused => {
                Err(FsError::Io(format!("could not lock page {}", doc.id)))
            }
            StoreFlow::StoreFailed { lock_released } => {
                if !lock_released {
                    warn!("page {} may still be locked remotely", doc.id);
                }
                Err(FsError::Io(format!("store failed for page {}", doc.id)))
            }
        }
    }

    /// Create an empty document at `path`.
    ///
    /// Only regular files can exist remotely; device nodes and other
    /// kinds are refused.
    pub async fn create(&self, path: &str, kind: FileKind, rdev: u64) -> Result<(), FsError> {
        info!("create({}, {:?}, rdev {})", path, kind, rdev);
        if rdev != 0 {
            return Err(FsError::NotSupported("device nodes".to_string()));
        }
        if kind != FileKind::Regular {
            return Err(FsError::NotSupported("non-regular files".to_string()));
        }
        if !validation::is_valid_path(path) {
            return Err(FsError::NotFound(path.to_string()));
        }
        let id = validation::page_id(path);
        if id.is_empty() {
            return Err(FsError::NotFound(path.to_string()));
        }

        // Existence is decided on a fresh enumeration, not the cache.
        if resolve_path(&self.cache, path, false).await != Resolution::NotFound {
            return Err(FsError::AlreadyExists(path.to_string()));
        }

        self.put(&id, NEW_PAGE_CONTENT, CREATE_MESSAGE, true).await?;
        self.cache.invalidate();

        match resolve_path(&self.cache, path, false).await {
            Resolution::Document(_) => Ok(()),
            _ => {
                error!("page {} not visible after create", id);
                Err(FsError::Io(format!("created page {} did not appear", id)))
            }
        }
    }

    /// Remove the document at `path`.
    ///
    /// Emulated as a zero-length write: the remote deletes a page whose
    /// content is replaced with nothing.
    pub async fn unlink(&self, path: &str) -> Result<(), FsError> {
        info!("unlink({})", path);
        match resolve_path(&self.cache, path, true).await {
            Resolution::Document(_) => {
                self.write(path, &[], 0).await?;
                Ok(())
            }
            _ => Err(FsError::NotSupported(format!("unlink {}", path))),
        }
    }

    /// Truncate the document at `path` to `length` bytes.
    ///
    /// Truncating to zero is the delete emulation, identical to an empty
    /// write. Any other length rewrites the document through the normal
    /// write path.
    pub async fn truncate(&self, path: &str, length: u64) -> Result<(), FsError> {
        info!("truncate({}, {})", path, length);
        if length == 0 {
            self.write(path, &[], 0).await?;
            return Ok(());
        }

        let doc = self.document(path, true).await?;
        let content = self.fetch(&doc.id).await?;
        let keep = &content[..content.len().min(length as usize)];
        let accepted = self.write(path, keep, 0).await?;
        if accepted != keep.len() {
            return Err(FsError::Io(format!(
                "truncate of {} stored {} of {} bytes",
                path,
                accepted,
                keep.len()
            )));
        }
        Ok(())
    }

    /// Remove the directory at `path`.
    ///
    /// Directories are derived from page identifiers and have no remote
    /// existence; only an empty one can be "removed", and an empty one
    /// is gone on the next rebuild anyway.
    pub async fn rmdir(&self, path: &str) -> Result<(), FsError> {
        info!("rmdir({})", path);
        match resolve_path(&self.cache, path, true).await {
            Resolution::NotFound => Err(FsError::NotFound(path.to_string())),
            Resolution::Document(_) => {
                Err(FsError::NotSupported(format!("rmdir a document: {}", path)))
            }
            Resolution::Directory(dir) => {
                if dir.children.is_empty() {
                    Ok(())
                } else {
                    Err(FsError::NotEmpty(path.to_string()))
                }
            }
        }
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        debug!("rename({}, {})", from, to);
        Err(FsError::NotSupported("rename".to_string()))
    }

    pub fn link(&self, source: &str, target: &str) -> Result<(), FsError> {
        debug!("link({}, {})", source, target);
        Err(FsError::NotSupported("hard links".to_string()))
    }

    pub fn chmod(&self, path: &str, mode: u32) -> Result<(), FsError> {
        debug!("chmod({}, {:o})", path, mode);
        Err(FsError::NotSupported("permission changes".to_string()))
    }

    pub fn chown(&self, path: &str, uid: u32, gid: u32) -> Result<(), FsError> {
        debug!("chown({}, {}, {})", path, uid, gid);
        Err(FsError::NotSupported("ownership changes".to_string()))
    }

    /// Synthetic filesystem statistics
    pub async fn statfs(&self) -> Result<FsStatistics, FsError> {
        let snapshot = self.cache.current(true).await;
        Ok(FsStatistics::synthetic(snapshot.root.document_count()))
    }

    async fn document(&self, path: &str, use_cache: bool) -> Result<DocumentRef, FsError> {
        match resolve_path(&self.cache, path, use_cache).await {
            Resolution::Document(doc) => Ok(doc),
            Resolution::Directory(_) => Err(FsError::IsDirectory(path.to_string())),
            Resolution::NotFound => Err(FsError::NotFound(path.to_string())),
        }
    }

    async fn fetch(&self, id: &str) -> Result<Vec<u8>, FsError> {
        Ok(bounded_call("fetch", self.remote_timeout, self.store.fetch(id)).await?)
    }

    async fn put(
        &self,
        id: &str,
        content: &[u8],
        message: &str,
        minor: bool,
    ) -> Result<(), FsError> {
        Ok(bounded_call(
            "store",
            self.remote_timeout,
            self.store.store(id, content, message, minor),
        )
        .await?)
    }

    /// One lock-store-release cycle.
    ///
    /// The lock is acquired before anything else touches the page; the
    /// store only runs under a confirmed lock. On store failure the lock
    /// is released best-effort, but only for non-empty writes - an empty
    /// write that failed left the page as it was.
    async fn store_locked(
        &self,
        id: &str,
        data: &[u8],
        offset: u64,
    ) -> Result<StoreFlow, FsError> {
        let ack = bounded_call("lock", self.remote_timeout, self.store.lock(id)).await?;
        if !ack.confirms_lock(id) {
            error!("lock on {} refused; acknowledged: {:?}", id, ack.locked);
            return Ok(StoreFlow::LockRefused);
        }

        let content = if offset == 0 {
            data.to_vec()
        } else {
            let mut current = match self.fetch(id).await {
                Ok(current) => current,
                Err(err) => {
                    warn!("could not fetch {} for positional write: {}", id, err);
                    let lock_released = self.release_lock(id).await;
                    return Ok(StoreFlow::StoreFailed { lock_released });
                }
            };
            current.truncate(offset as usize);
            current.extend_from_slice(data);
            current
        };

        match self.put(id, &content, WRITE_MESSAGE, false).await {
            Ok(()) => Ok(StoreFlow::Stored),
            Err(err) => {
                error!("store failed for {}: {}", id, err);
                let lock_released = if data.is_empty() {
                    false
                } else {
                    self.release_lock(id).await
                };
                Ok(StoreFlow::StoreFailed { lock_released })
            }
        }
    }

    async fn release_lock(&self, id: &str) -> bool {
        match bounded_call("unlock", self.remote_timeout, self.store.unlock(id)).await {
            Ok(ack) if ack.confirms_unlock(id) => true,
            Ok(ack) => {
                error!("unlock on {} refused; acknowledged: {:?}", id, ack.unlocked);
                false
            }
            Err(err) => {
                error!("unlock call for {} failed: {}", id, err);
                false
            }
        }
    }
}
