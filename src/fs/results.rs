//! Result types for filesystem operations

/// Kind of a projected filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Regular,
    Directory,
}

/// Stat-style attributes for one entry.
///
/// The remote store has no ownership or permission model; owner, group
/// and mode bits are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAttributes {
    pub kind: FileKind,
    pub size: u64,
    pub accessed_at: i64,
    pub modified_at: i64,
    pub changed_at: i64,
    pub mode: u32,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
}

impl FileAttributes {
    /// Synthetic attributes for a derived directory
    pub fn directory() -> Self {
        Self {
            kind: FileKind::Directory,
            size: 0,
            accessed_at: 0,
            modified_at: 0,
            changed_at: 0,
            mode: 0o755,
            nlink: 2,
            uid: 0,
            gid: 0,
        }
    }

    /// Attributes for a document, derived from its remote descriptor
    pub fn document(size: u64, modified_at: i64) -> Self {
        Self {
            kind: FileKind::Regular,
            size,
            accessed_at: modified_at,
            modified_at,
            changed_at: modified_at,
            mode: 0o644,
            nlink: 1,
            uid: 0,
            gid: 0,
        }
    }
}

/// One directory listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileKind,
}

/// Filesystem statistics reported to the host.
///
/// The remote store has no capacity concept; free counts are effectively
/// unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStatistics {
    pub block_size: u32,
    pub fragment_size: u32,
    pub blocks: u64,
    pub blocks_free: u64,
    pub files: u64,
    pub files_free: u64,
}

impl FsStatistics {
    pub fn synthetic(document_count: u64) -> Self {
        const UNLIMITED: u64 = 99_999_999_999_999;
        Self {
            block_size: 4096,
            fragment_size: 4096,
            blocks: UNLIMITED,
            blocks_free: UNLIMITED,
            files: document_count,
            files_free: UNLIMITED,
        }
    }
}

/// Outcome of one lock-store-release cycle against the remote store.
///
/// A successful store releases the lock remotely, so the happy path has
/// no release step of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFlow {
    /// Content stored; the remote released the lock
    Stored,
    /// Lock acknowledgment did not include the page; nothing was stored
    LockRefused,
    /// Store failed after locking
    StoreFailed {
        /// Whether the follow-up release attempt was acknowledged
        lock_released: bool,
    },
}
