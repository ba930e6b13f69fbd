//! Result types for path resolution

use crate::fs::results::DirEntry;

/// A directory reached at the end of a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRef {
    /// Listable children, filtered through the path validator
    pub children: Vec<DirEntry>,
}

/// A document reached at the end of a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub id: String,
    pub size: u64,
    pub modified_at: i64,
}

/// Outcome of resolving one filesystem path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    Directory(DirectoryRef),
    Document(DocumentRef),
}
