//! Tree node types
//!
//! The projected hierarchy is a tagged variant over path segments:
//! directories aggregate, documents carry a remote page. A directory has
//! no remote identity of its own; it exists only because at least one
//! page identifier passes through its segment.

use std::collections::BTreeMap;

use crate::remote::PageDescriptor;

/// A leaf of the tree: one remote page.
///
/// The identifier is the full remote name; the filesystem path is the
/// identifier with its separator swapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    pub id: String,
    pub size: u64,
    pub modified_at: i64,
}

impl DocumentNode {
    pub fn from_descriptor(page: &PageDescriptor) -> Self {
        Self {
            id: page.id.clone(),
            size: page.size,
            modified_at: page.modified_at,
        }
    }
}

/// An interior node: path segment to child mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    children: BTreeMap<String, TreeNode>,
}

impl DirectoryNode {
    pub fn new() -> Self {
        Self {
            children: BTreeMap::new(),
        }
    }

    pub fn child(&self, segment: &str) -> Option<&TreeNode> {
        self.children.get(segment)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of documents anywhere below this directory
    pub fn document_count(&self) -> u64 {
        self.children
            .values()
            .map(|node| match node {
                TreeNode::Document(_) => 1,
                TreeNode::Directory(dir) => dir.document_count(),
            })
            .sum()
    }

    pub(crate) fn children_mut(&mut self) -> &mut BTreeMap<String, TreeNode> {
        &mut self.children
    }
}

/// One entry in the projected hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Directory(DirectoryNode),
    Document(DocumentNode),
}
