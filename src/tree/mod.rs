//! Page tree projection
//!
//! Builds and caches the hierarchical view of the remote store's flat
//! page namespace.

pub mod builder;
pub mod cache;
pub mod clock;
pub mod node;

pub use cache::{Freshness, TreeCache, TreeSnapshot};
pub use node::{DirectoryNode, DocumentNode, TreeNode};
