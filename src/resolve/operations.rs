//! Path resolution implementation

use log::debug;

use crate::fs::results::{DirEntry, FileKind};
use crate::fs::validation;
use crate::remote::PageStore;
use crate::tree::cache::{Freshness, TreeCache};
use crate::tree::clock::Clock;
use crate::tree::node::{DirectoryNode, DocumentNode, TreeNode};

use super::results::{DirectoryRef, DocumentRef, Resolution};

enum Cursor<'a> {
    Directory(&'a DirectoryNode),
    Document(&'a DocumentNode),
}

/// Resolve a filesystem path against the cached tree.
///
/// Invalid paths resolve to `NotFound` before any tree or remote access.
/// `use_cache = false` forces a fresh enumeration first, for callers
/// about to make an existence-sensitive decision.
pub async fn resolve_path<S: PageStore, C: Clock>(
    cache: &TreeCache<S, C>,
    path: &str,
    use_cache: bool,
) -> Resolution {
    if !validation::is_valid_path(path) {
        debug!("rejected path: {}", path);
        return Resolution::NotFound;
    }

    let snapshot = cache.current(use_cache).await;
    if snapshot.freshness == Freshness::Stale {
        debug!("resolving {} against a stale tree", path);
    }

    let mut cursor = Cursor::Directory(snapshot.root.as_ref());
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        cursor = match cursor {
            Cursor::Directory(dir) => match dir.child(segment) {
                Some(TreeNode::Directory(child)) => Cursor::Directory(child),
                Some(TreeNode::Document(doc)) => Cursor::Document(doc),
                None => return Resolution::NotFound,
            },
            // Paths never descend through a document.
            Cursor::Document(_) => return Resolution::NotFound,
        };
    }

    match cursor {
        Cursor::Directory(dir) => Resolution::Directory(DirectoryRef {
            children: listable_children(dir),
        }),
        Cursor::Document(doc) => Resolution::Document(DocumentRef {
            id: doc.id.clone(),
            size: doc.size,
            modified_at: doc.modified_at,
        }),
    }
}

fn listable_children(dir: &DirectoryNode) -> Vec<DirEntry> {
    dir.children()
        .filter(|(name, _)| validation::is_valid_segment(name))
        .map(|(name, node)| DirEntry {
            name: name.to_string(),
            kind: match node {
                TreeNode::Directory(_) => FileKind::Directory,
                TreeNode::Document(_) => FileKind::Regular,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::memory::MemoryPageStore;
    use crate::tree::clock::ManualClock;
    use std::sync::Arc;
    use std::time::Duration;

    fn cache_with_pages(
        pages: &[(&str, &[u8], i64)],
    ) -> (Arc<MemoryPageStore>, TreeCache<MemoryPageStore, ManualClock>) {
        let store = Arc::new(MemoryPageStore::new());
        for (id, content, modified_at) in pages {
            store.seed(id, content, *modified_at);
        }
        let cache = TreeCache::new(
            Arc::clone(&store),
            Duration::from_secs(5),
            Duration::from_secs(2),
            ManualClock::new(),
        );
        (store, cache)
    }

    #[tokio::test]
    async fn test_resolves_directory_document_and_missing() {
        let (_, cache) = cache_with_pages(&[("a:b", b"0123456789", 1_000)]);

        match resolve_path(&cache, "/a", true).await {
            Resolution::Directory(dir) => {
                assert_eq!(dir.children.len(), 1);
                assert_eq!(dir.children[0].name, "b");
                assert_eq!(dir.children[0].kind, FileKind::Regular);
            }
            other => panic!("expected directory, got {:?}", other),
        }

        match resolve_path(&cache, "/a/b", true).await {
            Resolution::Document(doc) => {
                assert_eq!(doc.id, "a:b");
                assert_eq!(doc.size, 10);
                assert_eq!(doc.modified_at, 1_000);
            }
            other => panic!("expected document, got {:?}", other),
        }

        assert_eq!(resolve_path(&cache, "/a/c", true).await, Resolution::NotFound);
        assert_eq!(
            resolve_path(&cache, "/a/b/c", true).await,
            Resolution::NotFound
        );
    }

    #[tokio::test]
    async fn test_root_resolves_to_directory() {
        let (_, cache) = cache_with_pages(&[("a", b"x", 1_000), ("b:c", b"y", 1_000)]);

        match resolve_path(&cache, "/", true).await {
            Resolution::Directory(dir) => assert_eq!(dir.children.len(), 2),
            other => panic!("expected directory, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_path_short_circuits_before_remote() {
        let (store, cache) = cache_with_pages(&[("a:b", b"x", 1_000)]);

        assert_eq!(
            resolve_path(&cache, "/a:b", true).await,
            Resolution::NotFound
        );
        assert_eq!(
            resolve_path(&cache, "/.hidden", true).await,
            Resolution::NotFound
        );
        assert_eq!(store.enumerate_calls(), 0);
    }

    #[tokio::test]
    async fn test_unlistable_children_are_filtered() {
        let (_, cache) =
            cache_with_pages(&[(".trash", b"x", 1_000), ("UPPER", b"y", 1_000), ("ok", b"z", 1_000)]);

        match resolve_path(&cache, "/", true).await {
            Resolution::Directory(dir) => {
                let names: Vec<&str> =
                    dir.children.iter().map(|entry| entry.name.as_str()).collect();
                assert_eq!(names, vec!["ok"]);
            }
            other => panic!("expected directory, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bypass_observes_remote_change_within_ttl() {
        let (store, cache) = cache_with_pages(&[]);

        assert_eq!(resolve_path(&cache, "/new", true).await, Resolution::NotFound);
        store.seed("new", b"fresh", 2_000);
        assert_eq!(resolve_path(&cache, "/new", true).await, Resolution::NotFound);
        assert!(matches!(
            resolve_path(&cache, "/new", false).await,
            Resolution::Document(_)
        ));
    }
}
