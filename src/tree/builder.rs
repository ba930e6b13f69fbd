//! Page tree construction
//!
//! Converts one flat enumeration snapshot into a hierarchy. The build
//! never fails as a whole: malformed identifiers are skipped and
//! identifier collisions resolved, so one bad record cannot take the
//! rest of the wiki offline.

use log::warn;

use crate::remote::store::{HIERARCHY_SEPARATOR, PageDescriptor};

use super::node::{DirectoryNode, DocumentNode, TreeNode};

/// Build the root directory from a full enumeration.
pub fn build_tree(pages: &[PageDescriptor]) -> DirectoryNode {
    let mut root = DirectoryNode::new();
    for page in pages {
        if let Err(reason) = insert_page(&mut root, page) {
            warn!("skipping page '{}': {}", page.id, reason);
        }
    }
    root
}

fn insert_page(root: &mut DirectoryNode, page: &PageDescriptor) -> Result<(), String> {
    if page.id.is_empty() || page.id.split(HIERARCHY_SEPARATOR).any(|seg| seg.is_empty()) {
        return Err("identifier has an empty segment".to_string());
    }

    let segments: Vec<&str> = page.id.split(HIERARCHY_SEPARATOR).collect();
    let (leaf, namespaces) = match segments.split_last() {
        Some(parts) => parts,
        None => return Err("identifier has no segments".to_string()),
    };

    let mut cursor = root;
    for segment in namespaces {
        let entry = cursor
            .children_mut()
            .entry((*segment).to_string())
            .or_insert_with(|| TreeNode::Directory(DirectoryNode::new()));
        if let TreeNode::Document(shadowed) = entry {
            // A page sits where this identifier needs a namespace. The
            // directory wins so the deeper pages stay reachable.
            warn!(
                "page '{}' shadowed by namespace of '{}'; dropping the page",
                shadowed.id, page.id
            );
            *entry = TreeNode::Directory(DirectoryNode::new());
        }
        cursor = match entry {
            TreeNode::Directory(dir) => dir,
            TreeNode::Document(_) => return Err("namespace walk hit a page".to_string()),
        };
    }

    match cursor.children_mut().get_mut(*leaf) {
        Some(TreeNode::Directory(_)) => {
            // The mirror of the shadowing case above: a namespace already
            // occupies this name, and the directory wins here too.
            Err("identifier collides with an existing namespace".to_string())
        }
        Some(TreeNode::Document(existing)) => {
            *existing = DocumentNode::from_descriptor(page);
            Ok(())
        }
        None => {
            cursor.children_mut().insert(
                (*leaf).to_string(),
                TreeNode::Document(DocumentNode::from_descriptor(page)),
            );
            Ok(())
        }
    }
}
