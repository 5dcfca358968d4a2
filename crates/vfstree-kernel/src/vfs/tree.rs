//! Building trees from flat listings and patching them in place.

use thiserror::Error;
use vfstree_types::FileItem;

use super::node::{Directory, Node};
use super::path::split;

/// Errors from tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The path has no segments.
    #[error("empty path: {0:?}")]
    EmptyPath(String),

    /// An intermediate directory expected to exist is missing.
    ///
    /// The local tree has drifted from the server's.
    #[error("{path}: missing parent directory {segment:?}")]
    MissingParent { path: String, segment: String },

    /// An intermediate path segment names a file.
    #[error("{path}: {segment:?} is not a directory")]
    NotADirectory { path: String, segment: String },
}

/// State of intermediate directories materialized while walking a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorState {
    /// The walk is part of a listing that covers the whole subtree, so every
    /// directory it creates is complete.
    Listed,
    /// The walk places a single entry; anything else in the created
    /// directories is unknown until they are fetched.
    Placeholder,
}

impl AncestorState {
    fn loaded(self) -> bool {
        matches!(self, AncestorState::Listed)
    }
}

/// Build a loaded directory from a flat listing.
///
/// Every descriptor is inserted in listing order, creating the parent
/// directories the listing leaves implicit. Descriptors with an empty name
/// are skipped.
pub fn build_directory(name: impl Into<String>, items: &[FileItem]) -> Directory {
    let mut dir = Directory::new(name);
    for item in items {
        if let Err(e) = insert_item(&mut dir, item, AncestorState::Listed) {
            tracing::warn!("skipping listing entry: {}", e);
        }
    }
    dir
}

/// Walk to the parent of `path`, creating missing directories.
fn walk_create<'a>(
    root: &'a mut Directory,
    parents: &[&str],
    ancestors: AncestorState,
) -> &'a mut Directory {
    let mut current = root;
    for segment in parents {
        current = current.child_dir_or_create(segment, ancestors.loaded());
    }
    current
}

/// Walk to the parent of `path`; every segment must already be a directory.
fn walk_existing<'a>(
    root: &'a mut Directory,
    path: &str,
    parents: &[&str],
) -> Result<&'a mut Directory, TreeError> {
    let mut current = root;
    for segment in parents {
        current = match current.child_mut(segment) {
            Some(Node::Directory(dir)) => dir,
            Some(Node::File(_)) => {
                return Err(TreeError::NotADirectory {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
            None => {
                return Err(TreeError::MissingParent {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
        };
    }
    Ok(current)
}

/// Place a single listing descriptor at `item.name` below `root`.
///
/// A file replaces whatever was at that name, keeping its position. A bare
/// directory descriptor has no contents of its own: it creates the directory
/// if missing and leaves an existing directory (and everything below it)
/// alone. Returns the replaced node, if any.
pub fn insert_item(
    root: &mut Directory,
    item: &FileItem,
    ancestors: AncestorState,
) -> Result<Option<Node>, TreeError> {
    let (parents, name) = split(&item.name)?;
    let parent = walk_create(root, &parents, ancestors);

    if item.is_dir() && parent.get(name).is_some_and(Node::is_dir) {
        return Ok(None);
    }

    tracing::debug!("insert {}", item.name);
    Ok(parent.insert_or_replace(Node::from_item(name, item, ancestors.loaded())))
}

/// Place `node` at `path` below `root`, replacing any existing entry wholesale.
///
/// The node is renamed to the final segment of `path`. Used to swap in a
/// freshly fetched directory: the old subtree is dropped, the slot in its
/// parent's display order is kept.
pub fn insert_node(
    root: &mut Directory,
    path: &str,
    mut node: Node,
    ancestors: AncestorState,
) -> Result<Option<Node>, TreeError> {
    let (parents, name) = split(path)?;
    node.set_name(name);

    tracing::debug!("replace {}", path);
    let parent = walk_create(root, &parents, ancestors);
    Ok(parent.insert_or_replace(node))
}

/// Remove the entry at `path` (and, for a directory, everything below it).
///
/// Removing a missing final entry is a no-op. A missing or non-directory
/// intermediate segment is an error and leaves the tree untouched.
pub fn remove(root: &mut Directory, path: &str) -> Result<Option<Node>, TreeError> {
    let (parents, name) = split(path)?;
    let parent = walk_existing(root, path, &parents)?;

    let removed = parent.remove_child(name);
    if removed.is_some() {
        tracing::debug!("remove {}", path);
    }
    Ok(removed)
}
