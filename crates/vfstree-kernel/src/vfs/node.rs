//! File and directory nodes.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use vfstree_types::{FileItem, ItemType};

use super::path::{join, segments};

/// An entry in a volume tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    File(File),
    Directory(Directory),
}

impl Node {
    /// Build a node named `name` from a listing descriptor.
    ///
    /// Directory descriptors carry no contents of their own, so the
    /// directory starts empty with the given `loaded` state.
    pub(crate) fn from_item(name: &str, item: &FileItem, loaded: bool) -> Self {
        match item.item_type {
            ItemType::File => Node::File(File {
                name: name.to_string(),
                size: item.size.unwrap_or(0),
                mtime: item.mtime,
            }),
            ItemType::Directory => Node::Directory(Directory::with_loaded(name, loaded)),
        }
    }

    /// Final path segment of this entry.
    pub fn name(&self) -> &str {
        match self {
            Node::File(f) => &f.name,
            Node::Directory(d) => &d.name,
        }
    }

    pub fn kind(&self) -> ItemType {
        match self {
            Node::File(_) => ItemType::File,
            Node::Directory(_) => ItemType::Directory,
        }
    }

    /// Size in bytes. Directories have none.
    pub fn size(&self) -> Option<u64> {
        match self {
            Node::File(f) => Some(f.size),
            Node::Directory(_) => None,
        }
    }

    /// Modification time, if the server supplied one. Directories have none.
    pub fn mtime(&self) -> Option<DateTime<Utc>> {
        match self {
            Node::File(f) => f.mtime,
            Node::Directory(_) => None,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Node::File(f) => Some(f),
            Node::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Node::File(_) => None,
            Node::Directory(d) => Some(d),
        }
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        match self {
            Node::File(f) => f.name = name.to_string(),
            Node::Directory(d) => d.name = name.to_string(),
        }
    }
}

impl From<File> for Node {
    fn from(file: File) -> Self {
        Node::File(file)
    }
}

impl From<Directory> for Node {
    fn from(dir: Directory) -> Self {
        Node::Directory(dir)
    }
}

/// A regular file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: String,
    size: u64,
    mtime: Option<DateTime<Utc>>,
}

impl File {
    pub fn new(name: impl Into<String>, size: u64, mtime: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            size,
            mtime,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mtime(&self) -> Option<DateTime<Utc>> {
        self.mtime
    }
}

/// A directory and its children.
///
/// Children are keyed by name and kept in first-seen order: a replaced
/// child keeps its slot, a new child lands at the end. Callers that want
/// sorted output sort explicitly (see [`Directory::sorted_children`]).
/// All mutation goes through `insert_or_replace` / `remove_child`, so the
/// lookup index and the display order cannot drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    name: String,
    loaded: bool,
    children: IndexMap<String, Node>,
}

impl Directory {
    /// Create an empty directory whose contents are known.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_loaded(name, true)
    }

    /// Create a placeholder directory whose contents have not been fetched.
    pub fn unloaded(name: impl Into<String>) -> Self {
        Self::with_loaded(name, false)
    }

    pub(crate) fn with_loaded(name: impl Into<String>, loaded: bool) -> Self {
        Self {
            name: name.into(),
            loaded,
            children: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the children reflect a real server listing.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Look up a direct child by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Position of a direct child in display order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.children.get_index_of(name)
    }

    /// Children in display (first-seen) order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.values()
    }

    /// Child names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Children sorted for listing: directories first, then by name.
    pub fn sorted_children(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.children.values().collect();
        nodes.sort_by(|a, b| b.is_dir().cmp(&a.is_dir()).then_with(|| a.name().cmp(b.name())));
        nodes
    }

    /// Resolve a relative path below this directory.
    ///
    /// The empty path resolves to nothing; use the directory itself.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let mut segments = segments(path);
        let mut node = self.children.get(segments.next()?)?;
        for segment in segments {
            node = node.as_directory()?.children.get(segment)?;
        }
        Some(node)
    }

    /// Flatten the subtree into `(relative path, node)` pairs, depth first,
    /// in display order.
    pub fn walk(&self) -> Vec<(String, &Node)> {
        let mut out = Vec::new();
        self.walk_into("", &mut out);
        out
    }

    fn walk_into<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Node)>) {
        for node in self.children.values() {
            let path = join(prefix, node.name());
            if let Node::Directory(dir) = node {
                out.push((path.clone(), node));
                dir.walk_into(&path, out);
            } else {
                out.push((path, node));
            }
        }
    }

    /// Insert a child, replacing any existing child of the same name in place.
    ///
    /// Returns the replaced node.
    pub(crate) fn insert_or_replace(&mut self, node: Node) -> Option<Node> {
        self.children.insert(node.name().to_string(), node)
    }

    /// Remove a child by name, keeping the order of the remaining siblings.
    pub(crate) fn remove_child(&mut self, name: &str) -> Option<Node> {
        self.children.shift_remove(name)
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.get_mut(name)
    }

    /// Descend into the child directory `name`, creating it if missing.
    ///
    /// A file in the way is replaced (in place) by a new directory: the
    /// server has just told us there is something below that name.
    pub(crate) fn child_dir_or_create(&mut self, name: &str, loaded: bool) -> &mut Directory {
        let entry = self
            .children
            .entry(name.to_string())
            .or_insert_with(|| Node::Directory(Directory::with_loaded(name, loaded)));

        if let Node::File(_) = entry {
            tracing::debug!("replacing file {} with directory", name);
            *entry = Node::Directory(Directory::with_loaded(name, loaded));
        }

        match entry {
            Node::Directory(dir) => dir,
            Node::File(_) => unreachable!("file replaced above"),
        }
    }
}
