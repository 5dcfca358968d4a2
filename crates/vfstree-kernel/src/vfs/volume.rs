//! A mounted volume and its tree.

use vfstree_types::{VfsStat, VolumeListing};

use super::node::{Directory, Node};
use super::tree::build_directory;

/// One server-exposed filesystem, mounted at `path`.
///
/// The root directory is unnamed; entries below it are addressed by paths
/// relative to the volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    path: String,
    root: Directory,
    stat: Option<VfsStat>,
}

impl Volume {
    /// An empty, loaded volume.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            root: Directory::new(""),
            stat: None,
        }
    }

    /// Build a volume from a full listing.
    pub fn from_listing(listing: &VolumeListing) -> Self {
        Self {
            path: listing.path.clone(),
            root: build_directory("", &listing.files),
            stat: listing.vfs_stat,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Directory {
        &mut self.root
    }

    pub fn stat(&self) -> Option<&VfsStat> {
        self.stat.as_ref()
    }

    /// Refresh the volume statistics; `None` keeps the previous value.
    pub(crate) fn refresh_stat(&mut self, stat: Option<VfsStat>) {
        if let Some(stat) = stat {
            self.stat = Some(stat);
        }
    }

    /// Resolve a path relative to the volume root.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        self.root.lookup(path)
    }
}
