//! The forest of volumes for one session.

use std::collections::BTreeMap;

use vfstree_types::VolumeListing;

use super::volume::Volume;

/// All known volumes, keyed and ordered by path.
///
/// Iteration is always in lexicographic path order, whatever order the
/// volumes were registered in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    volumes: BTreeMap<String, Volume>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a full volume listing.
    pub fn build_forest(listings: &[VolumeListing]) -> Self {
        let mut registry = Self::new();
        for listing in listings {
            registry.set_volume(Volume::from_listing(listing));
        }
        registry
    }

    /// Insert a volume, replacing any volume at the same path.
    ///
    /// Returns the replaced volume.
    pub fn set_volume(&mut self, volume: Volume) -> Option<Volume> {
        tracing::debug!("set volume {}", volume.path());
        self.volumes.insert(volume.path().to_string(), volume)
    }

    pub fn get(&self, path: &str) -> Option<&Volume> {
        self.volumes.get(path)
    }

    pub(crate) fn get_mut(&mut self, path: &str) -> Option<&mut Volume> {
        self.volumes.get_mut(path)
    }

    /// Volumes in path order.
    pub fn volumes(&self) -> impl Iterator<Item = &Volume> {
        self.volumes.values()
    }

    /// Volume paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.volumes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}
