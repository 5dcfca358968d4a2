//! Applies remote operations to the local volume forest.
//!
//! Every operation makes the remote call first and only then patches the
//! tree, so a failed request leaves the tree exactly as it was. Mutating
//! operations take `&mut self`; responses are applied in completion order.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::api::{ApiError, VfsApi};
use crate::vfs::{
    build_directory, insert_item, insert_node, remove, split, AncestorState, Directory, File,
    Node, Registry, TreeError, Volume,
};

/// Errors from tree manager operations.
#[derive(Debug, Error)]
pub enum VfsError {
    /// The remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The volume is not in the registry.
    #[error("unknown volume: {0}")]
    UnknownVolume(String),

    /// The response could not be applied to the local tree.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Owns the volume registry and the remote it mirrors.
pub struct TreeManager<A> {
    api: A,
    registry: Registry,
}

impl<A: VfsApi> TreeManager<A> {
    /// Create a manager with an empty registry.
    pub fn new(api: A) -> Self {
        Self {
            api,
            registry: Registry::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn volume(&self, path: &str) -> Option<&Volume> {
        self.registry.get(path)
    }

    /// Resolve `path` inside `volume`.
    pub fn lookup(&self, volume: &str, path: &str) -> Option<&Node> {
        self.registry.get(volume)?.lookup(path)
    }

    fn require_volume(&self, volume: &str) -> Result<(), VfsError> {
        if self.registry.get(volume).is_some() {
            Ok(())
        } else {
            Err(VfsError::UnknownVolume(volume.to_string()))
        }
    }

    fn volume_mut(&mut self, volume: &str) -> Result<&mut Volume, VfsError> {
        self.registry
            .get_mut(volume)
            .ok_or_else(|| VfsError::UnknownVolume(volume.to_string()))
    }

    fn directory_at(&self, volume: &str, path: &str) -> Result<&Directory, VfsError> {
        self.lookup(volume, path)
            .and_then(Node::as_directory)
            .ok_or_else(|| {
                VfsError::Tree(TreeError::NotADirectory {
                    path: path.to_string(),
                    segment: path.to_string(),
                })
            })
    }

    /// Fetch every volume and replace the registry.
    pub async fn load_volumes(&mut self) -> Result<&Registry, VfsError> {
        let listings = self.api.list_volumes().await?;

        self.registry = Registry::build_forest(&listings);
        tracing::info!("loaded {} volumes", self.registry.len());
        Ok(&self.registry)
    }

    /// Fetch one volume and register it, replacing any previous tree.
    pub async fn load_volume_root(&mut self, volume: &str) -> Result<&Volume, VfsError> {
        let listing = self.api.get_volume_root(volume).await?;

        let built = Volume::from_listing(&listing);
        let path = built.path().to_string();
        self.registry.set_volume(built);
        tracing::info!("loaded volume {} ({} entries)", path, listing.files.len());

        self.registry
            .get(&path)
            .ok_or(VfsError::UnknownVolume(path))
    }

    /// Fetch a directory and swap it into the tree.
    pub async fn load_directory(&mut self, volume: &str, dir: &str) -> Result<&Directory, VfsError> {
        self.require_volume(volume)?;
        split(dir)?;

        let listing = self.api.list_directory(volume, dir).await?;

        let target = self.volume_mut(volume)?;
        target.refresh_stat(listing.vfs_stat);
        let fresh = build_directory("", &listing.files);
        insert_node(
            target.root_mut(),
            dir,
            Node::Directory(fresh),
            AncestorState::Placeholder,
        )?;
        tracing::info!("loaded {}:{} ({} entries)", volume, dir, listing.files.len());

        self.directory_at(volume, dir)
    }

    /// Create a directory on the server and in the tree.
    ///
    /// If the server does not support directories, an empty loaded
    /// directory is created locally instead.
    pub async fn create_directory(
        &mut self,
        volume: &str,
        dir: &str,
    ) -> Result<&Directory, VfsError> {
        self.require_volume(volume)?;
        split(dir)?;

        let fresh = match self.api.create_directory(volume, dir).await {
            Ok(listing) => {
                self.volume_mut(volume)?.refresh_stat(listing.vfs_stat);
                build_directory("", &listing.files)
            }
            Err(e) if e.is_unsupported() => {
                tracing::warn!("{}:{}: {}, creating directory locally", volume, dir, e);
                Directory::new("")
            }
            Err(e) => return Err(e.into()),
        };

        insert_node(
            self.volume_mut(volume)?.root_mut(),
            dir,
            Node::Directory(fresh),
            AncestorState::Placeholder,
        )?;
        tracing::info!("created directory {}:{}", volume, dir);

        self.directory_at(volume, dir)
    }

    /// Upload a file and insert the written entry at `path`.
    ///
    /// Parent directories the tree does not know yet are created as
    /// unloaded placeholders.
    pub async fn upload_file(
        &mut self,
        volume: &str,
        path: &str,
        content: Vec<u8>,
        mtime: Option<DateTime<Utc>>,
    ) -> Result<&File, VfsError> {
        self.require_volume(volume)?;
        split(path)?;

        let size = content.len();
        let mut item = self.api.upload_file(volume, path, content, mtime).await?;
        if item.name != path {
            tracing::debug!("upload {}: server named it {}", path, item.name);
        }
        item.name = path.to_string();
        item.item_type = vfstree_types::ItemType::File;

        let target = self.volume_mut(volume)?;
        target.refresh_stat(item.vfs_stat);
        insert_item(target.root_mut(), &item, AncestorState::Placeholder)?;
        tracing::info!("uploaded {}:{} ({} bytes)", volume, path, size);

        self.lookup(volume, path)
            .and_then(Node::as_file)
            .ok_or_else(|| VfsError::Tree(TreeError::EmptyPath(path.to_string())))
    }

    /// Delete a file on the server and drop it from the tree.
    pub async fn delete_file(&mut self, volume: &str, path: &str) -> Result<Option<Node>, VfsError> {
        self.require_volume(volume)?;
        split(path)?;

        let response = self.api.delete_entry(volume, path).await?;
        self.apply_delete(volume, path, response.vfs_stat)
    }

    /// Delete a directory on the server and drop its subtree from the tree.
    pub async fn delete_directory(
        &mut self,
        volume: &str,
        path: &str,
    ) -> Result<Option<Node>, VfsError> {
        self.require_volume(volume)?;
        split(path)?;

        let response = self.api.delete_directory(volume, path).await?;
        self.apply_delete(volume, path, response.vfs_stat)
    }

    fn apply_delete(
        &mut self,
        volume: &str,
        path: &str,
        stat: Option<vfstree_types::VfsStat>,
    ) -> Result<Option<Node>, VfsError> {
        let target = self.volume_mut(volume)?;
        let removed = remove(target.root_mut(), path)?;
        target.refresh_stat(stat);
        tracing::info!("deleted {}:{}", volume, path);
        Ok(removed)
    }
}
