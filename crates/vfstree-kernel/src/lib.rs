//! vfstree-kernel: the client-side mirror of a device's virtual filesystem.
//!
//! This crate provides:
//!
//! - **VFS model**: `Node` (file or directory), `Volume` and the volume `Registry`
//! - **Tree operations**: building trees from flat listings, insert/replace, remove
//! - **API seam**: the `VfsApi` trait the HTTP client (or a test fake) implements
//! - **TreeManager**: applies remote responses to the local forest
//!
//! The local tree is a cache. The server's view is ground truth after every
//! round trip, and a failed request never touches the tree.

pub mod api;
pub mod manager;
pub mod vfs;

pub use api::{ApiError, ApiResult, VfsApi};
pub use manager::{TreeManager, VfsError};
pub use vfs::{AncestorState, Directory, File, Node, Registry, TreeError, Volume};
