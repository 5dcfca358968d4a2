//! HTTP client for a device's virtual filesystem.
//!
//! [`HttpVfsApi`] implements `vfstree_kernel::VfsApi` over the device's
//! `/api/vfs` endpoints:
//!
//! ```text
//! GET    /api/vfs                    all volumes
//! GET    /api/vfs/{volume}/          one volume
//! GET    /api/vfs/{volume}/{dir}/    one directory
//! PUT    /api/vfs/{volume}/{dir}/    mkdir (405/501 if unsupported)
//! PUT    /api/vfs/{volume}/{file}    upload
//! DELETE /api/vfs/{volume}/{file}    delete file
//! DELETE /api/vfs/{volume}/{dir}/    delete directory
//! ```
//!
//! # Example
//!
//! ```ignore
//! use vfstree_client::{ClientConfig, HttpVfsApi};
//! use vfstree_kernel::TreeManager;
//!
//! let api = HttpVfsApi::new(ClientConfig::new("http://192.168.4.1")?)?;
//! let mut manager = TreeManager::new(api);
//! manager.load_volumes().await?;
//! ```

mod config;
mod http;
mod routes;

pub use config::{ClientConfig, ClientError, DEFAULT_TIMEOUT};
pub use http::HttpVfsApi;
