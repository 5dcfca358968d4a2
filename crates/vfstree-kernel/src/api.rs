//! The remote filesystem the tree mirrors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use vfstree_types::{DeleteResponse, DirectoryListing, UploadResponse, VolumeListing};

/// Result type for remote operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors reported by a [`VfsApi`] implementation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with an unexpected status.
    #[error("{method} {url} => HTTP {status} {status_text}")]
    Status {
        method: String,
        url: String,
        status: u16,
        status_text: String,
        /// Response body, when the server sent plain text.
        text: Option<String>,
    },

    /// The server does not implement this operation (e.g. mkdir on a flat
    /// filesystem).
    #[error("operation not supported: {operation}")]
    Unsupported { operation: String },

    /// The request never got a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not decode.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn unsupported(operation: impl Into<String>) -> Self {
        ApiError::Unsupported {
            operation: operation.into(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, ApiError::Unsupported { .. })
    }

    /// HTTP status, for status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Remote virtual filesystem operations.
///
/// Volume paths are the server-assigned mount paths (`/sd`); all other
/// paths are relative to the volume root.
#[async_trait]
pub trait VfsApi: Send + Sync {
    /// Snapshot every volume.
    async fn list_volumes(&self) -> ApiResult<Vec<VolumeListing>>;

    /// Snapshot one volume.
    async fn get_volume_root(&self, volume: &str) -> ApiResult<VolumeListing>;

    /// List a directory and everything below it, relative to `dir`.
    async fn list_directory(&self, volume: &str, dir: &str) -> ApiResult<DirectoryListing>;

    /// Create a directory.
    ///
    /// Returns `ApiError::Unsupported` if the volume cannot hold directories.
    async fn create_directory(&self, volume: &str, dir: &str) -> ApiResult<DirectoryListing>;

    /// Write a file, replacing any existing one.
    async fn upload_file(
        &self,
        volume: &str,
        path: &str,
        content: Vec<u8>,
        mtime: Option<DateTime<Utc>>,
    ) -> ApiResult<UploadResponse>;

    /// Delete a file.
    async fn delete_entry(&self, volume: &str, path: &str) -> ApiResult<DeleteResponse>;

    /// Delete a directory and its contents.
    async fn delete_directory(&self, volume: &str, path: &str) -> ApiResult<DeleteResponse>;
}

#[async_trait]
impl<T: VfsApi + ?Sized> VfsApi for std::sync::Arc<T> {
    async fn list_volumes(&self) -> ApiResult<Vec<VolumeListing>> {
        (**self).list_volumes().await
    }

    async fn get_volume_root(&self, volume: &str) -> ApiResult<VolumeListing> {
        (**self).get_volume_root(volume).await
    }

    async fn list_directory(&self, volume: &str, dir: &str) -> ApiResult<DirectoryListing> {
        (**self).list_directory(volume, dir).await
    }

    async fn create_directory(&self, volume: &str, dir: &str) -> ApiResult<DirectoryListing> {
        (**self).create_directory(volume, dir).await
    }

    async fn upload_file(
        &self,
        volume: &str,
        path: &str,
        content: Vec<u8>,
        mtime: Option<DateTime<Utc>>,
    ) -> ApiResult<UploadResponse> {
        (**self).upload_file(volume, path, content, mtime).await
    }

    async fn delete_entry(&self, volume: &str, path: &str) -> ApiResult<DeleteResponse> {
        (**self).delete_entry(volume, path).await
    }

    async fn delete_directory(&self, volume: &str, path: &str) -> ApiResult<DeleteResponse> {
        (**self).delete_directory(volume, path).await
    }
}
