//! Listing and operation response envelopes.

use serde::{Deserialize, Serialize};

use crate::item::FileItem;
use crate::stat::VfsStat;

/// Snapshot of one volume: its server-assigned mount path and every entry below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeListing {
    pub path: String,
    #[serde(default)]
    pub files: Vec<FileItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vfs_stat: Option<VfsStat>,
}

impl VolumeListing {
    pub fn new(path: impl Into<String>, files: Vec<FileItem>) -> Self {
        Self {
            path: path.into(),
            files,
            vfs_stat: None,
        }
    }
}

/// Snapshot of one directory inside a volume.
///
/// `name` is the directory's path relative to the volume; `files` are
/// relative to the directory itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub name: String,
    #[serde(default)]
    pub files: Vec<FileItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vfs_stat: Option<VfsStat>,
}

impl DirectoryListing {
    pub fn new(name: impl Into<String>, files: Vec<FileItem>) -> Self {
        Self {
            name: name.into(),
            files,
            vfs_stat: None,
        }
    }
}

/// Response to an upload: the written file.
pub type UploadResponse = FileItem;

/// Response to a file or directory delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vfs_stat: Option<VfsStat>,
}
