//! Flat file descriptors as returned by listings and uploads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stat::VfsStat;

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Upload responses omit the type; anything untyped is a file.
    #[default]
    File,
    #[serde(alias = "dir")]
    Directory,
}

/// One entry of a flat, path-qualified listing.
///
/// `name` is relative to the listed root and may contain `/` separators for
/// entries nested below directories the server never lists on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileItem {
    pub name: String,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, with = "mtime", skip_serializing_if = "Option::is_none")]
    pub mtime: Option<DateTime<Utc>>,
    /// Volume statistics, refreshed by the server after writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vfs_stat: Option<VfsStat>,
}

impl FileItem {
    /// A file descriptor with a known size.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            item_type: ItemType::File,
            size: Some(size),
            mtime: None,
            vfs_stat: None,
        }
    }

    /// A directory descriptor. Directories never carry size or mtime.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            item_type: ItemType::Directory,
            size: None,
            mtime: None,
            vfs_stat: None,
        }
    }

    pub fn with_mtime(mut self, mtime: DateTime<Utc>) -> Self {
        self.mtime = Some(mtime);
        self
    }

    pub fn with_vfs_stat(mut self, stat: VfsStat) -> Self {
        self.vfs_stat = Some(stat);
        self
    }

    pub fn is_dir(&self) -> bool {
        self.item_type == ItemType::Directory
    }
}

/// Parse a serialized mtime.
///
/// Accepts RFC 3339 (`2024-03-01T12:00:00Z`) and RFC 2822 / HTTP dates
/// (`Fri, 01 Mar 2024 12:00:00 GMT`).
pub fn parse_mtime(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .map(|dt| dt.with_timezone(&Utc))
}

/// serde adapter for optional mtimes.
mod mtime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => super::parse_mtime(&text)
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid mtime {text:?}: {e}"))),
            None => Ok(None),
        }
    }
}
