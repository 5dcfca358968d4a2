//! Test utilities for vfstree.
//!
//! - [`FakeVfsApi`]: an in-memory device filesystem implementing `VfsApi`,
//!   with failure injection and a call log
//! - [`fixtures`]: small listings used across the test suites

pub mod fixtures;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

use vfstree_kernel::vfs::segments;
use vfstree_kernel::{ApiError, ApiResult, VfsApi};
use vfstree_types::{
    DeleteResponse, DirectoryListing, FileItem, UploadResponse, VfsStat, VolumeListing,
};

/// Default capacity of fake volumes, in bytes.
pub const DEFAULT_CAPACITY: u64 = 1024 * 1024;

#[derive(Debug, Clone)]
enum FakeEntry {
    File {
        size: u64,
        mtime: Option<DateTime<Utc>>,
    },
    Directory,
}

#[derive(Debug)]
struct FakeVolume {
    capacity: u64,
    entries: BTreeMap<String, FakeEntry>,
}

impl FakeVolume {
    fn stat(&self) -> VfsStat {
        let used: u64 = self
            .entries
            .values()
            .map(|e| match e {
                FakeEntry::File { size, .. } => *size,
                FakeEntry::Directory => 0,
            })
            .sum();
        VfsStat {
            mounted: true,
            sector_size: 1,
            total_sectors: self.capacity,
            used_sectors: used,
            free_sectors: self.capacity.saturating_sub(used),
        }
    }

    /// Create every parent directory of `path`.
    fn ensure_parents(&mut self, path: &str) {
        let parts: Vec<&str> = path.split('/').collect();
        for i in 1..parts.len() {
            self.entries
                .entry(parts[..i].join("/"))
                .or_insert(FakeEntry::Directory);
        }
    }

    /// Entries below `dir` (or the whole volume for `""`), relative to it.
    fn list(&self, dir: &str) -> Vec<FileItem> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        self.entries
            .iter()
            .filter_map(|(path, entry)| {
                let rel = path.strip_prefix(&prefix)?;
                if rel.is_empty() {
                    return None;
                }
                Some(match entry {
                    FakeEntry::File { size, mtime } => FileItem {
                        mtime: *mtime,
                        ..FileItem::file(rel, *size)
                    },
                    FakeEntry::Directory => FileItem::directory(format!("{rel}/")),
                })
            })
            .collect()
    }

    fn remove_tree(&mut self, path: &str) {
        let prefix = format!("{path}/");
        self.entries
            .retain(|key, _| key != path && !key.starts_with(&prefix));
    }
}

#[derive(Debug)]
struct FakeState {
    volumes: BTreeMap<String, FakeVolume>,
    mkdir_supported: bool,
    fail_next: Option<ApiError>,
    calls: Vec<String>,
}

/// In-memory stand-in for the device's `/api/vfs` endpoints.
#[derive(Debug)]
pub struct FakeVfsApi {
    state: Mutex<FakeState>,
}

impl Default for FakeVfsApi {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &str) -> String {
    segments(path).collect::<Vec<_>>().join("/")
}

fn not_found(method: &str, volume: &str, path: &str) -> ApiError {
    ApiError::Status {
        method: method.to_string(),
        url: format!("/api/vfs{volume}/{path}"),
        status: 404,
        status_text: "Not Found".to_string(),
        text: Some(format!("{path}: not found")),
    }
}

fn conflict(method: &str, volume: &str, path: &str) -> ApiError {
    ApiError::Status {
        method: method.to_string(),
        url: format!("/api/vfs{volume}/{path}"),
        status: 409,
        status_text: "Conflict".to_string(),
        text: Some(format!("{path}: wrong entry type")),
    }
}

/// mtime stamped on uploads that do not carry one.
pub fn default_mtime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

impl FakeVfsApi {
    /// A device with no volumes.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                volumes: BTreeMap::new(),
                mkdir_supported: true,
                fail_next: None,
                calls: Vec::new(),
            }),
        }
    }

    /// Add an empty volume of [`DEFAULT_CAPACITY`].
    pub fn with_volume(mut self, volume: &str) -> Self {
        self.state.get_mut().volumes.insert(
            volume.to_string(),
            FakeVolume {
                capacity: DEFAULT_CAPACITY,
                entries: BTreeMap::new(),
            },
        );
        self
    }

    /// Add a file (and its parents) to an existing volume.
    pub fn with_file(mut self, volume: &str, path: &str, size: u64) -> Self {
        let path = normalize(path);
        if let Some(vol) = self.state.get_mut().volumes.get_mut(volume) {
            vol.ensure_parents(&path);
            vol.entries.insert(path, FakeEntry::File { size, mtime: None });
        }
        self
    }

    /// Add a directory (and its parents) to an existing volume.
    pub fn with_directory(mut self, volume: &str, path: &str) -> Self {
        let path = normalize(path);
        if let Some(vol) = self.state.get_mut().volumes.get_mut(volume) {
            vol.ensure_parents(&path);
            vol.entries.insert(path, FakeEntry::Directory);
        }
        self
    }

    /// Make `create_directory` answer `Unsupported`, like a flat filesystem.
    pub fn without_mkdir(mut self) -> Self {
        self.state.get_mut().mkdir_supported = false;
        self
    }

    /// Fail the next call with `err`.
    pub async fn fail_next(&self, err: ApiError) {
        self.state.lock().await.fail_next = Some(err);
    }

    /// Calls made so far, as `"op volume:path"`.
    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    /// Whether the server holds an entry at `path`.
    pub async fn exists(&self, volume: &str, path: &str) -> bool {
        let state = self.state.lock().await;
        state
            .volumes
            .get(volume)
            .is_some_and(|v| v.entries.contains_key(&normalize(path)))
    }

    /// Record the call and take any injected failure.
    async fn begin(
        &self,
        op: &str,
        volume: &str,
        path: &str,
    ) -> ApiResult<tokio::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("{op} {volume}:{path}"));
        match state.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl VfsApi for FakeVfsApi {
    async fn list_volumes(&self) -> ApiResult<Vec<VolumeListing>> {
        let state = self.begin("list_volumes", "", "").await?;
        Ok(state
            .volumes
            .iter()
            .map(|(path, vol)| VolumeListing {
                path: path.clone(),
                files: vol.list(""),
                vfs_stat: Some(vol.stat()),
            })
            .collect())
    }

    async fn get_volume_root(&self, volume: &str) -> ApiResult<VolumeListing> {
        let state = self.begin("get_volume_root", volume, "").await?;
        let vol = state
            .volumes
            .get(volume)
            .ok_or_else(|| not_found("GET", volume, ""))?;
        Ok(VolumeListing {
            path: volume.to_string(),
            files: vol.list(""),
            vfs_stat: Some(vol.stat()),
        })
    }

    async fn list_directory(&self, volume: &str, dir: &str) -> ApiResult<DirectoryListing> {
        let state = self.begin("list_directory", volume, dir).await?;
        let dir = normalize(dir);
        let vol = state
            .volumes
            .get(volume)
            .ok_or_else(|| not_found("GET", volume, &dir))?;
        match vol.entries.get(&dir) {
            Some(FakeEntry::Directory) => Ok(DirectoryListing {
                files: vol.list(&dir),
                vfs_stat: Some(vol.stat()),
                name: dir,
            }),
            Some(FakeEntry::File { .. }) => Err(conflict("GET", volume, &dir)),
            None => Err(not_found("GET", volume, &dir)),
        }
    }

    async fn create_directory(&self, volume: &str, dir: &str) -> ApiResult<DirectoryListing> {
        let mut state = self.begin("create_directory", volume, dir).await?;
        if !state.mkdir_supported {
            return Err(ApiError::unsupported("create_directory"));
        }
        let dir = normalize(dir);
        let vol = state
            .volumes
            .get_mut(volume)
            .ok_or_else(|| not_found("PUT", volume, &dir))?;
        if let Some(FakeEntry::File { .. }) = vol.entries.get(&dir) {
            return Err(conflict("PUT", volume, &dir));
        }
        vol.ensure_parents(&dir);
        vol.entries.insert(dir.clone(), FakeEntry::Directory);
        Ok(DirectoryListing {
            files: vol.list(&dir),
            vfs_stat: Some(vol.stat()),
            name: dir,
        })
    }

    async fn upload_file(
        &self,
        volume: &str,
        path: &str,
        content: Vec<u8>,
        mtime: Option<DateTime<Utc>>,
    ) -> ApiResult<UploadResponse> {
        let mut state = self.begin("upload_file", volume, path).await?;
        let path = normalize(path);
        let vol = state
            .volumes
            .get_mut(volume)
            .ok_or_else(|| not_found("PUT", volume, &path))?;
        if let Some(FakeEntry::Directory) = vol.entries.get(&path) {
            return Err(conflict("PUT", volume, &path));
        }
        let size = content.len() as u64;
        let mtime = mtime.unwrap_or_else(default_mtime);
        vol.ensure_parents(&path);
        vol.entries.insert(
            path.clone(),
            FakeEntry::File {
                size,
                mtime: Some(mtime),
            },
        );
        Ok(FileItem::file(path, size)
            .with_mtime(mtime)
            .with_vfs_stat(vol.stat()))
    }

    async fn delete_entry(&self, volume: &str, path: &str) -> ApiResult<DeleteResponse> {
        let mut state = self.begin("delete_entry", volume, path).await?;
        let path = normalize(path);
        let vol = state
            .volumes
            .get_mut(volume)
            .ok_or_else(|| not_found("DELETE", volume, &path))?;
        match vol.entries.get(&path) {
            Some(FakeEntry::File { .. }) => {
                vol.entries.remove(&path);
                Ok(DeleteResponse {
                    vfs_stat: Some(vol.stat()),
                })
            }
            Some(FakeEntry::Directory) => Err(conflict("DELETE", volume, &path)),
            None => Err(not_found("DELETE", volume, &path)),
        }
    }

    async fn delete_directory(&self, volume: &str, path: &str) -> ApiResult<DeleteResponse> {
        let mut state = self.begin("delete_directory", volume, path).await?;
        let path = normalize(path);
        let vol = state
            .volumes
            .get_mut(volume)
            .ok_or_else(|| not_found("DELETE", volume, &path))?;
        match vol.entries.get(&path) {
            Some(FakeEntry::Directory) => {
                vol.remove_tree(&path);
                Ok(DeleteResponse {
                    vfs_stat: Some(vol.stat()),
                })
            }
            Some(FakeEntry::File { .. }) => Err(conflict("DELETE", volume, &path)),
            None => Err(not_found("DELETE", volume, &path)),
        }
    }
}
