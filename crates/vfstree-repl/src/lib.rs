//! vfsh: an interactive console for a device's virtual filesystem.
//!
//! The console keeps a [`TreeManager`] and maps each input line to one
//! manager operation. Browsing (`ls`, `tree`, `stat`) only reads the local
//! tree; `volumes` and `load` fetch on demand.

pub mod config;
pub mod render;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use vfstree_kernel::{Directory, Node, TreeManager, VfsApi, VfsError};

pub use config::{ConfigError, ConsoleConfig};

/// Errors from a single console command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown command: {0}\ntype `help` for available commands")]
    Unknown(String),

    #[error("{volume}:{path} is not a directory")]
    NotADirectory { volume: String, path: String },

    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Vfs(#[from] VfsError),
}

const HELP_TEXT: &str = r#"Commands:
  volumes                    Fetch and list all volumes
  ls [-s] VOLUME [DIR]       List a directory (`/` = directory, `…` = not loaded;
                             -s sorts directories first, then by name)
  tree VOLUME                Show everything known below a volume
  load VOLUME [DIR]          Fetch a volume or directory from the device
  mkdir VOLUME DIR           Create a directory
  put VOLUME PATH LOCALFILE  Upload a local file
  rm VOLUME PATH             Delete a file
  rmdir VOLUME PATH          Delete a directory and its contents
  stat VOLUME                Show volume usage
  help                       Show this help
  quit                       Exit

Volumes may be given with or without the leading `/` (`sd` or `/sd`).
"#;

fn usage(command: &str) -> &'static str {
    match command {
        "volumes" => "volumes",
        "ls" => "ls [-s] VOLUME [DIR]",
        "tree" => "tree VOLUME",
        "load" => "load VOLUME [DIR]",
        "mkdir" => "mkdir VOLUME DIR",
        "put" => "put VOLUME PATH LOCALFILE",
        "rm" => "rm VOLUME PATH",
        "rmdir" => "rmdir VOLUME PATH",
        "stat" => "stat VOLUME",
        _ => "help",
    }
}

/// Volume paths are server-assigned and start with `/`.
fn volume_path(volume: &str) -> String {
    if volume.starts_with('/') {
        volume.to_string()
    } else {
        format!("/{volume}")
    }
}

/// Console state.
pub struct Repl<A> {
    manager: TreeManager<A>,
    done: bool,
}

impl<A: VfsApi> Repl<A> {
    pub fn new(api: A) -> Self {
        Self {
            manager: TreeManager::new(api),
            done: false,
        }
    }

    pub fn manager(&self) -> &TreeManager<A> {
        &self.manager
    }

    /// Whether `quit` was entered.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Run one input line.
    pub async fn process_line(&mut self, line: &str) -> Result<Option<String>, CommandError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            return Ok(None);
        };
        if command.starts_with('#') {
            return Ok(None);
        }

        match (command, args) {
            ("help" | "?", _) => Ok(Some(HELP_TEXT.trim_end().to_string())),
            ("quit" | "exit" | "q", _) => {
                self.done = true;
                Ok(None)
            }
            ("volumes", []) => self.volumes().await,
            ("ls", ["-s", volume]) => self.ls(volume, "", true),
            ("ls", ["-s", volume, dir]) => self.ls(volume, dir, true),
            ("ls", [volume]) => self.ls(volume, "", false),
            ("ls", [volume, dir]) => self.ls(volume, dir, false),
            ("tree", [volume]) => self.tree(volume),
            ("load", [volume]) => self.load_root(volume).await,
            ("load", [volume, dir]) => self.load_directory(volume, dir).await,
            ("mkdir", [volume, dir]) => self.mkdir(volume, dir).await,
            ("put", [volume, path, local]) => self.put(volume, path, Path::new(local)).await,
            ("rm", [volume, path]) => self.rm(volume, path, false).await,
            ("rmdir", [volume, path]) => self.rm(volume, path, true).await,
            ("stat", [volume]) => self.stat(volume),
            (
                "volumes" | "ls" | "tree" | "load" | "mkdir" | "put" | "rm" | "rmdir" | "stat",
                _,
            ) => Err(CommandError::Usage(usage(command))),
            _ => Err(CommandError::Unknown(command.to_string())),
        }
    }

    async fn volumes(&mut self) -> Result<Option<String>, CommandError> {
        let registry = self.manager.load_volumes().await?;
        if registry.is_empty() {
            return Ok(Some("(no volumes)".to_string()));
        }
        let lines: Vec<String> = registry.volumes().map(render::volume_line).collect();
        Ok(Some(lines.join("\n")))
    }

    fn directory(&self, volume: &str, dir: &str) -> Result<&Directory, CommandError> {
        let found = self
            .manager
            .volume(volume)
            .ok_or_else(|| VfsError::UnknownVolume(volume.to_string()))?;
        if dir.trim_matches('/').is_empty() {
            return Ok(found.root());
        }
        found
            .lookup(dir)
            .and_then(Node::as_directory)
            .ok_or_else(|| CommandError::NotADirectory {
                volume: volume.to_string(),
                path: dir.to_string(),
            })
    }

    fn ls(&self, volume: &str, dir: &str, sorted: bool) -> Result<Option<String>, CommandError> {
        let volume = volume_path(volume);
        let dir = self.directory(&volume, dir)?;
        Ok(Some(render::listing(dir, sorted)))
    }

    fn tree(&self, volume: &str) -> Result<Option<String>, CommandError> {
        let volume = volume_path(volume);
        let root = self.directory(&volume, "")?;
        Ok(Some(render::tree(&volume, root)))
    }

    fn stat(&self, volume: &str) -> Result<Option<String>, CommandError> {
        let volume = volume_path(volume);
        let found = self
            .manager
            .volume(&volume)
            .ok_or_else(|| VfsError::UnknownVolume(volume.clone()))?;
        let text = found
            .stat()
            .map(render::stat)
            .unwrap_or_else(|| "no stats".to_string());
        Ok(Some(format!("{volume}: {text}")))
    }

    async fn load_root(&mut self, volume: &str) -> Result<Option<String>, CommandError> {
        let loaded = self.manager.load_volume_root(&volume_path(volume)).await?;
        Ok(Some(render::listing(loaded.root(), false)))
    }

    async fn load_directory(
        &mut self,
        volume: &str,
        dir: &str,
    ) -> Result<Option<String>, CommandError> {
        let loaded = self.manager.load_directory(&volume_path(volume), dir).await?;
        Ok(Some(render::listing(loaded, false)))
    }

    async fn mkdir(&mut self, volume: &str, dir: &str) -> Result<Option<String>, CommandError> {
        let volume = volume_path(volume);
        self.manager.create_directory(&volume, dir).await?;
        Ok(Some(format!("created {volume}:{}/", dir.trim_matches('/'))))
    }

    async fn put(
        &mut self,
        volume: &str,
        path: &str,
        local: &Path,
    ) -> Result<Option<String>, CommandError> {
        let read_error = |source| CommandError::ReadFile {
            path: local.to_path_buf(),
            source,
        };
        let content = tokio::fs::read(local).await.map_err(read_error)?;
        let mtime = tokio::fs::metadata(local)
            .await
            .map_err(read_error)?
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);

        let volume = volume_path(volume);
        let file = self.manager.upload_file(&volume, path, content, mtime).await?;
        Ok(Some(format!(
            "uploaded {volume}:{} ({} bytes)",
            path.trim_matches('/'),
            file.size()
        )))
    }

    async fn rm(
        &mut self,
        volume: &str,
        path: &str,
        directory: bool,
    ) -> Result<Option<String>, CommandError> {
        let volume = volume_path(volume);
        let removed = if directory {
            self.manager.delete_directory(&volume, path).await?
        } else {
            self.manager.delete_file(&volume, path).await?
        };

        let path = path.trim_matches('/');
        Ok(Some(match removed {
            Some(_) => format!("deleted {volume}:{path}"),
            None => format!("deleted {volume}:{path} (was not in the tree)"),
        }))
    }
}
