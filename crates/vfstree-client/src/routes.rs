//! URL construction for the `/api/vfs` endpoints.

use reqwest::Url;

use vfstree_kernel::vfs::segments;
use vfstree_kernel::ApiError;

/// Whether a route names a directory (trailing `/`) or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Directory,
    File,
}

/// `{base}/api/vfs`
pub(crate) fn volumes(base: &Url) -> Result<Url, ApiError> {
    build(base, &[], Target::File)
}

/// `{base}/api/vfs/{volume}/{path}`, with a trailing `/` for directories.
///
/// Each segment is percent-encoded on its own; repeated or leading `/` in
/// either part collapse away.
pub(crate) fn entry(base: &Url, volume: &str, path: &str, target: Target) -> Result<Url, ApiError> {
    let parts: Vec<&str> = segments(volume).chain(segments(path)).collect();
    build(base, &parts, target)
}

fn build(base: &Url, parts: &[&str], target: Target) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| ApiError::Transport(format!("{base} cannot be a base url")))?;
        path.pop_if_empty().extend(["api", "vfs"]).extend(parts);
        if target == Target::Directory {
            path.push("");
        }
    }
    Ok(url)
}
