//! Path splitting.
//!
//! Node names never contain separators; only input paths do.

use super::tree::TreeError;

pub const SEPARATOR: char = '/';

/// Iterate the non-empty segments of a path.
///
/// Leading, trailing and repeated separators are ignored, so `"a/"`,
/// `"/a"` and `"a//"` all yield `["a"]`.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// Split a path into its parent segments and final name.
pub fn split(path: &str) -> Result<(Vec<&str>, &str), TreeError> {
    let mut parents: Vec<&str> = segments(path).collect();
    let name = parents
        .pop()
        .ok_or_else(|| TreeError::EmptyPath(path.to_string()))?;
    Ok((parents, name))
}

/// Join a relative parent path and a child name.
pub fn join(parent: &str, name: &str) -> String {
    let parent = parent.trim_end_matches(SEPARATOR);
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}
