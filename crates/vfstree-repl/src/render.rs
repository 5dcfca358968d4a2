//! Text rendering of tree state.

use vfstree_kernel::{Directory, Node, Volume};
use vfstree_types::VfsStat;

/// Marker on directories whose contents have not been fetched.
pub const UNLOADED: &str = "…";

fn entry_name(node: &Node) -> String {
    match node {
        Node::Directory(dir) if dir.is_loaded() => format!("{}/", dir.name()),
        Node::Directory(dir) => format!("{}/{UNLOADED}", dir.name()),
        Node::File(file) => file.name().to_string(),
    }
}

/// Children of `dir` one per line, in display order or directories first
/// and by name when `sorted`.
pub fn listing(dir: &Directory, sorted: bool) -> String {
    if dir.is_empty() {
        return if dir.is_loaded() {
            "(empty)".to_string()
        } else {
            format!("({UNLOADED} not loaded)")
        };
    }

    let children = if sorted {
        dir.sorted_children()
    } else {
        dir.children().collect()
    };
    children
        .into_iter()
        .map(|node| match node.size() {
            Some(size) => format!("{size:>10}  {}", entry_name(node)),
            None => format!("{:>10}  {}", "", entry_name(node)),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The whole subtree below `dir`, indented by depth.
pub fn tree(name: &str, dir: &Directory) -> String {
    let mut lines = vec![name.to_string()];
    for (path, node) in dir.walk() {
        let depth = path.matches('/').count() + 1;
        lines.push(format!("{}{}", "  ".repeat(depth), entry_name(node)));
    }
    lines.join("\n")
}

pub fn stat(stat: &VfsStat) -> String {
    if !stat.mounted {
        return "not mounted".to_string();
    }
    format!(
        "{} used, {} free, {} total",
        bytes(stat.used_bytes()),
        bytes(stat.free_bytes()),
        bytes(stat.total_bytes())
    )
}

/// One summary line per volume.
pub fn volume_line(volume: &Volume) -> String {
    let summary = volume.stat().map(stat).unwrap_or_else(|| "no stats".to_string());
    format!("{:<12} {:>4} entries  {}", volume.path(), volume.root().len(), summary)
}

fn bytes(n: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if n < 1024 {
        return format!("{n} B");
    }
    let mut value = n as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
