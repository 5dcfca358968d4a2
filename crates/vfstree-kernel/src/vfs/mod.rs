//! In-memory mirror of the device's virtual filesystem.
//!
//! The device exposes several mounted volumes, each at a server-assigned
//! path. The client keeps one tree per volume, built from flat listings:
//!
//! ```text
//! Registry (sorted by volume path)
//! ├── /config            Volume
//! │   └── leds.ini       File
//! └── /sd                Volume
//!     ├── a/             Directory (loaded)
//!     │   └── b.txt      File
//!     └── logs/          Directory (not loaded, fetched on expand)
//! ```
//!
//! Listings name entries by `/`-joined relative paths and omit the parent
//! directories, so every operation walks the path and materializes missing
//! ancestors the way `mkdir -p` would.

mod node;
mod path;
mod registry;
mod tree;
mod volume;

pub use node::{Directory, File, Node};
pub use path::{join, segments, split, SEPARATOR};
pub use registry::Registry;
pub use tree::{build_directory, insert_item, insert_node, remove, AncestorState, TreeError};
pub use volume::Volume;
