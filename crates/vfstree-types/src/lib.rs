//! Pure wire types for vfstree: listings, volume stats and operation responses.
//!
//! This crate is a leaf dependency with no async runtime and no I/O. It
//! describes the JSON shapes the device's `/api/vfs` endpoints speak, so the
//! tree kernel, the HTTP client and the test fakes all agree on one model.

pub mod item;
pub mod listing;
pub mod stat;

// Flat re-exports for convenience
pub use item::*;
pub use listing::*;
pub use stat::*;
