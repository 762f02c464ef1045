//! Navmenu Model - typed menu/item tree
//!
//! The pure data side of the menu engine:
//! - Menus, items, and theme locations
//! - Depth-first traversal and structural edits (insert/move/delete)
//! - Client/server id reconciliation for offline-optimistic editing
//! - The bidirectional homepage link transform
//!
//! No I/O and no async: everything here is testable against plain values.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod allocate;
pub mod homepage;
pub mod item;
pub mod menu;
pub mod traverse;

// Re-exports for convenience
pub use allocate::{restore_server_ids, IdAllocator};
pub use homepage::{apply_load_transform, apply_save_transform, urls_match};
pub use item::{ContentRef, ItemId, MenuItem};
pub use menu::{primary_location, Location, Menu, MenuId, PRIMARY_LOCATION};
pub use traverse::{Position, TreeError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the menu model
    pub use crate::{
        ContentRef, IdAllocator, ItemId, Location, Menu, MenuId, MenuItem, Position, TreeError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
