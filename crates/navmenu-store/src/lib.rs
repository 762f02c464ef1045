//! Navmenu Store - the menu engine's orchestrator
//!
//! Owns one site's in-memory menu state and coordinates:
//! - fetch-on-site-change with stale-response protection
//! - structural edits through the tree model, with dirty-flag tracking
//! - default-menu synthesis from the site's top-level pages
//! - sequenced new-page creation ahead of every save
//! - typed change/saving/saved/error notifications for UI collaborators
//!
//! # Example
//!
//! ```rust,ignore
//! use navmenu_store::MenuStore;
//! use navmenu_api::SiteId;
//! use std::sync::Arc;
//!
//! # async fn example(api: Arc<dyn navmenu_api::MenuApi>) -> Result<(), Box<dyn std::error::Error>> {
//! let store = MenuStore::new(api);
//! let mut events = store.subscribe();
//!
//! store.open_site(SiteId(77), "https://example.com").await?;
//! let snapshot = store.snapshot().await;
//! println!("{} menus", snapshot.menus.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod default_menu;
pub mod error;
pub mod events;
pub mod sequencer;
pub mod store;

// Re-exports for convenience
pub use default_menu::{synthesize, DEFAULT_MENU_NAME, HOME_ITEM_NAME};
pub use error::StoreError;
pub use events::{EventHub, StoreEvent};
pub use sequencer::resolve_new_pages;
pub use store::{
    ChangeOptions, MenuStore, SaveTarget, StoreSnapshot, DEFAULT_SAVE_ROUNDTRIP,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the menu store
    pub use crate::{MenuStore, SaveTarget, StoreError, StoreEvent, StoreSnapshot};
    pub use navmenu_api::{MenuApi, SiteId};
    pub use navmenu_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
