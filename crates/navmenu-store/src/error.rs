//! Error types for the menu store
//!
//! Three families, matching how failures are handled:
//! - fetch failures: state stays at the last-known-good value
//! - validation failures: the operation is a no-op
//! - persistence failures: optimistic edits roll back (delete) or dirty
//!   flags stay set (save) so nothing is silently lost

use navmenu_api::ApiError;
use navmenu_model::{MenuId, TreeError};

/// Main store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No site has been opened yet
    #[error("no site selected")]
    NoSite,

    /// Loading menus or default-menu pages failed
    #[error("fetch failed: {0}")]
    Fetch(#[source] ApiError),

    /// The operation names a menu unknown to local state
    #[error("unknown menu: {0}")]
    UnknownMenu(MenuId),

    /// Bare save with no pending change to resolve a target from
    #[error("no pending change to save")]
    NothingToSave,

    /// Restore invoked with no recently deleted menu pending
    #[error("no recently deleted menu to restore")]
    NothingToRestore,

    /// The persistence collaborator rejected a menu save
    #[error("save failed: {0}")]
    Save(#[source] ApiError),

    /// The persistence collaborator rejected a menu delete
    #[error("delete failed: {0}")]
    Delete(#[source] ApiError),

    /// The persistence collaborator rejected a menu creation
    #[error("menu creation failed: {0}")]
    CreateMenu(#[source] ApiError),

    /// A new-page placeholder could not be resolved; the save was aborted
    /// before any menu-level persistence
    #[error("page creation failed for {title:?}: {source}")]
    PageCreation {
        title: String,
        #[source]
        source: ApiError,
    },

    /// A structural edit failed
    #[error("tree edit failed: {0}")]
    Tree(#[from] TreeError),
}

impl StoreError {
    /// Whether this is a validation failure (local no-op, nothing remote
    /// was attempted)
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoSite
                | Self::UnknownMenu(_)
                | Self::NothingToSave
                | Self::NothingToRestore
                | Self::Tree(_)
        )
    }
}
