//! Navmenu API - collaborator seam
//!
//! The engine performs no I/O itself; everything remote goes through the
//! [`MenuApi`] trait:
//! - fetching a site's locations and menus
//! - persisting, creating, and deleting menus
//! - listing top-level pages for default-menu synthesis
//! - creating pages for new-page placeholders (single-flight by contract)
//!
//! Wire formats are the implementor's concern; the trait trades in the
//! typed model only.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use async_trait::async_trait;
use navmenu_model::{Location, Menu, MenuId};
use serde::{Deserialize, Serialize};

/// Site identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SiteId(pub u64);

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full menu state of a site, as fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MenusPayload {
    /// Theme locations the site offers
    pub locations: Vec<Location>,
    /// All menus known to the remote side
    pub menus: Vec<Menu>,
}

/// A top-level page, as listed for default-menu synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    /// Remote content id
    pub id: u64,
    /// Page title
    pub title: String,
    /// Public URL
    pub url: String,
    /// Whether this page is configured as the site's front page
    pub is_front_page: bool,
}

/// Draft handed to the page-creation collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDraft {
    /// Title of the page to create
    pub title: String,
    /// Publication status to create it with
    pub status: String,
}

/// Result of creating a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPage {
    /// Remote content id of the new page
    pub id: u64,
    /// Public URL of the new page
    pub url: String,
}

/// Remote-collaborator failures
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (network, serialization, ...)
    #[error("transport error: {0}")]
    Transport(#[from] anyhow::Error),

    /// The remote side understood and refused the request
    #[error("remote rejected request: {0}")]
    Rejected(String),
}

impl ApiError {
    /// Whether retrying the same request could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Remote collaborator interface
///
/// All calls are asynchronous and side-effect-free on the engine's own
/// state; the store decides what to do with each response.
///
/// # Contract
/// `create_page` is single-flight: callers must never have two creations
/// in flight at once.
#[async_trait]
pub trait MenuApi: Send + Sync {
    /// Fetch the full `{locations, menus}` state of a site
    async fn fetch_menus(&self, site: SiteId) -> Result<MenusPayload, ApiError>;

    /// Persist a menu; the returned menu carries server-resolved ids
    async fn save_menu(&self, site: SiteId, menu: Menu) -> Result<Menu, ApiError>;

    /// Delete a menu; `Ok(false)` means the remote side declined
    async fn delete_menu(&self, site: SiteId, menu: MenuId) -> Result<bool, ApiError>;

    /// Create an empty menu with the given name
    async fn create_menu(&self, site: SiteId, name: &str) -> Result<Menu, ApiError>;

    /// List the site's top-level published pages
    async fn fetch_top_level_pages(&self, site: SiteId) -> Result<Vec<PageSummary>, ApiError>;

    /// Create a page for a new-page placeholder
    async fn create_page(&self, site: SiteId, draft: PageDraft) -> Result<CreatedPage, ApiError>;
}
