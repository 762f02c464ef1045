//! Menus and theme locations
//!
//! A [`Menu`] owns an ordered item tree and the list of theme locations it
//! currently occupies. Menu id 0 is reserved for the synthesized default
//! menu; persisted menus carry server-issued positive identifiers, and
//! `id == None` marks a menu the remote side does not know yet.

use crate::item::{ItemId, MenuItem};
use serde::{Deserialize, Serialize};

/// Menu identifier issued by the remote system
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MenuId(pub u64);

impl MenuId {
    /// Reserved id of the synthesized default menu
    pub const DEFAULT: MenuId = MenuId(0);

    /// Whether this is the default-menu sentinel
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

impl std::fmt::Display for MenuId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A navigation menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Menu {
    /// Remote identity; `None` for menus not yet known to the remote side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<MenuId>,
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Ordered item tree
    #[serde(default)]
    pub items: Vec<MenuItem>,
    /// Theme locations this menu occupies
    #[serde(default)]
    pub locations: Vec<String>,
    /// Remote save timestamp, opaque to the engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_save_time: Option<u64>,
}

impl Menu {
    /// Create an empty named menu with no remote identity
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With a remote id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: MenuId) -> Self {
        self.id = Some(id);
        self
    }

    /// With an item tree
    #[inline]
    #[must_use]
    pub fn with_items(mut self, items: Vec<MenuItem>) -> Self {
        self.items = items;
        self
    }

    /// With locations
    #[inline]
    #[must_use]
    pub fn with_locations(mut self, locations: Vec<String>) -> Self {
        self.locations = locations;
        self
    }

    /// Whether this is the synthesized default menu
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.id == Some(MenuId::DEFAULT)
    }

    /// Whether any item in the tree carries the given client id
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.iter().any(|n| n.id == Some(id))
    }

    /// Pre-order iterator over every item of the tree
    pub fn iter(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter().flat_map(|item| item.descend())
    }

    /// Total number of items in the tree
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the tree has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A theme location a menu can be assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Location name ("primary", "footer", ...)
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

impl Location {
    /// Create a location
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Name of the location the default menu attaches to
pub const PRIMARY_LOCATION: &str = "primary";

/// The primary location: the one named "primary", else the first one
#[must_use]
pub fn primary_location(locations: &[Location]) -> Option<&Location> {
    locations
        .iter()
        .find(|l| l.name == PRIMARY_LOCATION)
        .or_else(|| locations.first())
}
