//! Menu item tree nodes
//!
//! A [`MenuItem`] is one node of a menu's ordered tree. Every node carries
//! two identities:
//! - a client id, assigned locally from a monotonic counter and never sent
//!   over the wire;
//! - an optional server id, the identifier the remote system knows the node
//!   by (absent for nodes created locally and not yet persisted).

use serde::{Deserialize, Serialize};

/// Item type for ordinary page links
pub const ITEM_TYPE_PAGE: &str = "page";
/// Item type for free-form URL links
pub const ITEM_TYPE_CUSTOM: &str = "custom";
/// Type family for post-backed items
pub const TYPE_FAMILY_POST: &str = "post_type";
/// Type family for custom links
pub const TYPE_FAMILY_CUSTOM: &str = "custom";
/// Publication status carried by synthesized and placeholder items
pub const STATUS_PUBLISH: &str = "publish";

/// Client-side item identifier
///
/// Process-lifetime-scoped; unique across all menus and nesting depths of
/// one store instance. The same numeric space is reused for server ids,
/// which are simply the remote system's integers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a menu item points at
///
/// Replaces the sentinel content-id integers of the wire format with an
/// explicit enum: ordinary items reference a post, the home-page
/// pseudo-item and the new-page placeholder are their own variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentRef {
    /// No content reference (custom links)
    #[default]
    None,
    /// A real remote content identifier
    Post(u64),
    /// The site's home page, edited as a distinguished page item
    Homepage,
    /// A page that does not exist yet; resolved at save time
    NewPage,
}

impl ContentRef {
    /// Whether this is the new-page placeholder
    #[inline]
    #[must_use]
    pub fn is_new_page(&self) -> bool {
        matches!(self, Self::NewPage)
    }

    /// Whether this is the home-page pseudo-item reference
    #[inline]
    #[must_use]
    pub fn is_homepage(&self) -> bool {
        matches!(self, Self::Homepage)
    }
}

/// One node of a menu's item tree
///
/// `items` is ordered; an empty list means leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MenuItem {
    /// Client id; `None` only after server ids have been restored for a
    /// node that was never persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    /// Remote identifier, absent for unsaved nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<ItemId>,
    /// Content reference
    pub content: ContentRef,
    /// Display label
    pub name: String,
    /// Link target
    pub url: String,
    /// Item type ("page", "custom", ...)
    pub item_type: String,
    /// Item type family ("post_type", "custom", ...)
    pub type_family: String,
    /// Remote-side tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Publication status of the referenced content
    pub status: String,
    /// Ordered children
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<MenuItem>,
}

impl MenuItem {
    /// Create a page item referencing an existing post
    #[must_use]
    pub fn page(name: impl Into<String>, post_id: u64) -> Self {
        Self {
            content: ContentRef::Post(post_id),
            name: name.into(),
            item_type: ITEM_TYPE_PAGE.to_string(),
            type_family: TYPE_FAMILY_POST.to_string(),
            status: STATUS_PUBLISH.to_string(),
            ..Self::default()
        }
    }

    /// Create a custom link item
    #[must_use]
    pub fn custom(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: ContentRef::None,
            name: name.into(),
            url: url.into(),
            item_type: ITEM_TYPE_CUSTOM.to_string(),
            type_family: TYPE_FAMILY_CUSTOM.to_string(),
            status: STATUS_PUBLISH.to_string(),
            ..Self::default()
        }
    }

    /// Create a new-page placeholder; the save sequencer turns it into a
    /// real page item before persistence
    #[must_use]
    pub fn new_page_placeholder(title: impl Into<String>) -> Self {
        Self {
            content: ContentRef::NewPage,
            name: title.into(),
            item_type: ITEM_TYPE_PAGE.to_string(),
            type_family: TYPE_FAMILY_POST.to_string(),
            status: STATUS_PUBLISH.to_string(),
            ..Self::default()
        }
    }

    /// With an explicit client id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    /// With an explicit server id
    #[inline]
    #[must_use]
    pub fn with_server_id(mut self, id: ItemId) -> Self {
        self.server_id = Some(id);
        self
    }

    /// With children
    #[inline]
    #[must_use]
    pub fn with_children(mut self, items: Vec<MenuItem>) -> Self {
        self.items = items;
        self
    }

    /// Whether this node has no children
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.items.is_empty()
    }

    /// Pre-order iterator over this node and all of its descendants
    pub fn descend(&self) -> Descend<'_> {
        Descend {
            stack: vec![std::slice::from_ref(self).iter()],
        }
    }

    /// Number of nodes in this subtree, including self
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        self.descend().count()
    }
}

/// Pre-order iterator over a subtree
#[derive(Debug)]
pub struct Descend<'a> {
    stack: Vec<std::slice::Iter<'a, MenuItem>>,
}

impl<'a> Iterator for Descend<'a> {
    type Item = &'a MenuItem;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            if let Some(item) = top.next() {
                if !item.items.is_empty() {
                    self.stack.push(item.items.iter());
                }
                return Some(item);
            }
            self.stack.pop();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_item_defaults() {
        let item = MenuItem::page("About", 42);
        assert_eq!(item.content, ContentRef::Post(42));
        assert_eq!(item.item_type, ITEM_TYPE_PAGE);
        assert_eq!(item.type_family, TYPE_FAMILY_POST);
        assert!(item.id.is_none());
        assert!(item.is_leaf());
    }

    #[test]
    fn placeholder_is_new_page() {
        let item = MenuItem::new_page_placeholder("Draft");
        assert!(item.content.is_new_page());
        assert_eq!(item.name, "Draft");
    }

    #[test]
    fn descend_is_pre_order() {
        let tree = MenuItem::custom("a", "/a").with_children(vec![
            MenuItem::custom("b", "/b")
                .with_children(vec![MenuItem::custom("c", "/c")]),
            MenuItem::custom("d", "/d"),
        ]);

        let names: Vec<&str> = tree.descend().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        assert_eq!(tree.subtree_len(), 4);
    }
}
