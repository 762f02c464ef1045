//! Client/server id reconciliation
//!
//! Fetched trees arrive carrying remote ids. For offline-optimistic
//! editing every node gets a fresh client id from a single monotonic
//! counter; the remote id parks in `server_id` until save time, when
//! [`restore_server_ids`] puts it back. Nodes that never had a remote id
//! come back id-less, which the remote side reads as "create this node".

use crate::item::{ItemId, MenuItem};
use crate::menu::Menu;
use crate::traverse::for_each_mut;

/// Monotonic client-id source
///
/// One allocator per store instance makes client ids unique across all
/// menus and nesting depths for the store's whole life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator; ids start at 1
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Next client id
    #[inline]
    pub fn next_id(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next += 1;
        id
    }

    /// Give every item of the menu a fresh client id
    ///
    /// The existing id (if any) moves to `server_id`; the menu's own id is
    /// never touched.
    pub fn assign_client_ids(&mut self, menu: &mut Menu) {
        for_each_mut(&mut menu.items, &mut |item| {
            item.server_id = item.id;
            item.id = Some(self.next_id());
        });
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Put remote ids back on every item of the menu
///
/// Inverse of [`IdAllocator::assign_client_ids`]: `id` becomes the parked
/// `server_id`, or `None` for nodes the remote side has never seen.
pub fn restore_server_ids(menu: &mut Menu) {
    for_each_mut(&mut menu.items, &mut |item| {
        item.id = item.server_id;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fetched_menu() -> Menu {
        Menu::new("m").with_items(vec![
            MenuItem::custom("a", "/a")
                .with_id(ItemId(100))
                .with_children(vec![MenuItem::custom("b", "/b").with_id(ItemId(200))]),
            MenuItem::custom("local", "/local"), // no remote id yet
        ])
    }

    #[test]
    fn assign_parks_remote_ids_and_numbers_from_one() {
        let mut menu = fetched_menu();
        let mut alloc = IdAllocator::new();
        alloc.assign_client_ids(&mut menu);

        let ids: Vec<_> = menu.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![Some(ItemId(1)), Some(ItemId(2)), Some(ItemId(3))]);

        let server: Vec<_> = menu.iter().map(|n| n.server_id).collect();
        assert_eq!(server, vec![Some(ItemId(100)), Some(ItemId(200)), None]);
    }

    #[test]
    fn counter_spans_menus() {
        let mut alloc = IdAllocator::new();
        let mut first = fetched_menu();
        let mut second = fetched_menu();
        alloc.assign_client_ids(&mut first);
        alloc.assign_client_ids(&mut second);

        let mut all: Vec<_> = first.iter().chain(second.iter()).map(|n| n.id).collect();
        let before = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), before);
    }

    #[test]
    fn restore_is_the_inverse() {
        let original = fetched_menu();
        let mut menu = original.clone();
        let mut alloc = IdAllocator::new();

        alloc.assign_client_ids(&mut menu);
        restore_server_ids(&mut menu);

        let restored: Vec<_> = menu.iter().map(|n| n.id).collect();
        let expected: Vec<_> = original.iter().map(|n| n.id).collect();
        assert_eq!(restored, expected);
        // the never-persisted node is id-less again
        assert_eq!(restored[2], None);
    }

    #[test]
    fn menu_level_id_is_untouched() {
        use crate::menu::MenuId;

        let mut menu = fetched_menu().with_id(MenuId(7));
        let mut alloc = IdAllocator::new();
        alloc.assign_client_ids(&mut menu);
        assert_eq!(menu.id, Some(MenuId(7)));
        restore_server_ids(&mut menu);
        assert_eq!(menu.id, Some(MenuId(7)));
    }
}
