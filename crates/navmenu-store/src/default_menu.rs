//! Default menu synthesis
//!
//! When no real menu occupies the primary location, the store shows a
//! virtual, locally-only menu built from the site's top-level published
//! pages. It carries the reserved menu id 0 and only becomes real when
//! the user edits and saves it.

use navmenu_api::PageSummary;
use navmenu_model::{
    apply_load_transform, IdAllocator, Menu, MenuId, MenuItem,
};

/// Name given to the synthesized menu (until the user renames it)
pub const DEFAULT_MENU_NAME: &str = "Default Menu";

/// Label given to the front-page item
pub const HOME_ITEM_NAME: &str = "Home";

/// Build the default menu from a site's top-level pages
///
/// One leaf page item per page; the page configured as the site's front
/// page is renamed [`HOME_ITEM_NAME`] and moved to the front regardless of
/// its original position. The result goes through id allocation and the
/// homepage load transform exactly like a fetched menu.
#[must_use]
pub fn synthesize(
    pages: &[PageSummary],
    primary_location: &str,
    site_url: &str,
    allocator: &mut IdAllocator,
) -> Menu {
    let mut items: Vec<MenuItem> = pages
        .iter()
        .map(|page| {
            let mut item = MenuItem::page(page.title.clone(), page.id);
            item.url = page.url.clone();
            item
        })
        .collect();

    if let Some(pos) = pages.iter().position(|p| p.is_front_page) {
        let mut front = items.remove(pos);
        front.name = HOME_ITEM_NAME.to_string();
        items.insert(0, front);
    }

    let mut menu = Menu::new(DEFAULT_MENU_NAME)
        .with_id(MenuId::DEFAULT)
        .with_items(items)
        .with_locations(vec![primary_location.to_string()]);

    allocator.assign_client_ids(&mut menu);
    apply_load_transform(&mut menu, site_url);
    menu
}
