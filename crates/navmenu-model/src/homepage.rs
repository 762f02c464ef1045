//! Homepage link transform
//!
//! The remote side stores a link to the site root as a plain custom link;
//! the editor wants it as a distinguished page item so it can be treated
//! like any other page. Two pure rewrites convert between the views:
//! load rewrites matching custom links into the home-page pseudo-item,
//! save rewrites the pseudo-item back into a custom link. Alternating the
//! two is a no-op on the semantically relevant fields.

use crate::item::{
    ContentRef, ITEM_TYPE_CUSTOM, ITEM_TYPE_PAGE, TYPE_FAMILY_CUSTOM, TYPE_FAMILY_POST,
};
use crate::menu::Menu;
use crate::traverse::for_each_mut;

/// URL equality modulo one trailing slash on either operand
#[must_use]
pub fn urls_match(a: &str, b: &str) -> bool {
    strip_slash(a) == strip_slash(b)
}

fn strip_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// Rewrite site-root custom links into home-page pseudo-items
///
/// Applied to every fetched (or synthesized) menu before it enters the
/// store. Ids and names are preserved.
pub fn apply_load_transform(menu: &mut Menu, site_url: &str) {
    for_each_mut(&mut menu.items, &mut |item| {
        if item.item_type == ITEM_TYPE_CUSTOM && urls_match(&item.url, site_url) {
            item.item_type = ITEM_TYPE_PAGE.to_string();
            item.type_family = TYPE_FAMILY_POST.to_string();
            item.content = ContentRef::Homepage;
        }
    });
}

/// Rewrite home-page pseudo-items back into site-root custom links
///
/// Applied to the wire-bound copy of a menu before persistence.
pub fn apply_save_transform(menu: &mut Menu, site_url: &str) {
    let url = strip_slash(site_url).to_string();
    for_each_mut(&mut menu.items, &mut |item| {
        if item.item_type == ITEM_TYPE_PAGE && item.content.is_homepage() {
            item.item_type = ITEM_TYPE_CUSTOM.to_string();
            item.type_family = TYPE_FAMILY_CUSTOM.to_string();
            item.content = ContentRef::None;
            item.url = url.clone();
        }
    });
}
