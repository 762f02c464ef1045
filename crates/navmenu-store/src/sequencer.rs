//! Save-time resolution of new-page placeholders
//!
//! A menu about to be persisted may contain items standing in for pages
//! that do not exist yet. Each one is resolved against the page-creation
//! collaborator strictly in sequence; the collaborator is stateful and
//! single-flight, so two creations must never overlap. The first failure
//! abandons the whole sequence before any menu-level persistence happens.

use crate::error::StoreError;
use navmenu_api::{MenuApi, PageDraft, SiteId};
use navmenu_model::item::{ITEM_TYPE_PAGE, STATUS_PUBLISH, TYPE_FAMILY_POST};
use navmenu_model::traverse::{find, find_mut_by};
use navmenu_model::{ContentRef, Menu};

/// Resolve every new-page placeholder in the menu, in order
///
/// Placeholders are located by content kind, not id: by the time the
/// sequencer runs, ids have been restored for the wire and unsaved nodes
/// are id-less. Each resolved item is rewritten in place with the created
/// page's identifier and URL. Returns how many pages were created.
pub async fn resolve_new_pages(
    api: &dyn MenuApi,
    site: SiteId,
    menu: &mut Menu,
) -> Result<usize, StoreError> {
    let mut created = 0;
    loop {
        let title = match find(&menu.items, &|n| n.content.is_new_page()) {
            Some(item) => item.name.clone(),
            None => break,
        };

        tracing::debug!(site = %site, title = %title, "creating page for placeholder");
        let page = api
            .create_page(
                site,
                PageDraft {
                    title: title.clone(),
                    status: STATUS_PUBLISH.to_string(),
                },
            )
            .await
            .map_err(|source| StoreError::PageCreation { title, source })?;

        if let Some(item) = find_mut_by(&mut menu.items, &|n| n.content.is_new_page()) {
            item.content = ContentRef::Post(page.id);
            item.url = page.url;
            item.item_type = ITEM_TYPE_PAGE.to_string();
            item.type_family = TYPE_FAMILY_POST.to_string();
        }
        created += 1;
    }

    if created > 0 {
        tracing::info!(site = %site, created, "resolved new-page placeholders");
    }
    Ok(created)
}
