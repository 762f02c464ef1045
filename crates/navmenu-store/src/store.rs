//! The menu store
//!
//! Owns the fetched `{locations, menus}` state of one site and every
//! mutation on it:
//! - structural item edits (add/move/delete) via the tree model
//! - menu lifecycle (add/delete/restore/rename-on-materialize)
//! - location assignment with the one-menu-per-location invariant
//! - dirty-flag tracking and the save paths, including the synthesized
//!   default menu and save-time page creation
//!
//! State lives behind a `tokio::sync::Mutex`; methods take `&self`, drop
//! the lock across every collaborator call, and re-check a generation
//! counter on resume so a response for a site the user has already left
//! is discarded instead of corrupting the new site's state.

use crate::default_menu::{self, DEFAULT_MENU_NAME};
use crate::error::StoreError;
use crate::events::{EventHub, StoreEvent};
use crate::sequencer;
use navmenu_api::{ApiError, MenuApi, SiteId};
use navmenu_model::{
    apply_load_transform, apply_save_transform, primary_location, restore_server_ids,
    traverse, IdAllocator, ItemId, Location, Menu, MenuId, MenuItem, Position,
    TreeError, PRIMARY_LOCATION,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Artificial round-trip delay for the local-only default-menu save
pub const DEFAULT_SAVE_ROUNDTRIP: Duration = Duration::from_millis(300);

static MENU_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Menu (\d+)$").expect("static pattern"));

/// What a bare-parameter save should persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    /// A menu with a remote identity
    Menu(MenuId),
    /// The menu not yet known to the remote side (restored after delete)
    Unsaved,
}

/// How a mutation affects the dirty flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeOptions {
    reset: bool,
    association_only: bool,
    target: Option<SaveTarget>,
}

impl ChangeOptions {
    /// Clear both flags and the pending save target
    #[inline]
    #[must_use]
    pub fn reset() -> Self {
        Self {
            reset: true,
            association_only: false,
            target: None,
        }
    }

    /// A structural or content edit against the given menu
    #[inline]
    #[must_use]
    pub fn contents(target: SaveTarget) -> Self {
        Self {
            reset: false,
            association_only: false,
            target: Some(target),
        }
    }

    /// Only a location↔menu assignment changed; `target` is the menu a
    /// subsequent bare-parameter save should persist
    #[inline]
    #[must_use]
    pub fn association(target: Option<SaveTarget>) -> Self {
        Self {
            reset: false,
            association_only: true,
            target,
        }
    }
}

/// Clone-out view of the store for UI collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// The opened site, if any
    pub site: Option<SiteId>,
    /// Theme locations of the site
    pub locations: Vec<Location>,
    /// All menus, default menu (if any) first
    pub menus: Vec<Menu>,
    /// Whether a synthesized default menu is present
    pub has_default_menu: bool,
    /// Structural/content edits pending
    pub contents_changed: bool,
    /// Only a location assignment pending
    pub association_changed: bool,
}

impl StoreSnapshot {
    /// Whether anything is pending at all
    #[inline]
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.contents_changed || self.association_changed
    }

    /// The default menu, when present (always `menus[0]`)
    #[must_use]
    pub fn default_menu(&self) -> Option<&Menu> {
        self.menus.first().filter(|m| m.is_default())
    }
}

#[derive(Debug, Default)]
struct StoreState {
    site: Option<SiteId>,
    site_url: String,
    /// Generation counter; bumped on every site change so in-flight
    /// responses for an abandoned site can be recognized and dropped
    epoch: u64,
    locations: Vec<Location>,
    menus: Vec<Menu>,
    allocator: IdAllocator,
    contents_changed: bool,
    association_changed: bool,
    last_changed: Option<SaveTarget>,
    /// Most recently delete-removed menu, kept for rollback and restore
    deleted_menu: Option<(usize, Menu)>,
}

fn mark_change(st: &mut StoreState, opts: ChangeOptions) {
    if opts.reset {
        st.contents_changed = false;
        st.association_changed = false;
        st.last_changed = None;
        return;
    }
    if opts.association_only {
        st.association_changed = true;
    } else {
        st.contents_changed = true;
    }
    st.last_changed = opts.target;
}

/// Highest existing "Menu N" plus one
fn next_menu_name(menus: &[Menu]) -> String {
    let max = menus
        .iter()
        .filter_map(|m| MENU_NAME_RE.captures(&m.name))
        .filter_map(|c| c[1].parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("Menu {}", max + 1)
}

/// In-memory menu state of one site
///
/// The tree is privately owned and exclusively mutated here; external
/// code edits it only through these methods, which is what keeps the
/// dirty-flag bookkeeping truthful.
pub struct MenuStore {
    api: Arc<dyn MenuApi>,
    state: Mutex<StoreState>,
    events: EventHub,
}

impl std::fmt::Debug for MenuStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuStore").finish_non_exhaustive()
    }
}

impl MenuStore {
    /// Create a store over the given collaborator
    #[must_use]
    pub fn new(api: Arc<dyn MenuApi>) -> Self {
        Self {
            api,
            state: Mutex::new(StoreState::default()),
            events: EventHub::new(),
        }
    }

    /// The reserved id of the synthesized default menu
    #[inline]
    #[must_use]
    pub fn default_menu_id() -> MenuId {
        MenuId::DEFAULT
    }

    /// Subscribe to change/saving/saved/error notifications
    pub fn subscribe(&self) -> tokio::sync::mpsc::UnboundedReceiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Read accessor: a cloned view of the current state
    pub async fn snapshot(&self) -> StoreSnapshot {
        let st = self.state.lock().await;
        StoreSnapshot {
            site: st.site,
            locations: st.locations.clone(),
            menus: st.menus.clone(),
            has_default_menu: st.menus.first().is_some_and(Menu::is_default),
            contents_changed: st.contents_changed,
            association_changed: st.association_changed,
        }
    }

    /// Switch to a site: discard local state and re-fetch
    ///
    /// The previous state is cleared before the fetch so nothing from the
    /// old site can leak into view during the request window. A response
    /// arriving after yet another site change is dropped.
    pub async fn open_site(&self, site: SiteId, site_url: &str) -> Result<(), StoreError> {
        let epoch = {
            let mut st = self.state.lock().await;
            st.site = Some(site);
            st.site_url = site_url.strip_suffix('/').unwrap_or(site_url).to_string();
            st.epoch += 1;
            st.locations.clear();
            st.menus.clear();
            st.deleted_menu = None;
            mark_change(&mut st, ChangeOptions::reset());
            st.epoch
        };
        self.events.emit(StoreEvent::Change);

        tracing::info!(%site, "fetching menus");
        match self.api.fetch_menus(site).await {
            Ok(payload) => {
                let mut guard = self.state.lock().await;
                if guard.epoch != epoch {
                    tracing::debug!(%site, "discarding stale menus response");
                    return Ok(());
                }
                let st = &mut *guard;
                let mut menus = payload.menus;
                for menu in &mut menus {
                    st.allocator.assign_client_ids(menu);
                    apply_load_transform(menu, &st.site_url);
                }
                st.locations = payload.locations;
                st.menus = menus;
                mark_change(st, ChangeOptions::reset());
                drop(guard);
                self.events.emit(StoreEvent::Change);
                Ok(())
            }
            Err(err) => {
                let guard = self.state.lock().await;
                if guard.epoch != epoch {
                    return Ok(());
                }
                drop(guard);
                tracing::warn!(%site, error = %err, "menus fetch failed");
                self.events.emit(StoreEvent::Error(format!("fetch failed: {err}")));
                Err(StoreError::Fetch(err))
            }
        }
    }

    /// Build (or rebuild) the default menu from the site's top-level pages
    ///
    /// First synthesis inserts it at `menus[0]`; re-synthesis replaces the
    /// existing default menu's items in place. Synthesis is not an edit,
    /// so the dirty flags stay clear.
    pub async fn synthesize_default_menu(&self) -> Result<(), StoreError> {
        let (site, epoch) = {
            let st = self.state.lock().await;
            (st.site.ok_or(StoreError::NoSite)?, st.epoch)
        };

        let pages = match self.api.fetch_top_level_pages(site).await {
            Ok(pages) => pages,
            Err(err) => {
                let guard = self.state.lock().await;
                if guard.epoch != epoch {
                    return Ok(());
                }
                drop(guard);
                self.events
                    .emit(StoreEvent::Error(format!("pages fetch failed: {err}")));
                return Err(StoreError::Fetch(err));
            }
        };

        let mut guard = self.state.lock().await;
        if guard.epoch != epoch {
            tracing::debug!(%site, "discarding stale pages response");
            return Ok(());
        }
        let st = &mut *guard;
        let primary = primary_location(&st.locations)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| PRIMARY_LOCATION.to_string());
        let menu = default_menu::synthesize(&pages, &primary, &st.site_url, &mut st.allocator);
        if st.menus.first().is_some_and(Menu::is_default) {
            st.menus[0].items = menu.items;
        } else {
            st.menus.insert(0, menu);
        }
        drop(guard);
        self.events.emit(StoreEvent::Change);
        Ok(())
    }

    /// Add an item to a menu, relative to `target` when given
    ///
    /// The item gets a fresh client id. An unknown menu id is a logged
    /// no-op; an unknown target degrades to appending at the top level,
    /// which also covers the empty-menu case.
    pub async fn add_item(
        &self,
        item: MenuItem,
        target: Option<ItemId>,
        position: Position,
        menu_id: MenuId,
    ) -> Option<ItemId> {
        let mut guard = self.state.lock().await;
        let st = &mut *guard;
        let Some(menu) = st.menus.iter_mut().find(|m| m.id == Some(menu_id)) else {
            tracing::warn!(%menu_id, "add_item: unknown menu, ignoring");
            return None;
        };
        let id = st.allocator.next_id();
        let item = item.with_id(id);

        let leftover = match target {
            Some(t) => match traverse::insert(&mut menu.items, item, t, position) {
                Ok(()) => None,
                Err(item) => Some(item),
            },
            None => Some(item),
        };
        if let Some(item) = leftover {
            menu.items.push(item);
        }
        let save_target = menu.id.map(SaveTarget::Menu).unwrap_or(SaveTarget::Unsaved);
        mark_change(st, ChangeOptions::contents(save_target));
        drop(guard);
        self.events.emit(StoreEvent::Change);
        Some(id)
    }

    /// Move an item relative to another, atomically and cycle-safely
    ///
    /// Both ids must live in the same menu; menus are disjoint, so the
    /// first menu containing the source is the only candidate.
    pub async fn move_item(
        &self,
        source: ItemId,
        target: ItemId,
        position: Position,
    ) -> Result<(), StoreError> {
        let mut guard = self.state.lock().await;
        let st = &mut *guard;
        let menu = match st.menus.iter_mut().find(|m| m.contains(source)) {
            Some(m) if m.contains(target) => m,
            Some(_) => return Err(TreeError::TargetNotFound(target).into()),
            None => return Err(TreeError::SourceNotFound(source).into()),
        };
        traverse::move_item(&mut menu.items, source, target, position)?;
        let save_target = menu.id.map(SaveTarget::Menu).unwrap_or(SaveTarget::Unsaved);
        mark_change(st, ChangeOptions::contents(save_target));
        drop(guard);
        self.events.emit(StoreEvent::Change);
        Ok(())
    }

    /// Delete an item; its children are promoted to its former parent
    /// first, so no subtree is silently discarded
    pub async fn delete_item(&self, item: ItemId) -> Result<(), StoreError> {
        let mut guard = self.state.lock().await;
        let st = &mut *guard;
        let menu = st
            .menus
            .iter_mut()
            .find(|m| m.contains(item))
            .ok_or(TreeError::SourceNotFound(item))?;
        traverse::delete_item(&mut menu.items, item)?;
        let save_target = menu.id.map(SaveTarget::Menu).unwrap_or(SaveTarget::Unsaved);
        mark_change(st, ChangeOptions::contents(save_target));
        drop(guard);
        self.events.emit(StoreEvent::Change);
        Ok(())
    }

    /// Re-parent items under a new parent in the same menu, as one
    /// logical change
    pub async fn move_items_to_parent(
        &self,
        items: &[ItemId],
        new_parent: ItemId,
    ) -> Result<usize, StoreError> {
        let mut guard = self.state.lock().await;
        let st = &mut *guard;
        let menu = st
            .menus
            .iter_mut()
            .find(|m| m.contains(new_parent))
            .ok_or(TreeError::ParentNotFound(new_parent))?;
        let moved = traverse::reparent(&mut menu.items, items, new_parent)?;
        let save_target = menu.id.map(SaveTarget::Menu).unwrap_or(SaveTarget::Unsaved);
        mark_change(st, ChangeOptions::contents(save_target));
        drop(guard);
        self.events.emit(StoreEvent::Change);
        Ok(moved)
    }

    /// Rename a menu in place
    ///
    /// Renaming counts as a content edit; renaming the default menu away
    /// from its synthesized name also means materialization keeps the
    /// user's name instead of auto-numbering.
    pub async fn rename_menu(&self, menu_id: MenuId, name: &str) -> Result<(), StoreError> {
        let mut guard = self.state.lock().await;
        let st = &mut *guard;
        let menu = st
            .menus
            .iter_mut()
            .find(|m| m.id == Some(menu_id))
            .ok_or(StoreError::UnknownMenu(menu_id))?;
        menu.name = name.to_string();
        mark_change(st, ChangeOptions::contents(SaveTarget::Menu(menu_id)));
        drop(guard);
        self.events.emit(StoreEvent::Change);
        Ok(())
    }

    /// Assign a menu to a location (or select "no menu" with an unknown /
    /// default id)
    ///
    /// The location is first stripped from its current occupant, keeping
    /// the at-most-one-menu-per-location invariant. The recorded save
    /// target is the previous occupant when the new selection is the
    /// default menu, so a later bare save persists the disassociation of
    /// the correct real menu.
    pub async fn set_menu_at_location(&self, menu_id: MenuId, location: &str) {
        let mut guard = self.state.lock().await;
        let st = &mut *guard;

        let prev_id = st
            .menus
            .iter()
            .find(|m| m.locations.iter().any(|l| l == location))
            .and_then(|m| m.id);
        for menu in &mut st.menus {
            menu.locations.retain(|l| l != location);
        }
        if let Some(menu) = st.menus.iter_mut().find(|m| m.id == Some(menu_id)) {
            menu.locations.push(location.to_string());
        }

        let save_target = if menu_id.is_default() {
            prev_id.filter(|id| !id.is_default()).map(SaveTarget::Menu)
        } else {
            Some(SaveTarget::Menu(menu_id))
        };
        mark_change(st, ChangeOptions::association(save_target));
        drop(guard);
        self.events.emit(StoreEvent::Change);
    }

    /// Create a new, empty menu through the persistence collaborator
    pub async fn add_menu(&self, name: &str) -> Result<MenuId, StoreError> {
        let (site, epoch) = {
            let st = self.state.lock().await;
            (st.site.ok_or(StoreError::NoSite)?, st.epoch)
        };

        match self.api.create_menu(site, name).await {
            Ok(mut menu) => {
                let id = menu.id.ok_or_else(|| {
                    StoreError::CreateMenu(ApiError::Rejected(
                        "created menu carries no id".to_string(),
                    ))
                })?;
                let mut guard = self.state.lock().await;
                if guard.epoch != epoch {
                    return Ok(id);
                }
                let st = &mut *guard;
                st.allocator.assign_client_ids(&mut menu);
                apply_load_transform(&mut menu, &st.site_url);
                st.menus.push(menu);
                drop(guard);
                self.events.emit(StoreEvent::Change);
                Ok(id)
            }
            Err(err) => {
                self.events
                    .emit(StoreEvent::Error(format!("menu creation failed: {err}")));
                Err(StoreError::CreateMenu(err))
            }
        }
    }

    /// Delete a menu, optimistically
    ///
    /// The menu leaves local state before the request completes; a
    /// rejection (or a `deleted == false` response) rolls it back to its
    /// old position. The removed menu stays available for
    /// [`MenuStore::restore_menu`] until the next delete.
    pub async fn delete_menu(&self, menu_id: MenuId) -> Result<(), StoreError> {
        let (site, epoch) = {
            let mut st = self.state.lock().await;
            let site = st.site.ok_or(StoreError::NoSite)?;
            let Some(idx) = st.menus.iter().position(|m| m.id == Some(menu_id)) else {
                drop(st);
                self.events
                    .emit(StoreEvent::Error(format!("unknown menu: {menu_id}")));
                return Err(StoreError::UnknownMenu(menu_id));
            };
            let menu = st.menus.remove(idx);
            st.deleted_menu = Some((idx, menu));
            (site, st.epoch)
        };
        self.events.emit(StoreEvent::Change);

        // the default menu exists only locally
        if menu_id.is_default() {
            return Ok(());
        }

        let failure = match self.api.delete_menu(site, menu_id).await {
            Ok(true) => return Ok(()),
            Ok(false) => StoreError::Delete(ApiError::Rejected(
                "remote side reports the menu was not deleted".to_string(),
            )),
            Err(err) => StoreError::Delete(err),
        };

        let mut st = self.state.lock().await;
        if st.epoch == epoch {
            if let Some((idx, menu)) = st.deleted_menu.take() {
                let idx = idx.min(st.menus.len());
                st.menus.insert(idx, menu);
            }
        }
        drop(st);
        self.events.emit(StoreEvent::Change);
        self.events
            .emit(StoreEvent::Error(format!("delete failed: {menu_id}")));
        Err(failure)
    }

    /// Re-add the most recently deleted menu, stripped of all remote
    /// identifiers so the next save treats it as brand-new
    pub async fn restore_menu(&self, location: &str) -> Result<(), StoreError> {
        let mut guard = self.state.lock().await;
        let Some((_, mut menu)) = guard.deleted_menu.take() else {
            return Err(StoreError::NothingToRestore);
        };
        let st = &mut *guard;
        menu.id = None;
        traverse::for_each_mut(&mut menu.items, &mut |item| {
            item.server_id = None;
        });
        for existing in &mut st.menus {
            existing.locations.retain(|l| l != location);
        }
        menu.locations = vec![location.to_string()];
        st.menus.push(menu);
        mark_change(st, ChangeOptions::contents(SaveTarget::Unsaved));
        drop(guard);
        self.events.emit(StoreEvent::Change);
        Ok(())
    }

    /// Persist a menu
    ///
    /// With no explicit target the menu of the last pending change is
    /// saved. The default menu takes its own path; everything else goes
    /// through server-id restoration, placeholder resolution, and the
    /// persistence collaborator.
    pub async fn save_menu(&self, target: Option<MenuId>) -> Result<(), StoreError> {
        let save_target = {
            let st = self.state.lock().await;
            st.site.ok_or(StoreError::NoSite)?;
            match target {
                Some(id) => SaveTarget::Menu(id),
                None => st.last_changed.ok_or(StoreError::NothingToSave)?,
            }
        };
        if save_target == SaveTarget::Menu(MenuId::DEFAULT) {
            return self.save_default_menu().await;
        }
        self.save_real_menu(save_target).await
    }

    /// Drop all pending changes by re-fetching the current site
    pub async fn discard_changes(&self) -> Result<(), StoreError> {
        let (site, url) = {
            let st = self.state.lock().await;
            (st.site.ok_or(StoreError::NoSite)?, st.site_url.clone())
        };
        self.open_site(site, &url).await
    }

    /// Save path for everything except the default menu
    async fn save_real_menu(&self, target: SaveTarget) -> Result<(), StoreError> {
        let (site, epoch, site_url, mut wire) = {
            let st = self.state.lock().await;
            let site = st.site.ok_or(StoreError::NoSite)?;
            let menu = match target {
                SaveTarget::Menu(id) => st
                    .menus
                    .iter()
                    .find(|m| m.id == Some(id))
                    .cloned()
                    .ok_or(StoreError::UnknownMenu(id))?,
                SaveTarget::Unsaved => st
                    .menus
                    .iter()
                    .find(|m| m.id.is_none())
                    .cloned()
                    .ok_or(StoreError::NothingToSave)?,
            };
            (site, st.epoch, st.site_url.clone(), menu)
        };

        // a menu with no remote identity is created first
        if wire.id.is_none() {
            let created = match self.api.create_menu(site, &wire.name).await {
                Ok(menu) => menu,
                Err(err) => {
                    self.events
                        .emit(StoreEvent::Error(format!("menu creation failed: {err}")));
                    return Err(StoreError::CreateMenu(err));
                }
            };
            wire.id = created.id;
        }
        let menu_id = wire.id.ok_or_else(|| {
            StoreError::CreateMenu(ApiError::Rejected(
                "created menu carries no id".to_string(),
            ))
        })?;

        apply_save_transform(&mut wire, &site_url);
        restore_server_ids(&mut wire);
        if let Err(err) = sequencer::resolve_new_pages(self.api.as_ref(), site, &mut wire).await {
            self.events.emit(StoreEvent::Error(err.to_string()));
            return Err(err);
        }

        self.events.emit(StoreEvent::Saving(Some(menu_id)));
        tracing::info!(%site, menu = %menu_id, "saving menu");
        match self.api.save_menu(site, wire).await {
            Ok(mut saved) => {
                let mut guard = self.state.lock().await;
                if guard.epoch != epoch {
                    tracing::debug!(menu = %menu_id, "discarding stale save response");
                    return Ok(());
                }
                let st = &mut *guard;
                st.allocator.assign_client_ids(&mut saved);
                apply_load_transform(&mut saved, &st.site_url);
                let slot = match target {
                    SaveTarget::Menu(id) => st.menus.iter().position(|m| m.id == Some(id)),
                    SaveTarget::Unsaved => st.menus.iter().position(|m| m.id.is_none()),
                };
                if let Some(pos) = slot {
                    // location assignment is store-side state
                    saved.locations = st.menus[pos].locations.clone();
                    st.menus[pos] = saved;
                } else {
                    st.menus.push(saved);
                }
                mark_change(st, ChangeOptions::reset());
                drop(guard);
                self.events.emit(StoreEvent::Saved(Some(menu_id)));
                self.events.emit(StoreEvent::Change);
                Ok(())
            }
            Err(err) => {
                // dirty flags stay set: the user's edits are not lost
                self.events
                    .emit(StoreEvent::Error(format!("save failed: {err}")));
                Err(StoreError::Save(err))
            }
        }
    }

    /// Save path for the synthesized default menu
    ///
    /// Without content edits nothing is persisted: the pending
    /// association change is committed locally behind an artificial
    /// round-trip delay. With edits the menu is materialized into a
    /// brand-new real menu, renamed unless the user already did, assigned
    /// to the primary location, and saved for real.
    async fn save_default_menu(&self) -> Result<(), StoreError> {
        let (site, epoch, edited, menu) = {
            let st = self.state.lock().await;
            let site = st.site.ok_or(StoreError::NoSite)?;
            let menu = st
                .menus
                .first()
                .filter(|m| m.is_default())
                .cloned()
                .ok_or(StoreError::UnknownMenu(MenuId::DEFAULT))?;
            (site, st.epoch, st.contents_changed, menu)
        };

        if !edited {
            self.events.emit(StoreEvent::Saving(Some(MenuId::DEFAULT)));
            tokio::time::sleep(DEFAULT_SAVE_ROUNDTRIP).await;
            let mut st = self.state.lock().await;
            if st.epoch != epoch {
                return Ok(());
            }
            mark_change(&mut st, ChangeOptions::reset());
            drop(st);
            self.events.emit(StoreEvent::Saved(Some(MenuId::DEFAULT)));
            self.events.emit(StoreEvent::Change);
            return Ok(());
        }

        tracing::info!(%site, "materializing edited default menu");
        let created = match self.api.create_menu(site, &menu.name).await {
            Ok(created) => created,
            Err(err) => {
                self.events
                    .emit(StoreEvent::Error(format!("menu creation failed: {err}")));
                return Err(StoreError::CreateMenu(err));
            }
        };
        let new_id = created.id.ok_or_else(|| {
            StoreError::CreateMenu(ApiError::Rejected(
                "created menu carries no id".to_string(),
            ))
        })?;

        {
            let mut guard = self.state.lock().await;
            if guard.epoch != epoch {
                return Ok(());
            }
            let st = &mut *guard;
            if st.menus.first().is_some_and(Menu::is_default) {
                st.menus.remove(0);
            }
            let mut real = menu;
            real.id = Some(new_id);
            if real.name == DEFAULT_MENU_NAME {
                real.name = next_menu_name(&st.menus);
            }
            let primary = primary_location(&st.locations)
                .map(|l| l.name.clone())
                .unwrap_or_else(|| PRIMARY_LOCATION.to_string());
            for other in &mut st.menus {
                other.locations.retain(|l| l != &primary);
            }
            real.locations = vec![primary];
            st.menus.push(real);
            // the real menu now carries every pending edit
            mark_change(st, ChangeOptions::contents(SaveTarget::Menu(new_id)));
        }
        self.events.emit(StoreEvent::Change);
        self.save_real_menu(SaveTarget::Menu(new_id)).await
    }
}
