//! Save-path tests: sequencing, failure handling, the default menu

use navmenu_api::SiteId;
use navmenu_model::{ContentRef, MenuId, MenuItem, Position};
use navmenu_store::{MenuStore, StoreError, StoreEvent};
use navmenu_test_utils::{three_menu_payload, ApiBehavior, RecordingApi, SITE_URL};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const SITE: SiteId = SiteId(77);

async fn opened_store() -> (Arc<RecordingApi>, MenuStore) {
    let api = Arc::new(RecordingApi::with_fixture(SITE));
    let store = MenuStore::new(api.clone());
    store.open_site(SITE, SITE_URL).await.unwrap();
    (api, store)
}

async fn opened_with(behavior: ApiBehavior) -> (Arc<RecordingApi>, MenuStore) {
    let api = Arc::new(RecordingApi::new(behavior));
    api.set_payload(SITE, three_menu_payload());
    let store = MenuStore::new(api.clone());
    store.open_site(SITE, SITE_URL).await.unwrap();
    (api, store)
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<StoreEvent>) -> Vec<StoreEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn placeholders_become_pages_before_the_menu_is_saved() {
    let (api, store) = opened_store().await;

    store
        .add_item(
            MenuItem::new_page_placeholder("Press"),
            None,
            Position::Child,
            MenuId(101),
        )
        .await
        .unwrap();
    store
        .add_item(
            MenuItem::new_page_placeholder("Careers"),
            None,
            Position::Child,
            MenuId(101),
        )
        .await
        .unwrap();

    store.save_menu(None).await.unwrap();

    // both pages exist before the save goes out, strictly one at a time
    assert_eq!(
        api.calls(),
        vec!["fetch_menus", "create_page", "create_page", "save_menu"]
    );
    assert_eq!(api.page_creation_watermark(), 1);

    let snap = store.snapshot().await;
    assert!(!snap.has_changed());
    let menu = snap.menus.iter().find(|m| m.id == Some(MenuId(101))).unwrap();
    let press = menu.iter().find(|i| i.name == "Press").unwrap();
    assert!(matches!(press.content, ContentRef::Post(_)));
    assert!(menu.iter().all(|i| !i.content.is_new_page()));
}

#[tokio::test(start_paused = true)]
async fn save_failure_keeps_pending_edits() {
    let (api, store) = opened_with(ApiBehavior {
        save_fails: true,
        ..ApiBehavior::default()
    })
    .await;

    store
        .add_item(
            MenuItem::custom("Blog", "/blog"),
            None,
            Position::Child,
            MenuId(101),
        )
        .await
        .unwrap();

    let err = store.save_menu(None).await.unwrap_err();
    assert!(matches!(err, StoreError::Save(_)));
    assert_eq!(api.call_count("save_menu"), 1);

    // nothing was committed, so a retry is still possible
    let snap = store.snapshot().await;
    assert!(snap.contents_changed);
    assert!(snap
        .menus
        .iter()
        .find(|m| m.id == Some(MenuId(101)))
        .unwrap()
        .iter()
        .any(|i| i.name == "Blog"));
}

#[tokio::test(start_paused = true)]
async fn page_creation_failure_aborts_before_the_save() {
    let (api, store) = opened_with(ApiBehavior {
        create_page_fail_after: Some(1),
        ..ApiBehavior::default()
    })
    .await;

    store
        .add_item(
            MenuItem::new_page_placeholder("First"),
            None,
            Position::Child,
            MenuId(101),
        )
        .await
        .unwrap();
    store
        .add_item(
            MenuItem::new_page_placeholder("Second"),
            None,
            Position::Child,
            MenuId(101),
        )
        .await
        .unwrap();

    let err = store.save_menu(None).await.unwrap_err();
    assert!(matches!(err, StoreError::PageCreation { ref title, .. } if title == "Second"));
    assert_eq!(api.call_count("save_menu"), 0);
    assert!(store.snapshot().await.contents_changed);
}

#[tokio::test(start_paused = true)]
async fn explicit_target_beats_the_last_changed_menu() {
    let (api, store) = opened_store().await;

    store
        .add_item(
            MenuItem::custom("Blog", "/blog"),
            None,
            Position::Child,
            MenuId(101),
        )
        .await
        .unwrap();

    // saving a different menu than the one last touched
    store.save_menu(Some(MenuId(102))).await.unwrap();
    assert_eq!(api.call_count("save_menu"), 1);

    // the flags are save-scoped, not per-menu
    assert!(!store.snapshot().await.has_changed());
}

#[tokio::test]
async fn bare_save_with_nothing_pending_is_rejected() {
    let (api, store) = opened_store().await;
    let err = store.save_menu(None).await.unwrap_err();
    assert!(matches!(err, StoreError::NothingToSave));
    assert!(err.is_validation());
    assert_eq!(api.call_count("save_menu"), 0);
}

#[tokio::test(start_paused = true)]
async fn restored_menu_saves_as_brand_new() {
    let (api, store) = opened_store().await;

    store.delete_menu(MenuId(102)).await.unwrap();
    store.restore_menu("footer").await.unwrap();
    store.save_menu(None).await.unwrap();

    // created first, then saved
    assert_eq!(api.call_count("create_menu"), 1);
    assert_eq!(api.call_count("save_menu"), 1);

    let snap = store.snapshot().await;
    assert!(!snap.has_changed());
    let restored = snap.menus.iter().find(|m| m.name == "Footer").unwrap();
    assert!(restored.id.is_some());
    assert_eq!(restored.locations, vec!["footer".to_string()]);
    assert_eq!(restored.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unedited_default_menu_saves_locally() {
    let (api, store) = opened_store().await;
    store.synthesize_default_menu().await.unwrap();
    store.set_menu_at_location(MenuId(0), "primary").await;
    let mut events = store.subscribe();
    let calls_before = api.calls().len();

    store.save_menu(Some(MenuId(0))).await.unwrap();

    // nothing goes over the wire for the synthesized menu
    assert_eq!(api.calls().len(), calls_before);
    let snap = store.snapshot().await;
    assert!(!snap.has_changed());
    assert!(snap.has_default_menu);

    let events = drain(&mut events);
    assert!(events.contains(&StoreEvent::Saving(Some(MenuId(0)))));
    assert!(events.contains(&StoreEvent::Saved(Some(MenuId(0)))));
}

#[tokio::test(start_paused = true)]
async fn edited_default_menu_materializes_into_a_real_menu() {
    let (api, store) = opened_store().await;
    store.synthesize_default_menu().await.unwrap();

    store
        .add_item(
            MenuItem::custom("Blog", "/blog"),
            None,
            Position::Child,
            MenuId(0),
        )
        .await
        .unwrap();

    store.save_menu(None).await.unwrap();

    assert_eq!(api.call_count("create_menu"), 1);
    assert_eq!(api.call_count("save_menu"), 1);

    let snap = store.snapshot().await;
    assert!(!snap.has_changed());
    assert!(!snap.has_default_menu);

    // fixture already has "Menu 3", so the materialized menu is "Menu 4"
    let real = snap.menus.iter().find(|m| m.name == "Menu 4").unwrap();
    assert!(real.id.is_some_and(|id| !id.is_default()));
    assert_eq!(real.locations, vec!["primary".to_string()]);
    assert!(real.iter().any(|i| i.name == "Blog"));
    assert!(real.iter().any(|i| i.name == "Home"));

    // the primary location was taken away from its previous occupant
    let old_primary = snap.menus.iter().find(|m| m.id == Some(MenuId(101))).unwrap();
    assert!(!old_primary.locations.iter().any(|l| l == "primary"));
}

#[tokio::test(start_paused = true)]
async fn renamed_default_menu_keeps_the_user_name() {
    let (api, store) = opened_store().await;
    store.synthesize_default_menu().await.unwrap();

    store.rename_menu(MenuId(0), "Main navigation").await.unwrap();
    store.save_menu(Some(MenuId(0))).await.unwrap();

    assert_eq!(api.call_count("create_menu"), 1);
    let snap = store.snapshot().await;
    assert!(snap.menus.iter().any(|m| m.name == "Main navigation"));
    assert!(snap.menus.iter().all(|m| m.name != "Menu 4"));
}

#[tokio::test(start_paused = true)]
async fn save_replaces_client_ids_with_a_fresh_allocation() {
    let (_api, store) = opened_store().await;

    store
        .add_item(
            MenuItem::custom("Blog", "/blog"),
            None,
            Position::Child,
            MenuId(101),
        )
        .await
        .unwrap();
    store.save_menu(None).await.unwrap();

    let snap = store.snapshot().await;
    let menu = snap.menus.iter().find(|m| m.id == Some(MenuId(101))).unwrap();
    // every item, including the new one, is addressable again
    assert!(menu.iter().all(|i| i.id.is_some() && i.server_id.is_some()));

    // ids remain unique across all menus after the round trip
    let mut ids: Vec<_> = snap
        .menus
        .iter()
        .flat_map(|m| m.iter())
        .map(|i| i.id.unwrap())
        .collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
}
