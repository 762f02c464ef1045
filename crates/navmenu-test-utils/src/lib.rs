//! Testing utilities for the menu engine workspace
//!
//! Shared fixtures plus [`RecordingApi`], an in-memory collaborator that
//! logs every call, tracks page-creation overlap, and can be told to
//! fail or stall specific operations.

#![allow(missing_docs)]

use async_trait::async_trait;
use navmenu_api::{
    ApiError, CreatedPage, MenuApi, MenusPayload, PageDraft, PageSummary, SiteId,
};
use navmenu_model::traverse::for_each_mut;
use navmenu_model::{ItemId, Location, Menu, MenuId, MenuItem};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Semaphore;

pub const SITE_URL: &str = "https://example.com";

fn item(name: &str, server_id: u64, children: Vec<MenuItem>) -> MenuItem {
    MenuItem::custom(name, format!("/{}", name.to_lowercase().replace(' ', "-")))
        .with_id(ItemId(server_id))
        .with_children(children)
}

/// The three-menu site used across integration tests
///
/// The primary menu nests "Products → Socks → 80s socks → Space invader
/// designs", with "About us" sitting at index 2 of the top level.
#[must_use]
pub fn three_menu_payload() -> MenusPayload {
    let primary = Menu::new("Primary")
        .with_id(MenuId(101))
        .with_locations(vec!["primary".to_string()])
        .with_items(vec![
            item("Home", 1001, vec![]),
            item(
                "Products",
                1002,
                vec![item(
                    "Socks",
                    1003,
                    vec![item(
                        "80s socks",
                        1004,
                        vec![item("Space invader designs", 1005, vec![])],
                    )],
                )],
            ),
            item("About us", 1006, vec![item("Our team", 1007, vec![])]),
        ]);

    let footer = Menu::new("Footer")
        .with_id(MenuId(102))
        .with_locations(vec!["footer".to_string()])
        .with_items(vec![item("Privacy", 1101, vec![]), item("Terms", 1102, vec![])]);

    let social = Menu::new("Menu 3")
        .with_id(MenuId(103))
        .with_items(vec![item("Mastodon", 1201, vec![])]);

    MenusPayload {
        locations: vec![
            Location::new("primary", "Primary navigation"),
            Location::new("footer", "Footer links"),
            Location::new("social", "Social strip"),
        ],
        menus: vec![primary, footer, social],
    }
}

/// Top-level pages matching the fixture site
#[must_use]
pub fn top_level_pages() -> Vec<PageSummary> {
    vec![
        PageSummary {
            id: 11,
            title: "About".to_string(),
            url: format!("{SITE_URL}/about"),
            is_front_page: false,
        },
        PageSummary {
            id: 12,
            title: "Welcome".to_string(),
            url: format!("{SITE_URL}/"),
            is_front_page: true,
        },
        PageSummary {
            id: 13,
            title: "Contact".to_string(),
            url: format!("{SITE_URL}/contact"),
            is_front_page: false,
        },
    ]
}

/// Behavior switches for [`RecordingApi`]
#[derive(Debug, Default)]
pub struct ApiBehavior {
    /// `delete_menu` returns `Ok(false)` instead of `Ok(true)`
    pub delete_declined: bool,
    /// `delete_menu` fails with a transport error
    pub delete_fails: bool,
    /// `save_menu` fails with a transport error
    pub save_fails: bool,
    /// `create_page` fails after this many successful calls
    pub create_page_fail_after: Option<u64>,
    /// `fetch_menus` waits for a permit before answering
    pub gate_fetch: bool,
}

/// In-memory, recording implementation of [`MenuApi`]
///
/// Per-site payloads are fixed at construction; every call appends to the
/// log; `create_page` tracks its concurrency watermark so tests can prove
/// the single-flight contract.
pub struct RecordingApi {
    payloads: Mutex<Vec<(SiteId, MenusPayload)>>,
    pages: Mutex<Vec<PageSummary>>,
    behavior: ApiBehavior,
    log: Mutex<Vec<String>>,
    next_server_id: AtomicU64,
    next_menu_id: AtomicU64,
    next_page_id: AtomicU64,
    pages_in_flight: AtomicUsize,
    pages_in_flight_max: AtomicUsize,
    /// Gate for `fetch_menus` when `gate_fetch` is set
    pub fetch_gate: Semaphore,
}

impl RecordingApi {
    #[must_use]
    pub fn new(behavior: ApiBehavior) -> Self {
        Self {
            payloads: Mutex::new(Vec::new()),
            pages: Mutex::new(top_level_pages()),
            behavior,
            log: Mutex::new(Vec::new()),
            next_server_id: AtomicU64::new(5000),
            next_menu_id: AtomicU64::new(500),
            next_page_id: AtomicU64::new(9000),
            pages_in_flight: AtomicUsize::new(0),
            pages_in_flight_max: AtomicUsize::new(0),
            fetch_gate: Semaphore::new(0),
        }
    }

    /// A fake serving the three-menu fixture for the given site
    #[must_use]
    pub fn with_fixture(site: SiteId) -> Self {
        let api = Self::new(ApiBehavior::default());
        api.set_payload(site, three_menu_payload());
        api
    }

    pub fn set_payload(&self, site: SiteId, payload: MenusPayload) {
        let mut payloads = self.payloads.lock().unwrap();
        payloads.retain(|(s, _)| *s != site);
        payloads.push((site, payload));
    }

    pub fn set_pages(&self, pages: Vec<PageSummary>) {
        *self.pages.lock().unwrap() = pages;
    }

    /// Every call so far, in order, e.g. `["fetch_menus", "save_menu"]`
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    #[must_use]
    pub fn call_count(&self, name: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    /// Highest number of `create_page` calls ever in flight at once
    #[must_use]
    pub fn page_creation_watermark(&self) -> usize {
        self.pages_in_flight_max.load(Ordering::SeqCst)
    }

    fn record(&self, name: &str) {
        self.log.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl MenuApi for RecordingApi {
    async fn fetch_menus(&self, site: SiteId) -> Result<MenusPayload, ApiError> {
        self.record("fetch_menus");
        if self.behavior.gate_fetch {
            let permit = self
                .fetch_gate
                .acquire()
                .await
                .map_err(|e| ApiError::Transport(anyhow::anyhow!(e)))?;
            permit.forget();
        }
        let payloads = self.payloads.lock().unwrap();
        payloads
            .iter()
            .find(|(s, _)| *s == site)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| ApiError::Rejected(format!("unknown site: {site}")))
    }

    async fn save_menu(&self, _site: SiteId, mut menu: Menu) -> Result<Menu, ApiError> {
        self.record("save_menu");
        if self.behavior.save_fails {
            return Err(ApiError::Transport(anyhow::anyhow!("connection reset")));
        }
        // the remote side issues ids for nodes it has not seen before
        for_each_mut(&mut menu.items, &mut |item| {
            if item.id.is_none() {
                item.id = Some(ItemId(self.next_server_id.fetch_add(1, Ordering::SeqCst)));
            }
        });
        menu.last_save_time = Some(1_700_000_000);
        Ok(menu)
    }

    async fn delete_menu(&self, _site: SiteId, _menu: MenuId) -> Result<bool, ApiError> {
        self.record("delete_menu");
        if self.behavior.delete_fails {
            return Err(ApiError::Transport(anyhow::anyhow!("connection reset")));
        }
        Ok(!self.behavior.delete_declined)
    }

    async fn create_menu(&self, _site: SiteId, name: &str) -> Result<Menu, ApiError> {
        self.record("create_menu");
        let id = MenuId(self.next_menu_id.fetch_add(1, Ordering::SeqCst));
        Ok(Menu::new(name).with_id(id))
    }

    async fn fetch_top_level_pages(&self, _site: SiteId) -> Result<Vec<PageSummary>, ApiError> {
        self.record("fetch_top_level_pages");
        Ok(self.pages.lock().unwrap().clone())
    }

    async fn create_page(&self, _site: SiteId, draft: PageDraft) -> Result<CreatedPage, ApiError> {
        self.record("create_page");
        let in_flight = self.pages_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.pages_in_flight_max.fetch_max(in_flight, Ordering::SeqCst);
        // give an overlapping caller a chance to be observed
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.pages_in_flight.fetch_sub(1, Ordering::SeqCst);

        let done = self.call_count("create_page") as u64;
        if let Some(limit) = self.behavior.create_page_fail_after {
            if done > limit {
                return Err(ApiError::Rejected("page quota exceeded".to_string()));
            }
        }
        let id = self.next_page_id.fetch_add(1, Ordering::SeqCst);
        Ok(CreatedPage {
            id,
            url: format!("{SITE_URL}/{}", draft.title.to_lowercase().replace(' ', "-")),
        })
    }
}
