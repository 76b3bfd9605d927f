//! An in-process stand-in for the browser: a handful of tabs, one page per
//! tab, script injection that spawns a real page agent. The demo drives it
//! through the same traits the real platform would sit behind.

use crate::agent;
use crate::bus::PageDirectory;
use crate::domain::browser::{BrowserHost, HostPage, InjectError};
use crate::domain::models::{PaletteMode, TabId, TabInfo, WindowId};
use crate::domain::site;
use crate::protocol::{FrameMessage, OverlaySurface, PaletteView, RuntimeHandle};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use tokio::sync::mpsc;
use tracing::info;

/// The mutable slice of a simulated page an agent can reach: the overlay it
/// mounts and the scroll lock.
#[derive(Default)]
struct PageSurface {
    overlay: Option<OverlaySurface>,
    overlay_visible: bool,
    scroll_locked: bool,
}

#[derive(Default)]
pub struct SimPage {
    surface: RwLock<PageSurface>,
}

impl SimPage {
    fn lock(&self) -> std::sync::RwLockWriteGuard<'_, PageSurface> {
        self.surface.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn clear(&self) {
        *self.lock() = PageSurface::default();
    }
}

impl HostPage for SimPage {
    fn mount_overlay(&self, overlay: OverlaySurface) {
        let mut surface = self.lock();
        surface.overlay = Some(overlay);
        surface.overlay_visible = false;
    }

    fn set_overlay_visible(&self, visible: bool) {
        self.lock().overlay_visible = visible;
    }

    fn unmount_overlay(&self) {
        self.lock().overlay = None;
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.lock().scroll_locked = locked;
    }
}

struct SimTab {
    info: TabInfo,
    page: Arc<SimPage>,
}

#[derive(Default)]
struct SimState {
    next_tab: u32,
    active: usize,
    tabs: Vec<SimTab>,
}

/// The simulated browser. Cloning shares the browser; the demo keeps one
/// clone and the background context another.
#[derive(Clone)]
pub struct SimBrowser {
    state: Arc<Mutex<SimState>>,
    pages: PageDirectory,
    runtime: Arc<OnceLock<RuntimeHandle>>,
}

impl SimBrowser {
    pub fn new(pages: PageDirectory) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::default())),
            pages,
            runtime: Arc::new(OnceLock::new()),
        }
    }

    /// Wires in the background handle. Injection needs it to spawn agents,
    /// and the background needs the browser, so the knot is tied after both
    /// exist.
    pub fn connect_runtime(&self, runtime: RuntimeHandle) {
        let _ = self.runtime.set(runtime);
    }

    pub fn seed_tab(&self, title: &str, url: &str) -> TabId {
        let mut state = self.lock();
        state.next_tab += 1;
        let id = TabId(state.next_tab);
        state.tabs.push(SimTab {
            info: TabInfo {
                id,
                window: WindowId(1),
                title: title.to_string(),
                url: url.to_string(),
                fav_icon_url: None,
            },
            page: Arc::new(SimPage::default()),
        });
        id
    }

    pub fn active_tab(&self) -> Option<TabInfo> {
        let state = self.lock();
        state.tabs.get(state.active).map(|tab| tab.info.clone())
    }

    pub fn cycle_active(&self, delta: isize) {
        let mut state = self.lock();
        let len = state.tabs.len();
        if len == 0 {
            return;
        }
        state.active = (state.active as isize + delta).rem_euclid(len as isize) as usize;
    }

    /// Simulates the active page reloading or navigating: its agent and
    /// anything it mounted are gone until the next injection.
    pub fn reload_active(&self) {
        let (id, page) = {
            let state = self.lock();
            match state.tabs.get(state.active) {
                Some(tab) => (tab.info.id, Arc::clone(&tab.page)),
                None => return,
            }
        };
        info!(tab = %id, "simulated page reload");
        self.pages.deregister(id);
        page.clear();
    }

    pub fn snapshot(&self) -> BrowserSnapshot {
        let state = self.lock();
        let tabs = state
            .tabs
            .iter()
            .map(|tab| TabSummary {
                id: tab.info.id,
                title: tab.info.title.clone(),
            })
            .collect();
        let page = state.tabs.get(state.active).map(|tab| {
            let surface = tab
                .page
                .surface
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            PageView {
                url: tab.info.url.clone(),
                title: tab.info.title.clone(),
                scroll_locked: surface.scroll_locked,
                overlay: surface.overlay.as_ref().map(|overlay| OverlayView {
                    visible: surface.overlay_visible,
                    mode: overlay.mode,
                    palette: overlay.view.borrow().clone(),
                    input: overlay.input.clone(),
                }),
            }
        });
        BrowserSnapshot {
            tabs,
            active: state.active,
            page,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BrowserHost for SimBrowser {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>> {
        Ok(self.lock().tabs.iter().map(|tab| tab.info.clone()).collect())
    }

    async fn activate_tab(&self, tab: TabId) -> Result<WindowId> {
        let mut state = self.lock();
        let index = state
            .tabs
            .iter()
            .position(|t| t.info.id == tab)
            .ok_or_else(|| anyhow!("no tab with id {tab}"))?;
        state.active = index;
        Ok(state.tabs[index].info.window)
    }

    async fn focus_window(&self, _window: WindowId) -> Result<()> {
        // The simulation has a single always-focused window.
        Ok(())
    }

    async fn create_tab(&self, url: Option<String>) -> Result<TabId> {
        let url = url.unwrap_or_else(|| "browser://newtab/".to_string());
        let title = site::site_label(&url);
        let id = self.seed_tab(&title, &url);
        let mut state = self.lock();
        state.active = state.tabs.len() - 1;
        Ok(id)
    }

    async fn inject_agent(&self, tab: &TabInfo) -> Result<(), InjectError> {
        if site::is_restricted(&tab.url) {
            return Err(InjectError::RestrictedUrl(tab.url.clone()));
        }
        let page = {
            let state = self.lock();
            state
                .tabs
                .iter()
                .find(|t| t.info.id == tab.id)
                .map(|t| Arc::clone(&t.page))
                .ok_or(InjectError::TabGone(tab.id))?
        };
        let runtime = self
            .runtime
            .get()
            .cloned()
            .ok_or_else(|| InjectError::Other(anyhow!("background context not connected")))?;
        info!(tab = %tab.id, url = %tab.url, "injecting page agent");
        let mailbox = agent::spawn(tab.id, page, runtime);
        self.pages.register(tab.id, mailbox);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Read-only snapshots for rendering
// ---------------------------------------------------------------------------

pub struct BrowserSnapshot {
    pub tabs: Vec<TabSummary>,
    pub active: usize,
    pub page: Option<PageView>,
}

pub struct TabSummary {
    pub id: TabId,
    pub title: String,
}

pub struct PageView {
    pub url: String,
    pub title: String,
    pub scroll_locked: bool,
    pub overlay: Option<OverlayView>,
}

pub struct OverlayView {
    pub visible: bool,
    pub mode: PaletteMode,
    pub palette: PaletteView,
    pub input: mpsc::Sender<FrameMessage>,
}

impl BrowserSnapshot {
    /// The overlay input channel, when a visible palette is accepting keys.
    pub fn focused_overlay_input(&self) -> Option<mpsc::Sender<FrameMessage>> {
        let overlay = self.page.as_ref()?.overlay.as_ref()?;
        if overlay.visible {
            Some(overlay.input.clone())
        } else {
            None
        }
    }
}
