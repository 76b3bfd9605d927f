use crate::domain::models::{TabId, TabInfo, WindowId};
use crate::protocol::OverlaySurface;
use anyhow::Result;
use async_trait::async_trait;

/// Why a script-injection attempt was refused.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// Browser-internal and local-file pages never accept injected scripts.
    #[error("scripts cannot run on {0}")]
    RestrictedUrl(String),
    #[error("tab {0} was closed or became invalid")]
    TabGone(TabId),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The privileged platform primitives the orchestrator calls out to. Every
/// method is a single request/response against browser state; none of them
/// touch palette state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrowserHost: Send + Sync {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>>;

    /// Activates the tab and returns its owning window so the caller can
    /// focus it.
    async fn activate_tab(&self, tab: TabId) -> Result<WindowId>;

    async fn focus_window(&self, window: WindowId) -> Result<()>;

    /// Opens a new tab; `None` means a blank page.
    async fn create_tab(&self, url: Option<String>) -> Result<TabId>;

    /// Loads a page agent into the tab. On success the tab's mailbox is
    /// reachable through the page directory.
    async fn inject_agent(&self, tab: &TabInfo) -> Result<(), InjectError>;
}

/// The slice of the host page a page agent is allowed to mutate: the overlay
/// container it exclusively owns, and the page scroll lock.
#[cfg_attr(test, mockall::automock)]
pub trait HostPage: Send + Sync {
    /// Mounts (or reconfigures in place) the overlay container. At most one
    /// overlay exists per page; mounting replaces, never stacks.
    fn mount_overlay(&self, overlay: OverlaySurface);

    fn set_overlay_visible(&self, visible: bool);

    fn unmount_overlay(&self);

    fn set_scroll_locked(&self, locked: bool);
}
