//! The closed set of messages that cross context boundaries. Every payload
//! is a typed request/response pair; anything outside this set cannot be
//! expressed, which is the point.

use crate::domain::models::{CommandAction, PaletteMode, TabHit, TabId, TabInfo};
use anyhow::{anyhow, Result};
use crossterm::event::KeyEvent;
use std::fmt;
use tokio::sync::{mpsc, oneshot, watch};

/// Identity of one mounted palette frame instance. A new instance is minted
/// on every mount and on every mode-change reload, so the page agent can
/// tell messages from the current frame apart from a superseded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameId(pub u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Page/agent/UI -> orchestrator ("runtime messages")
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeRequest {
    /// A chord observed by the page, relayed for binding lookup and dispatch.
    ExecuteShortcut { chord: String, sender: TabInfo },
    /// The toolbar/global-command entry point; converges on the same
    /// open routine as a matched shortcut.
    OpenPalette { tab: TabInfo, mode: PaletteMode },
    QueryTabs,
    SwitchToTab { tab: TabId },
    OpenNewTab,
    OpenBookmarks,
    OpenHistory,
    OpenSettings,
    /// Asks the orchestrator to tell the tab's agent to tear the palette down.
    ClosePalette { tab: TabId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeResponse {
    Shortcut(ShortcutStatus),
    Tabs(Vec<TabHit>),
    Done { success: bool, error: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShortcutStatus {
    Executed,
    Blocked,
    NoMatch,
    Error(String),
}

pub struct RuntimeEnvelope {
    pub request: RuntimeRequest,
    pub reply: oneshot::Sender<RuntimeResponse>,
}

/// Cloneable sender half of the orchestrator's mailbox, with typed helpers
/// so callers never match on a response shape they did not ask for.
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: mpsc::Sender<RuntimeEnvelope>,
}

impl RuntimeHandle {
    pub fn new(tx: mpsc::Sender<RuntimeEnvelope>) -> Self {
        Self { tx }
    }

    pub async fn request(&self, request: RuntimeRequest) -> Result<RuntimeResponse> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(RuntimeEnvelope {
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow!("background context is gone"))?;
        reply_rx
            .await
            .map_err(|_| anyhow!("background context dropped the reply"))
    }

    pub async fn execute_shortcut(&self, chord: String, sender: TabInfo) -> Result<ShortcutStatus> {
        match self
            .request(RuntimeRequest::ExecuteShortcut { chord, sender })
            .await?
        {
            RuntimeResponse::Shortcut(status) => Ok(status),
            other => Err(anyhow!("unexpected reply to shortcut: {other:?}")),
        }
    }

    pub async fn open_palette(&self, tab: TabInfo, mode: PaletteMode) -> Result<bool> {
        self.done(RuntimeRequest::OpenPalette { tab, mode }).await
    }

    pub async fn query_tabs(&self) -> Result<Vec<TabHit>> {
        match self.request(RuntimeRequest::QueryTabs).await? {
            RuntimeResponse::Tabs(tabs) => Ok(tabs),
            RuntimeResponse::Done { error, .. } => Err(anyhow!(
                "{}",
                error.unwrap_or_else(|| "tab query failed".to_string())
            )),
            other => Err(anyhow!("unexpected reply to tab query: {other:?}")),
        }
    }

    pub async fn switch_to_tab(&self, tab: TabId) -> Result<bool> {
        self.done(RuntimeRequest::SwitchToTab { tab }).await
    }

    /// Maps a palette command onto its privileged request. DevTools has no
    /// platform primitive and is handled inside the palette itself.
    pub async fn perform_general(&self, action: CommandAction) -> Result<bool> {
        let request = match action {
            CommandAction::OpenNewTab => RuntimeRequest::OpenNewTab,
            CommandAction::ShowHistory => RuntimeRequest::OpenHistory,
            CommandAction::ShowBookmarks => RuntimeRequest::OpenBookmarks,
            CommandAction::OpenSettings => RuntimeRequest::OpenSettings,
            CommandAction::OpenDevTools => return Ok(false),
        };
        self.done(request).await
    }

    async fn done(&self, request: RuntimeRequest) -> Result<bool> {
        match self.request(request).await? {
            RuntimeResponse::Done { success, .. } => Ok(success),
            other => Err(anyhow!("unexpected reply: {other:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator -> page agent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum AgentRequest {
    /// Liveness probe; always answered from current state, never deferred.
    IsAlive,
    InitPalette { mode: PaletteMode },
    TogglePalette { mode: PaletteMode },
    RemovePalette,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentResponse {
    Ready { visible: bool, mode: PaletteMode },
    Ack(&'static str),
}

// ---------------------------------------------------------------------------
// Page agent <-> palette frame
// ---------------------------------------------------------------------------

/// Messages into the embedded palette frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameMessage {
    FocusInput { mode: PaletteMode },
    UpdateMode { mode: PaletteMode },
    /// A keystroke owned by the focused palette input.
    Key(KeyEvent),
}

/// Messages the palette posts back to its embedding page agent.
#[derive(Debug, Clone, PartialEq)]
pub enum UiMessage {
    PaletteReady { mode: PaletteMode },
    ClosePalette,
    PerformGeneralAction(CommandAction),
}

/// Relay envelope: the agent only accepts messages stamped with the frame
/// instance it currently embeds.
#[derive(Debug, Clone, PartialEq)]
pub struct UiEnvelope {
    pub frame: FrameId,
    pub message: UiMessage,
}

// ---------------------------------------------------------------------------
// Palette render surface
// ---------------------------------------------------------------------------

/// One row of the rendered result list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub icon: String,
    pub title: String,
    /// Site label for tab rows; commands have none.
    pub detail: Option<String>,
}

/// Snapshot of everything the palette frame currently shows. Published over
/// a watch channel; the embedding surface renders it but never mutates it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaletteView {
    pub mode: PaletteMode,
    pub query: String,
    pub rows: Vec<ResultRow>,
    pub selected: Option<usize>,
    pub notice: Option<String>,
    pub focused: bool,
}

impl PaletteView {
    pub fn placeholder(&self) -> &'static str {
        match self.mode {
            PaletteMode::TabSwitcher => "Search open tabs...",
            PaletteMode::General => "Type a command...",
        }
    }
}

/// The embedded frame element as the host page sees it: an input channel
/// and a read-only view of what the frame renders.
#[derive(Debug, Clone)]
pub struct OverlaySurface {
    pub frame: FrameId,
    pub mode: PaletteMode,
    pub input: mpsc::Sender<FrameMessage>,
    pub view: watch::Receiver<PaletteView>,
}
