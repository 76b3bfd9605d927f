//! The palette frame context: an isolated task that owns the query state,
//! fetches candidates over the runtime handle, and publishes what it shows
//! through a watch channel the embedding page renders from.

pub mod catalog;
pub mod state;

use crate::domain::models::{CommandAction, PaletteMode, ResultItem};
use crate::domain::site;
use crate::protocol::{
    FrameId, FrameMessage, PaletteView, ResultRow, RuntimeHandle, UiEnvelope, UiMessage,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use state::QueryState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Notify};
use tracing::{debug, warn};

/// How long a notice such as the DevTools hint stays on screen before the
/// palette closes itself.
const NOTICE_LINGER: Duration = Duration::from_millis(600);

pub struct PaletteUi {
    frame: FrameId,
    state: QueryState,
    runtime: RuntimeHandle,
    agent: mpsc::Sender<UiEnvelope>,
    view: watch::Sender<PaletteView>,
    loaded: Arc<AtomicBool>,
    load_signal: Arc<Notify>,
    focused: bool,
    notice: Option<String>,
}

impl PaletteUi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        frame: FrameId,
        mode: PaletteMode,
        runtime: RuntimeHandle,
        agent: mpsc::Sender<UiEnvelope>,
        view: watch::Sender<PaletteView>,
        loaded: Arc<AtomicBool>,
        load_signal: Arc<Notify>,
    ) -> Self {
        let mut state = QueryState::default();
        state.mode = mode;
        Self {
            frame,
            state,
            runtime,
            agent,
            view,
            loaded,
            load_signal,
            focused: false,
            notice: None,
        }
    }

    pub async fn run(mut self, mut input: mpsc::Receiver<FrameMessage>) {
        self.reload(self.state.mode).await;
        while let Some(message) = input.recv().await {
            match message {
                FrameMessage::FocusInput { mode } => {
                    self.focused = true;
                    if mode != self.state.mode {
                        self.reload(mode).await;
                    } else {
                        self.publish();
                    }
                }
                FrameMessage::UpdateMode { mode } => self.reload(mode).await,
                FrameMessage::Key(key) => self.handle_key(key).await,
            }
        }
        debug!(frame = %self.frame, "palette frame torn down");
    }

    /// Fetches a fresh candidate set for `mode`. Tab candidates are queried
    /// from the background on every open; nothing is cached across shows.
    async fn reload(&mut self, mode: PaletteMode) {
        let candidates = match mode {
            PaletteMode::TabSwitcher => match self.runtime.query_tabs().await {
                Ok(tabs) => tabs.into_iter().map(ResultItem::Tab).collect(),
                Err(err) => {
                    warn!(frame = %self.frame, %err, "tab query failed");
                    self.notice = Some("Could not load open tabs.".to_string());
                    Vec::new()
                }
            },
            PaletteMode::General => catalog::general_commands(),
        };
        self.state.reset(mode, candidates);
        self.publish();
        self.announce_loaded().await;
    }

    /// First publish doubles as the frame's load announcement: the embedding
    /// agent may already be waiting to hand over focus.
    async fn announce_loaded(&mut self) {
        if self.loaded.swap(true, Ordering::AcqRel) {
            return;
        }
        self.load_signal.notify_waiters();
        self.post(UiMessage::PaletteReady {
            mode: self.state.mode,
        })
        .await;
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.request_close().await,
            KeyCode::Enter => self.activate().await,
            KeyCode::Down => {
                self.state.select_next();
                self.publish();
            }
            KeyCode::Up => {
                self.state.select_prev();
                self.publish();
            }
            KeyCode::Backspace => {
                self.state.backspace();
                self.notice = None;
                self.publish();
            }
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.state.push_char(c);
                self.notice = None;
                self.publish();
            }
            _ => {}
        }
    }

    async fn activate(&mut self) {
        let Some(target) = self.state.activation_target().cloned() else {
            return;
        };
        match target {
            ResultItem::Tab(tab) => match self.runtime.switch_to_tab(tab.id).await {
                Ok(true) => self.request_close().await,
                Ok(false) => {
                    // The tab disappeared between the query and the Enter.
                    self.notice = Some(format!("Could not switch to \"{}\".", tab.title));
                    self.publish();
                }
                Err(err) => {
                    warn!(frame = %self.frame, %err, "tab switch failed");
                    self.notice = Some("Could not switch tabs.".to_string());
                    self.publish();
                }
            },
            ResultItem::Command(command) => match command.action {
                CommandAction::OpenDevTools => {
                    // Extensions cannot open the inspector; show the hint,
                    // give it a moment, then close.
                    self.notice = Some("Press F12 to open DevTools.".to_string());
                    self.publish();
                    tokio::time::sleep(NOTICE_LINGER).await;
                    self.request_close().await;
                }
                action => {
                    self.post(UiMessage::PerformGeneralAction(action)).await;
                }
            },
        }
    }

    async fn request_close(&mut self) {
        self.post(UiMessage::ClosePalette).await;
    }

    async fn post(&self, message: UiMessage) {
        let _ = self
            .agent
            .send(UiEnvelope {
                frame: self.frame,
                message,
            })
            .await;
    }

    fn publish(&mut self) {
        let rows = self
            .state
            .matches()
            .map(|item| match item {
                ResultItem::Tab(tab) => ResultRow {
                    icon: row_icon(&tab.title, &tab.url),
                    title: tab.title.clone(),
                    detail: Some(site::site_label(&tab.url)),
                },
                ResultItem::Command(command) => ResultRow {
                    icon: command.icon.to_string(),
                    title: command.title.to_string(),
                    detail: None,
                },
            })
            .collect();
        let _ = self.view.send(PaletteView {
            mode: self.state.mode,
            query: self.state.query.clone(),
            rows,
            selected: self.state.selected,
            notice: self.notice.clone(),
            focused: self.focused,
        });
    }
}

/// A one-character stand-in for the favicon: the first letter of the title,
/// falling back to the site label, then a placeholder.
fn row_icon(title: &str, url: &str) -> String {
    title
        .chars()
        .find(|c| c.is_alphanumeric())
        .or_else(|| site::site_label(url).chars().find(|c| c.is_alphanumeric()))
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
#[path = "palette_tests.rs"]
mod tests;
