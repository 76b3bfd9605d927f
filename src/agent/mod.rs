//! The in-page context. One agent task per tab: it owns the overlay frame,
//! answers liveness probes from the background, and relays messages between
//! the embedded palette UI and the rest of the system.

pub mod frame;
pub mod lifecycle;

use crate::bus::AgentEnvelope;
use crate::domain::browser::HostPage;
use crate::domain::models::{PaletteMode, TabId};
use crate::protocol::{AgentRequest, AgentResponse, FrameId, RuntimeHandle, UiEnvelope, UiMessage};
use frame::FrameHandle;
use lifecycle::{decide_toggle, LifecycleState, ToggleDecision};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// How long the hide animation runs before the frame is actually unmounted.
const FADE_OUT: Duration = Duration::from_millis(200);

enum InternalEvent {
    /// The fade-out for this frame instance finished; unmount if it is
    /// still the current one and nothing re-showed it meanwhile.
    FinalizeHide(FrameId),
}

pub struct PageAgent {
    tab: TabId,
    page: Arc<dyn HostPage>,
    runtime: RuntimeHandle,
    state: LifecycleState,
    mode: PaletteMode,
    frame: Option<FrameHandle>,
    next_frame_id: u64,
    scroll_locked: bool,
    ui_tx: mpsc::Sender<UiEnvelope>,
    internal_tx: mpsc::Sender<InternalEvent>,
}

/// Starts an agent for `tab` and returns its mailbox. The agent lives until
/// every clone of the mailbox sender is dropped, which models the page
/// navigating away.
pub fn spawn(
    tab: TabId,
    page: Arc<dyn HostPage>,
    runtime: RuntimeHandle,
) -> mpsc::Sender<AgentEnvelope> {
    let (agent_tx, agent_rx) = mpsc::channel(16);
    let (ui_tx, ui_rx) = mpsc::channel(16);
    let (internal_tx, internal_rx) = mpsc::channel(4);
    let agent = PageAgent {
        tab,
        page,
        runtime,
        state: LifecycleState::Absent,
        mode: PaletteMode::default(),
        frame: None,
        next_frame_id: 0,
        scroll_locked: false,
        ui_tx,
        internal_tx,
    };
    tokio::spawn(agent.run(agent_rx, ui_rx, internal_rx));
    agent_tx
}

impl PageAgent {
    async fn run(
        mut self,
        mut agent_rx: mpsc::Receiver<AgentEnvelope>,
        mut ui_rx: mpsc::Receiver<UiEnvelope>,
        mut internal_rx: mpsc::Receiver<InternalEvent>,
    ) {
        loop {
            tokio::select! {
                envelope = agent_rx.recv() => {
                    let Some(envelope) = envelope else { break };
                    let response = self.handle_request(envelope.request);
                    let _ = envelope.reply.send(response);
                }
                Some(envelope) = ui_rx.recv() => {
                    self.handle_ui(envelope).await;
                }
                Some(event) = internal_rx.recv() => {
                    self.handle_internal(event);
                }
            }
        }
        debug!(tab = %self.tab, "page unloading, tearing palette down");
        self.unmount();
    }

    /// Requests from the background context. Every arm replies immediately;
    /// anything slow (frame boot, fades) continues on detached tasks so a
    /// probe never waits behind it.
    fn handle_request(&mut self, request: AgentRequest) -> AgentResponse {
        match request {
            AgentRequest::IsAlive => AgentResponse::Ready {
                visible: self.state.visible(),
                mode: self.mode,
            },
            AgentRequest::InitPalette { mode } => {
                self.show(mode);
                AgentResponse::Ack("palette initialization started")
            }
            AgentRequest::TogglePalette { mode } => match decide_toggle(self.state, mode) {
                ToggleDecision::Hide => {
                    self.hide();
                    AgentResponse::Ack("palette hidden")
                }
                ToggleDecision::Show(mode) => {
                    let switched = self.state.visible();
                    self.show(mode);
                    if switched {
                        AgentResponse::Ack("palette mode updated")
                    } else {
                        AgentResponse::Ack("palette shown")
                    }
                }
            },
            AgentRequest::RemovePalette => {
                self.unmount();
                AgentResponse::Ack("palette removed")
            }
        }
    }

    /// Shows the palette in `mode`, mounting a fresh frame when none exists
    /// or the mode changed. A hidden frame in the same mode is re-shown in
    /// place, which also cancels its pending fade removal.
    fn show(&mut self, mode: PaletteMode) {
        self.mode = mode;
        let needs_mount = match &self.frame {
            Some(frame) => frame.mode != mode,
            None => true,
        };
        if needs_mount {
            if let Some(old) = self.frame.take() {
                old.abort();
            }
            self.next_frame_id += 1;
            let frame = FrameHandle::mount(
                FrameId(self.next_frame_id),
                mode,
                self.runtime.clone(),
                self.ui_tx.clone(),
            );
            self.page.mount_overlay(frame.surface());
            self.frame = Some(frame);
        }
        self.page.set_overlay_visible(true);
        if !self.scroll_locked {
            self.page.set_scroll_locked(true);
            self.scroll_locked = true;
        }
        self.state = LifecycleState::Visible(mode);
        if let Some(frame) = &self.frame {
            tokio::spawn(frame.waiter().focus_when_ready());
        }
    }

    /// Starts the hide: the overlay fades now, the frame comes out of the
    /// page only after the fade has run its course.
    fn hide(&mut self) {
        let Some(frame) = &self.frame else { return };
        let frame_id = frame.id;
        self.page.set_overlay_visible(false);
        self.state = LifecycleState::Hidden;
        let finalize = self.internal_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(FADE_OUT).await;
            let _ = finalize.send(InternalEvent::FinalizeHide(frame_id)).await;
        });
    }

    fn handle_internal(&mut self, event: InternalEvent) {
        match event {
            InternalEvent::FinalizeHide(frame_id) => {
                let still_current = self.frame.as_ref().is_some_and(|f| f.id == frame_id);
                if still_current && self.state == LifecycleState::Hidden {
                    self.unmount();
                }
            }
        }
    }

    /// Tears the frame out of the page and releases everything it held.
    /// Safe to call in any state.
    fn unmount(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.abort();
        }
        self.page.unmount_overlay();
        if self.scroll_locked {
            self.page.set_scroll_locked(false);
            self.scroll_locked = false;
        }
        self.state = LifecycleState::Absent;
    }

    /// Messages posted by the embedded palette. Only the current frame
    /// instance is listened to; a superseded frame's messages are dropped.
    async fn handle_ui(&mut self, envelope: UiEnvelope) {
        let current = self.frame.as_ref().map(|f| f.id);
        if current != Some(envelope.frame) {
            warn!(
                tab = %self.tab,
                from = %envelope.frame,
                "ignoring message from a stale palette frame"
            );
            return;
        }
        match envelope.message {
            UiMessage::PaletteReady { mode } => {
                debug!(tab = %self.tab, %mode, "palette frame ready");
            }
            UiMessage::ClosePalette => self.hide(),
            UiMessage::PerformGeneralAction(action) => {
                match self.runtime.perform_general(action).await {
                    Ok(true) => {}
                    Ok(false) => warn!(tab = %self.tab, ?action, "command had no effect"),
                    Err(err) => warn!(tab = %self.tab, ?action, %err, "command failed"),
                }
                self.unmount();
            }
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
