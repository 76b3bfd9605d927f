//! One embedded palette frame instance: the task running its UI, the
//! channels into it, and the load signal the focus handoff waits on.

use crate::domain::models::PaletteMode;
use crate::palette::PaletteUi;
use crate::protocol::{FrameId, FrameMessage, OverlaySurface, PaletteView, RuntimeHandle, UiEnvelope};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tracing::debug;

/// Upper bound on waiting for the frame to announce itself before focusing
/// it anyway. Covers a lost ready signal without stalling the handoff.
const LOAD_DEADLINE: Duration = Duration::from_millis(400);
const LOAD_POLL: Duration = Duration::from_millis(50);

pub struct FrameHandle {
    pub id: FrameId,
    pub mode: PaletteMode,
    input: mpsc::Sender<FrameMessage>,
    view: watch::Receiver<PaletteView>,
    loaded: Arc<AtomicBool>,
    load_signal: Arc<Notify>,
    task: JoinHandle<()>,
}

impl FrameHandle {
    /// Spins up a fresh palette UI task for this frame. The UI reports back
    /// to the agent through `agent_tx`, stamped with `id`.
    pub fn mount(
        id: FrameId,
        mode: PaletteMode,
        runtime: RuntimeHandle,
        agent_tx: mpsc::Sender<UiEnvelope>,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::channel(16);
        let (view_tx, view_rx) = watch::channel(PaletteView::default());
        let loaded = Arc::new(AtomicBool::new(false));
        let load_signal = Arc::new(Notify::new());

        let ui = PaletteUi::new(
            id,
            mode,
            runtime,
            agent_tx,
            view_tx,
            Arc::clone(&loaded),
            Arc::clone(&load_signal),
        );
        let task = tokio::spawn(ui.run(input_rx));

        Self {
            id,
            mode,
            input: input_tx,
            view: view_rx,
            loaded,
            load_signal,
            task,
        }
    }

    pub fn surface(&self) -> OverlaySurface {
        OverlaySurface {
            frame: self.id,
            mode: self.mode,
            input: self.input.clone(),
            view: self.view.clone(),
        }
    }

    pub fn waiter(&self) -> FrameWaiter {
        FrameWaiter {
            frame: self.id,
            mode: self.mode,
            input: self.input.clone(),
            loaded: Arc::clone(&self.loaded),
            load_signal: Arc::clone(&self.load_signal),
        }
    }

    pub fn abort(self) {
        self.task.abort();
    }
}

/// Waits for the frame's load announcement, with a polling fallback, then
/// hands it input focus. Runs detached so the agent's mailbox stays free
/// while the frame boots.
#[derive(Clone)]
pub struct FrameWaiter {
    frame: FrameId,
    mode: PaletteMode,
    input: mpsc::Sender<FrameMessage>,
    loaded: Arc<AtomicBool>,
    load_signal: Arc<Notify>,
}

impl FrameWaiter {
    pub async fn focus_when_ready(self) {
        let deadline = tokio::time::Instant::now() + LOAD_DEADLINE;
        while !self.loaded.load(Ordering::Acquire) {
            if tokio::time::Instant::now() >= deadline {
                debug!(frame = %self.frame, "load signal missed, focusing anyway");
                break;
            }
            tokio::select! {
                _ = self.load_signal.notified() => {}
                _ = tokio::time::sleep(LOAD_POLL) => {}
            }
        }
        // If the frame was torn down meanwhile this send just fails.
        let _ = self
            .input
            .send(FrameMessage::FocusInput { mode: self.mode })
            .await;
    }
}
