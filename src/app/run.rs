use crate::app::input::{map_event, AppEvent};
use crate::app::state::AppState;
use crate::app::ui;
use crate::domain::models::PaletteMode;
use crate::infrastructure::sim::SimBrowser;
use crate::protocol::{FrameMessage, RuntimeHandle, ShortcutStatus};
use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::{backend::Backend, Terminal};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::warn;

/// Short enough that palette watch-channel updates show up promptly.
const TICK_RATE: Duration = Duration::from_millis(100);

pub async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: AppState,
    sim: SimBrowser,
    runtime: RuntimeHandle,
) -> Result<()> {
    // User input channel
    let (event_tx, event_rx) = mpsc::channel(100);
    tokio::task::spawn_blocking(move || loop {
        match event::read() {
            Ok(evt) => {
                if event_tx.blocking_send(Ok(evt)).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = event_tx.blocking_send(Err(e));
                break;
            }
        }
    });

    run_loop_with_events(terminal, state, sim, runtime, event_rx).await
}

pub async fn run_loop_with_events<B: Backend>(
    terminal: &mut Terminal<B>,
    mut state: AppState,
    sim: SimBrowser,
    runtime: RuntimeHandle,
    mut event_rx: mpsc::Receiver<Result<Event, std::io::Error>>,
) -> Result<()> {
    let mut interval = interval(TICK_RATE);

    loop {
        // --- 1. Render ---
        let snapshot = sim.snapshot();
        terminal.draw(|f| {
            ui::draw(f, &state, &snapshot);
        })?;
        let overlay_focused = snapshot.focused_overlay_input().is_some();

        // --- 2. Event handling ---
        let app_event = tokio::select! {
            _ = interval.tick() => None,
            Some(res) = event_rx.recv() => {
                let event = res?;
                map_event(&event, overlay_focused)
            }
        };

        // --- 3. Dispatch ---
        if let Some(app_event) = app_event {
            dispatch(app_event, &mut state, &sim, &runtime).await;
            if state.should_quit {
                break;
            }
        }
    }

    Ok(())
}

async fn dispatch(event: AppEvent, state: &mut AppState, sim: &SimBrowser, runtime: &RuntimeHandle) {
    match event {
        AppEvent::Quit => state.should_quit = true,
        AppEvent::NextTab => sim.cycle_active(1),
        AppEvent::PrevTab => sim.cycle_active(-1),
        AppEvent::ReloadPage => {
            sim.reload_active();
            state.info("Page reloaded");
        }
        AppEvent::ToolbarOpen => {
            let Some(tab) = sim.active_tab() else { return };
            match runtime.open_palette(tab, PaletteMode::General).await {
                Ok(_) => state.status = None,
                Err(err) => state.error(err.to_string()),
            }
        }
        AppEvent::ShortcutChord(chord) => {
            let Some(tab) = sim.active_tab() else { return };
            match runtime.execute_shortcut(chord.clone(), tab).await {
                Ok(ShortcutStatus::Executed) => state.status = None,
                Ok(ShortcutStatus::Blocked) => state.error("Shortcut blocked on this site"),
                Ok(ShortcutStatus::NoMatch) => {}
                Ok(ShortcutStatus::Error(msg)) => state.error(msg),
                Err(err) => state.error(err.to_string()),
            }
        }
        AppEvent::ForwardKey(key) => {
            if let Some(input) = sim.snapshot().focused_overlay_input() {
                if input.send(FrameMessage::Key(key)).await.is_err() {
                    warn!("palette input channel closed while forwarding a key");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
