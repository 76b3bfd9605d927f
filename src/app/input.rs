//! Maps terminal events onto demo actions. Ordering matters: browser-chrome
//! keys win, then anything with a command-like modifier is treated as a
//! page-observed chord (so the toggle works even while the palette has
//! focus), and only then do plain keys go to the focused overlay.

use crate::domain::chord::Chord;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,
    /// Simulate the active page reloading, which strands any injected agent.
    ReloadPage,
    /// The toolbar-button entry point for the general palette.
    ToolbarOpen,
    /// A chord the simulated page observed and relays to the background.
    ShortcutChord(String),
    /// A plain keystroke owned by the focused palette input.
    ForwardKey(KeyEvent),
    NextTab,
    PrevTab,
}

pub fn map_event(event: &Event, overlay_focused: bool) -> Option<AppEvent> {
    let Event::Key(key) = event else { return None };
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::CONTROL) => return Some(AppEvent::Quit),
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => return Some(AppEvent::ReloadPage),
        (KeyCode::F(2), _) => return Some(AppEvent::ToolbarOpen),
        _ => {}
    }

    if let Some(chord) = Chord::from_key_event(key) {
        return Some(AppEvent::ShortcutChord(chord.normalized()));
    }

    if overlay_focused {
        return Some(AppEvent::ForwardKey(*key));
    }

    match key.code {
        KeyCode::Right => Some(AppEvent::NextTab),
        KeyCode::Left => Some(AppEvent::PrevTab),
        _ => None,
    }
}
