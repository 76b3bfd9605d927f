use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;

/// A keyboard shortcut in canonical form: modifiers in the fixed order
/// Cmd, Ctrl, Alt, Shift, followed by exactly one non-modifier key.
/// Single printable characters are upper-cased, so "cmd+k" and "Cmd+K"
/// compare equal once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    pub cmd: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: String,
}

impl Chord {
    /// Parses a chord string such as "Cmd+Shift+P". Segment order and case
    /// are forgiven; the result renders in canonical order. Returns `None`
    /// when no non-modifier key is present.
    pub fn parse(raw: &str) -> Option<Chord> {
        let mut chord = Chord {
            cmd: false,
            ctrl: false,
            alt: false,
            shift: false,
            key: String::new(),
        };
        for segment in raw.split('+') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match segment.to_ascii_lowercase().as_str() {
                "cmd" | "meta" | "super" => chord.cmd = true,
                "ctrl" | "control" => chord.ctrl = true,
                "alt" | "option" => chord.alt = true,
                "shift" => chord.shift = true,
                _ => chord.key = canonical_key(segment),
            }
        }
        if chord.key.is_empty() {
            None
        } else {
            Some(chord)
        }
    }

    /// Builds a chord from a terminal key event. Only events carrying a
    /// command-like modifier qualify; plain typing never becomes a chord.
    pub fn from_key_event(key: &KeyEvent) -> Option<Chord> {
        let mods = key.modifiers;
        let cmd = mods.contains(KeyModifiers::SUPER) || mods.contains(KeyModifiers::META);
        let ctrl = mods.contains(KeyModifiers::CONTROL);
        let alt = mods.contains(KeyModifiers::ALT);
        if !(cmd || ctrl || alt) {
            return None;
        }
        let name = match key.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Esc => "Escape".to_string(),
            KeyCode::Up => "ArrowUp".to_string(),
            KeyCode::Down => "ArrowDown".to_string(),
            KeyCode::Left => "ArrowLeft".to_string(),
            KeyCode::Right => "ArrowRight".to_string(),
            _ => return None,
        };
        Some(Chord {
            cmd,
            ctrl,
            alt,
            shift: mods.contains(KeyModifiers::SHIFT),
            key: canonical_key(&name),
        })
    }

    pub fn normalized(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments: Vec<&str> = Vec::with_capacity(5);
        if self.cmd {
            segments.push("Cmd");
        }
        if self.ctrl {
            segments.push("Ctrl");
        }
        if self.alt {
            segments.push("Alt");
        }
        if self.shift {
            segments.push("Shift");
        }
        segments.push(&self.key);
        f.write_str(&segments.join("+"))
    }
}

fn canonical_key(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_uppercase().to_string(),
        _ => name.to_string(),
    }
}

/// Normalizes a raw chord string, or `None` when it names no key.
pub fn normalize(raw: &str) -> Option<String> {
    Chord::parse(raw).map(|c| c.normalized())
}
