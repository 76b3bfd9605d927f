use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TAB_SWITCHER: &str = "Cmd+K";
pub const DEFAULT_COMMAND_PALETTE: &str = "Cmd+Shift+P";

/// Persisted user settings: the two shortcut bindings and the blocked-site
/// substrings that gate them. Unknown fields in the file are ignored so the
/// format can grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tab_switcher_shortcut: String,
    pub command_palette_shortcut: String,
    pub blocked_sites: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tab_switcher_shortcut: DEFAULT_TAB_SWITCHER.to_string(),
            command_palette_shortcut: DEFAULT_COMMAND_PALETTE.to_string(),
            blocked_sites: Vec::new(),
        }
    }
}

/// The settings key-value store. Consulted live on every shortcut
/// evaluation; callers must not cache what it returns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings>;
    async fn save(&self, settings: &Settings) -> Result<()>;
}
