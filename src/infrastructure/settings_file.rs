//! TOML-backed settings persistence under the user's config directory.

use crate::domain::settings::{Settings, SettingsStore};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.config/quickpal/settings.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let home = home::home_dir().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(home.join(".config").join("quickpal").join("settings.toml"))
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::at(Self::default_path()?))
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    /// A missing file is not an error; it means the defaults. A present but
    /// unreadable or malformed file is, so a typo never silently resets the
    /// user's bindings.
    async fn load(&self) -> Result<Settings> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Settings::default())
            }
            Err(err) => {
                return Err(err).context(format!("reading {}", self.path.display()));
            }
        };
        toml::from_str(&raw).context(format!("parsing {}", self.path.display()))
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(format!("creating {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, raw)
            .await
            .context(format!("writing {}", self.path.display()))
    }
}
