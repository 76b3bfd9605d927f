//! The background context. Owns every privileged browser call and processes
//! its mailbox strictly one request at a time, so two shortcut presses for
//! the same tab can never interleave their probe/inject sequences.

use crate::bus::{DeliveryError, PageDirectory};
use crate::domain::browser::{BrowserHost, InjectError};
use crate::domain::chord;
use crate::domain::models::{PaletteMode, TabHit, TabId, TabInfo};
use crate::domain::settings::SettingsStore;
use crate::domain::site;
use crate::protocol::{
    AgentRequest, AgentResponse, RuntimeEnvelope, RuntimeHandle, RuntimeRequest, RuntimeResponse,
    ShortcutStatus,
};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How long a liveness probe may wait before the agent is presumed absent.
const PROBE_WAIT: Duration = Duration::from_millis(300);

pub struct Orchestrator {
    host: Arc<dyn BrowserHost>,
    settings: Arc<dyn SettingsStore>,
    pages: PageDirectory,
    probe_wait: Duration,
}

impl Orchestrator {
    pub fn new(
        host: Arc<dyn BrowserHost>,
        settings: Arc<dyn SettingsStore>,
        pages: PageDirectory,
    ) -> Self {
        Self {
            host,
            settings,
            pages,
            probe_wait: PROBE_WAIT,
        }
    }

    /// Shrinks the probe deadline, mainly so tests do not sit out 300ms.
    pub fn with_probe_wait(mut self, wait: Duration) -> Self {
        self.probe_wait = wait;
        self
    }

    /// Starts the background task and hands back the mailbox handle. The
    /// task drains envelopes sequentially and ends when every handle clone
    /// is dropped.
    pub fn spawn(self) -> RuntimeHandle {
        let (tx, mut rx) = mpsc::channel::<RuntimeEnvelope>(32);
        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let response = self.handle(envelope.request).await;
                // A caller that gave up waiting is not an error here.
                let _ = envelope.reply.send(response);
            }
            debug!("background context shut down");
        });
        RuntimeHandle::new(tx)
    }

    async fn handle(&self, request: RuntimeRequest) -> RuntimeResponse {
        match request {
            RuntimeRequest::ExecuteShortcut { chord, sender } => {
                RuntimeResponse::Shortcut(self.execute_shortcut(&chord, &sender).await)
            }
            RuntimeRequest::OpenPalette { tab, mode } => {
                done(self.ensure_palette_open(&tab, mode).await)
            }
            RuntimeRequest::QueryTabs => match self.query_tabs().await {
                Ok(tabs) => RuntimeResponse::Tabs(tabs),
                Err(err) => RuntimeResponse::Done {
                    success: false,
                    error: Some(err.to_string()),
                },
            },
            RuntimeRequest::SwitchToTab { tab } => done(self.switch_to_tab(tab).await),
            RuntimeRequest::OpenNewTab => done(self.open_url(None).await),
            RuntimeRequest::OpenBookmarks => {
                done(self.open_url(Some("browser://bookmarks/")).await)
            }
            RuntimeRequest::OpenHistory => done(self.open_url(Some("browser://history/")).await),
            RuntimeRequest::OpenSettings => done(self.open_url(Some("browser://settings/")).await),
            RuntimeRequest::ClosePalette { tab } => {
                if let Err(err) = self
                    .pages
                    .request(tab, AgentRequest::RemovePalette, self.probe_wait)
                    .await
                {
                    warn!(%tab, %err, "close request did not reach the page");
                }
                RuntimeResponse::Done {
                    success: true,
                    error: None,
                }
            }
        }
    }

    /// Resolves a relayed chord against the current bindings and, when it
    /// matches, opens (or toggles) the palette in the sending tab. The
    /// blocked-sites check runs before any message touches the page.
    async fn execute_shortcut(&self, raw_chord: &str, sender: &TabInfo) -> ShortcutStatus {
        let settings = match self.settings.load().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(%err, "could not load settings for shortcut dispatch");
                return ShortcutStatus::Error(err.to_string());
            }
        };

        let pressed = match chord::normalize(raw_chord) {
            Some(pressed) => pressed,
            None => return ShortcutStatus::NoMatch,
        };
        let mode = if Some(pressed.as_str())
            == chord::normalize(&settings.tab_switcher_shortcut).as_deref()
        {
            PaletteMode::TabSwitcher
        } else if Some(pressed.as_str())
            == chord::normalize(&settings.command_palette_shortcut).as_deref()
        {
            PaletteMode::General
        } else {
            return ShortcutStatus::NoMatch;
        };

        let blocked = settings
            .blocked_sites
            .iter()
            .filter(|pattern| !pattern.trim().is_empty())
            .any(|pattern| sender.url.contains(pattern.trim()));
        if blocked {
            info!(tab = %sender.id, url = %sender.url, "shortcut suppressed on blocked site");
            return ShortcutStatus::Blocked;
        }

        match self.ensure_palette_open(sender, mode).await {
            Ok(()) => ShortcutStatus::Executed,
            Err(err) => ShortcutStatus::Error(err.to_string()),
        }
    }

    /// Probe-then-act. A live agent gets a toggle; a silent tab gets one
    /// injection attempt followed by one init. Injection refusals on
    /// restricted pages are logged and swallowed, matching the shortcut
    /// having been handled even though nothing can open there.
    async fn ensure_palette_open(&self, tab: &TabInfo, mode: PaletteMode) -> Result<()> {
        match self
            .pages
            .request(tab.id, AgentRequest::IsAlive, self.probe_wait)
            .await
        {
            Ok(AgentResponse::Ready { visible, .. }) => {
                debug!(tab = %tab.id, visible, "agent alive, toggling");
                if let Err(err) = self
                    .pages
                    .request(tab.id, AgentRequest::TogglePalette { mode }, self.probe_wait)
                    .await
                {
                    // The agent answered the probe moments ago; losing the
                    // toggle is transient, not grounds for re-injection.
                    warn!(tab = %tab.id, %err, "toggle lost after live probe");
                }
                Ok(())
            }
            Ok(other) => {
                warn!(tab = %tab.id, ?other, "unexpected probe reply, leaving tab alone");
                Ok(())
            }
            Err(err) => {
                debug!(tab = %tab.id, %err, "agent not reachable, injecting");
                self.inject_and_init(tab, mode).await;
                Ok(())
            }
        }
    }

    async fn inject_and_init(&self, tab: &TabInfo, mode: PaletteMode) {
        match self.host.inject_agent(tab).await {
            Ok(()) => {
                if let Err(err) = self
                    .pages
                    .request(tab.id, AgentRequest::InitPalette { mode }, self.probe_wait)
                    .await
                {
                    warn!(tab = %tab.id, %err, "freshly injected agent did not take init");
                }
            }
            Err(InjectError::RestrictedUrl(url)) => {
                info!(tab = %tab.id, %url, "page does not accept injected scripts");
            }
            Err(err) => {
                warn!(tab = %tab.id, %err, "script injection failed");
            }
        }
    }

    async fn query_tabs(&self) -> Result<Vec<TabHit>> {
        let tabs = self.host.query_tabs().await?;
        Ok(tabs
            .into_iter()
            .map(|tab| TabHit {
                fav_icon_url: tab
                    .fav_icon_url
                    .clone()
                    .or_else(|| site::fallback_favicon(&tab.url)),
                id: tab.id,
                title: tab.title,
                url: tab.url,
            })
            .collect())
    }

    async fn switch_to_tab(&self, tab: TabId) -> Result<()> {
        let window = self.host.activate_tab(tab).await?;
        if let Err(err) = self.host.focus_window(window).await {
            // The tab did activate; a focus refusal should not fail the switch.
            warn!(%tab, %window, %err, "window focus failed after tab activation");
        }
        Ok(())
    }

    async fn open_url(&self, url: Option<&str>) -> Result<()> {
        self.host.create_tab(url.map(str::to_string)).await?;
        Ok(())
    }
}

fn done(result: Result<()>) -> RuntimeResponse {
    match result {
        Ok(()) => RuntimeResponse::Done {
            success: true,
            error: None,
        },
        Err(err) => RuntimeResponse::Done {
            success: false,
            error: Some(err.to_string()),
        },
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
