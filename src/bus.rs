//! Delivery layer between the orchestrator and per-tab page agents. A tab
//! either has a registered mailbox or it does not; sending to a tab without
//! one fails with [`DeliveryError::NoReceivingEnd`], which is exactly the
//! signal the orchestrator uses to decide that injection is needed.

use crate::domain::models::TabId;
use crate::protocol::{AgentRequest, AgentResponse};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// One request to a page agent, carrying its reply slot.
pub struct AgentEnvelope {
    pub request: AgentRequest,
    pub reply: oneshot::Sender<AgentResponse>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// No agent is listening in that tab. Fresh navigations land here until
    /// a script is injected.
    #[error("no receiving end in tab {0}")]
    NoReceivingEnd(TabId),
    #[error("tab {0} did not answer in time")]
    Timeout(TabId),
}

/// Registry of live page-agent mailboxes, keyed by tab. Cloning shares the
/// registry; agents register on spawn and are dropped the first time a send
/// to them fails.
#[derive(Clone, Default)]
pub struct PageDirectory {
    inner: Arc<Mutex<HashMap<TabId, mpsc::Sender<AgentEnvelope>>>>,
}

impl PageDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tab: TabId, mailbox: mpsc::Sender<AgentEnvelope>) {
        debug!(%tab, "page agent registered");
        self.lock().insert(tab, mailbox);
    }

    /// Forgets the tab's mailbox, e.g. when its page navigates away.
    pub fn deregister(&self, tab: TabId) {
        if self.lock().remove(&tab).is_some() {
            debug!(%tab, "page agent deregistered");
        }
    }

    /// Sends one request to the tab's agent and waits up to `wait` for the
    /// reply. A dead mailbox and a dropped reply both count as no receiving
    /// end; only a live-but-silent agent is a timeout.
    pub async fn request(
        &self,
        tab: TabId,
        request: AgentRequest,
        wait: Duration,
    ) -> Result<AgentResponse, DeliveryError> {
        let mailbox = self
            .lock()
            .get(&tab)
            .cloned()
            .ok_or(DeliveryError::NoReceivingEnd(tab))?;

        let (reply_tx, reply_rx) = oneshot::channel();
        if mailbox
            .send(AgentEnvelope {
                request,
                reply: reply_tx,
            })
            .await
            .is_err()
        {
            // The agent task is gone; drop the stale registration so the
            // next sender skips straight to injection.
            self.deregister(tab);
            return Err(DeliveryError::NoReceivingEnd(tab));
        }

        match tokio::time::timeout(wait, reply_rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(DeliveryError::NoReceivingEnd(tab)),
            Err(_) => Err(DeliveryError::Timeout(tab)),
        }
    }
}

impl PageDirectory {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TabId, mpsc::Sender<AgentEnvelope>>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
