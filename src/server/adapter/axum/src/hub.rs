/* src/server/adapter/axum/src/hub.rs */

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

pub type SessionId = u64;

/// What a WebSocket peer negotiated at upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPurpose {
  HotReload,
  Other,
}

/// Registry of connected hot-reload sessions.
#[derive(Debug, Default)]
pub struct HotReloadHub {
  next_id: AtomicU64,
  sessions: Mutex<HashMap<SessionId, UnboundedSender<String>>>,
}

impl HotReloadHub {
  pub fn new() -> Self {
    Self::default()
  }

  fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, UnboundedSender<String>>> {
    self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Register a session. Only hot-reload peers are registered; others get `None`.
  pub fn open(&self, purpose: SessionPurpose) -> Option<(SessionId, UnboundedReceiver<String>)> {
    if purpose != SessionPurpose::HotReload {
      debug!("websocket peer did not negotiate hot reload; not registered");
      return None;
    }
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let (tx, rx) = unbounded_channel();
    self.sessions().insert(id, tx);
    debug!(session = id, "hot-reload session opened");
    Some((id, rx))
  }

  pub fn close(&self, id: SessionId) {
    if self.sessions().remove(&id).is_some() {
      debug!(session = id, "hot-reload session closed");
    }
  }

  /// Queue `frame` for every session. Returns how many accepted it; closed sessions are pruned.
  pub fn broadcast(&self, frame: &str) -> usize {
    let mut sessions = self.sessions();
    let before = sessions.len();
    sessions.retain(|id, tx| {
      let delivered = tx.send(frame.to_string()).is_ok();
      if !delivered {
        warn!(session = id, "dropping closed hot-reload session");
      }
      delivered
    });
    debug!(sessions = sessions.len(), pruned = before - sessions.len(), frame, "broadcast");
    sessions.len()
  }

  pub fn len(&self) -> usize {
    self.sessions().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
