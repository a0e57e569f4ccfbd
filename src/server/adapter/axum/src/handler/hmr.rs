/* src/server/adapter/axum/src/handler/hmr.rs */

use std::sync::Arc;

use arbor_routes::protocol::HMR_SUBPROTOCOL;
use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tracing::debug;

use super::AppState;
use crate::hub::SessionPurpose;

/// `GET /_arbor/hmr`. Peers that offer the `arbor-hmr` subprotocol get route
/// update frames; any other upgrade is accepted and left idle.
pub(super) async fn handle_hmr(
  State(state): State<Arc<AppState>>,
  upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
  if !state.hmr_enabled {
    return (StatusCode::SERVICE_UNAVAILABLE, "HMR disabled").into_response();
  }
  let Ok(upgrade) = upgrade else {
    return (StatusCode::BAD_REQUEST, "upgrade failed").into_response();
  };
  upgrade.protocols([HMR_SUBPROTOCOL]).on_upgrade(move |socket| run_session(state, socket))
}

fn purpose_of(socket: &WebSocket) -> SessionPurpose {
  let negotiated = socket.protocol().is_some_and(|p| p.as_bytes() == HMR_SUBPROTOCOL.as_bytes());
  if negotiated { SessionPurpose::HotReload } else { SessionPurpose::Other }
}

async fn run_session(state: Arc<AppState>, mut socket: WebSocket) {
  let Some((id, mut frames)) = state.hub.open(purpose_of(&socket)) else {
    // Unregistered peer: drain until it leaves
    while let Some(Ok(message)) = socket.recv().await {
      if matches!(message, Message::Close(_)) {
        break;
      }
    }
    return;
  };

  let (mut ws_sender, mut ws_receiver) = socket.split();
  loop {
    tokio::select! {
      frame = frames.recv() => {
        let Some(frame) = frame else { break };
        if ws_sender.send(Message::Text(frame.into())).await.is_err() {
          break;
        }
      }
      message = ws_receiver.next() => {
        match message {
          Some(Ok(Message::Close(_)) | Err(_)) | None => break,
          // Hot-reload is push-only; inbound frames are ignored
          Some(Ok(_)) => continue,
        }
      }
    }
  }

  state.hub.close(id);
  debug!(session = id, "hot-reload socket finished");
}
