/* src/routes/client/rust/src/error.rs */

use arbor_routes::RoutesError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ClientError {
  /// No page is registered for the pathname. Surfaced to the renderer, never a blank page.
  #[error("no route for \"{0}\"")]
  RouteNotFound(String),

  #[error("failed to fetch route manifest from {url}: {reason}")]
  Fetch { url: String, reason: String },

  /// Manifest body did not parse, or named a component this client does not link.
  #[error(transparent)]
  Manifest(#[from] RoutesError),

  #[error("invalid url: {0}")]
  Url(#[from] url::ParseError),

  #[error("hot-reload transport: {0}")]
  Transport(#[source] Box<tungstenite::Error>),
}

impl From<tungstenite::Error> for ClientError {
  fn from(err: tungstenite::Error) -> Self {
    Self::Transport(Box::new(err))
  }
}
