/* src/routes/client/rust/src/hmr.rs */

// Hot-reload client: listens on the dev server's update channel and, on each
// `update-routes` frame, refetches the route manifest with a cache-buster.

use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

use arbor_routes::RouteManifest;
use arbor_routes::protocol::{
  CACHE_BUST_PARAM, HMR_ENDPOINT, HMR_SUBPROTOCOL, ROUTES_MANIFEST_PATH, UPDATE_ROUTES,
};
use futures_util::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tracing::{debug, info};
use url::Url;

use crate::error::ClientError;

/// `url` with `t=<millis>` appended so intermediaries never serve a stale manifest.
pub fn cache_busted(url: &Url, millis: u128) -> Url {
  let mut busted = url.clone();
  busted.query_pairs_mut().append_pair(CACHE_BUST_PARAM, &millis.to_string());
  busted
}

/// Manifest URL for a dev server origin (`http://localhost:3000`).
pub fn manifest_url(origin: &Url) -> Result<Url, ClientError> {
  Ok(origin.join(ROUTES_MANIFEST_PATH)?)
}

/// WebSocket URL of the hot-reload endpoint for a dev server origin.
pub fn hmr_url(origin: &Url) -> Result<Url, ClientError> {
  let mut url = origin.join(HMR_ENDPOINT)?;
  let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
  // http(s) -> ws(s) is always a valid scheme change
  let _ = url.set_scheme(scheme);
  Ok(url)
}

fn now_millis() -> u128 {
  SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Fetches the manifest body. The HTTP client in production, a fake in tests.
pub trait ManifestFetcher {
  fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, ClientError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
  client: reqwest::Client,
}

impl ReqwestFetcher {
  pub fn new(client: reqwest::Client) -> Self {
    Self { client }
  }
}

impl ManifestFetcher for ReqwestFetcher {
  async fn fetch(&self, url: &Url) -> Result<String, ClientError> {
    let fetch_err =
      |e: reqwest::Error| ClientError::Fetch { url: url.to_string(), reason: e.to_string() };
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .and_then(reqwest::Response::error_for_status)
      .map_err(fetch_err)?;
    response.text().await.map_err(fetch_err)
  }
}

pub struct HmrClient<F> {
  manifest_url: Url,
  fetcher: F,
}

impl<F: ManifestFetcher> HmrClient<F> {
  pub fn new(manifest_url: Url, fetcher: F) -> Self {
    Self { manifest_url, fetcher }
  }

  /// React to one text frame. Frames other than `update-routes` yield `Ok(None)`.
  pub async fn handle_message(&self, text: &str) -> Result<Option<RouteManifest>, ClientError> {
    if text != UPDATE_ROUTES {
      debug!(frame = text, "ignoring hot-reload frame");
      return Ok(None);
    }
    let url = cache_busted(&self.manifest_url, now_millis());
    let body = self.fetcher.fetch(&url).await?;
    let manifest = RouteManifest::from_json(&body)?;
    info!(routes = manifest.routes.len(), "route manifest refetched");
    Ok(Some(manifest))
  }

  /// Drive `frames` until the channel closes. Each update (or its fetch/shape error)
  /// is handed to `on_update` and awaited before the next frame is read.
  pub async fn run<S, C, Fut>(&self, frames: S, mut on_update: C) -> Result<(), ClientError>
  where
    S: Stream<Item = Result<String, ClientError>>,
    C: FnMut(Result<RouteManifest, ClientError>) -> Fut,
    Fut: Future<Output = ()>,
  {
    let mut frames = std::pin::pin!(frames);
    while let Some(frame) = frames.next().await {
      match self.handle_message(&frame?).await {
        Ok(Some(manifest)) => on_update(Ok(manifest)).await,
        Ok(None) => {}
        Err(err) => on_update(Err(err)).await,
      }
    }
    debug!("hot-reload channel closed");
    Ok(())
  }
}

/// Open the hot-reload channel, offering the `arbor-hmr` subprotocol so the
/// server registers this session. Yields text frames until the server closes.
pub async fn connect(
  url: &Url,
) -> Result<impl Stream<Item = Result<String, ClientError>> + use<>, ClientError> {
  let mut request = url.as_str().into_client_request()?;
  request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(HMR_SUBPROTOCOL));
  let (socket, _response) = tokio_tungstenite::connect_async(request).await?;
  info!(%url, "hot-reload channel open");
  Ok(socket.filter_map(|message| async move {
    match message {
      Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
      Ok(_) => None,
      Err(err) => Some(Err(ClientError::from(err))),
    }
  }))
}
