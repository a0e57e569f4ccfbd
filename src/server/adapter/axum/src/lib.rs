/* src/server/adapter/axum/src/lib.rs */

mod handler;
pub mod hub;
pub mod rebuild;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arbor_routes::{RoutesError, RoutesPlugin};
use tokio::net::TcpListener;
use tracing::info;

pub use hub::{HotReloadHub, SessionId, SessionPurpose};
pub use rebuild::{Published, RebuildOutcome, Rebuilder, RouteSource};

/// Re-export the route core for convenience
pub use arbor_routes;

#[derive(Debug, Clone, Default)]
pub struct DevServerOptions {
  pub hmr_enabled: bool,
  /// Contents of the `client:env` module
  pub env_module: String,
  /// Directory served for any path the dev endpoints do not own
  pub static_dir: Option<PathBuf>,
}

/// Dev server: serves the latest route module and manifest, and pushes
/// `update-routes` to hot-reload sessions after each rebuild.
pub struct DevServer {
  rebuilder: Arc<Rebuilder>,
  hub: Arc<HotReloadHub>,
  options: DevServerOptions,
}

impl DevServer {
  /// Performs the initial build.
  pub fn new(source: Arc<dyn RouteSource>, options: DevServerOptions) -> Result<Self, RoutesError> {
    let hub = Arc::new(HotReloadHub::new());
    let rebuilder = Arc::new(Rebuilder::initial(source, Arc::clone(&hub))?);
    Ok(Self { rebuilder, hub, options })
  }

  pub fn from_plugin(
    plugin: RoutesPlugin,
    static_dir: Option<PathBuf>,
  ) -> Result<Self, RoutesError> {
    let options = DevServerOptions {
      hmr_enabled: plugin.options().hmr_enabled,
      env_module: plugin.env_module(),
      static_dir,
    };
    Self::new(Arc::new(plugin), options)
  }

  pub fn rebuilder(&self) -> &Arc<Rebuilder> {
    &self.rebuilder
  }

  pub fn hub(&self) -> &Arc<HotReloadHub> {
    &self.hub
  }

  pub fn hmr_enabled(&self) -> bool {
    self.options.hmr_enabled
  }

  pub fn route_root(&self) -> &Path {
    self.rebuilder.root()
  }

  pub fn into_axum_router(&self) -> axum::Router {
    let state = Arc::new(handler::AppState {
      rebuilder: Arc::clone(&self.rebuilder),
      hub: Arc::clone(&self.hub),
      hmr_enabled: self.options.hmr_enabled,
      env_module: self.options.env_module.clone(),
    });
    handler::build_router(state, self.options.static_dir.clone())
  }

  pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
    let router = self.into_axum_router();
    let local_addr = listener.local_addr()?;
    info!(%local_addr, hmr = self.options.hmr_enabled, "dev server listening");
    axum::serve(listener, router).await
  }
}
