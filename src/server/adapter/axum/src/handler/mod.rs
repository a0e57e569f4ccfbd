/* src/server/adapter/axum/src/handler/mod.rs */

mod hmr;
mod modules;

use std::path::PathBuf;
use std::sync::Arc;

use arbor_routes::protocol::{
  ENV_MODULE_PATH, HMR_ENDPOINT, ROUTES_MANIFEST_PATH, ROUTES_MODULE_PATH,
};
use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;

use crate::hub::HotReloadHub;
use crate::rebuild::Rebuilder;

pub(crate) struct AppState {
  pub rebuilder: Arc<Rebuilder>,
  pub hub: Arc<HotReloadHub>,
  pub hmr_enabled: bool,
  pub env_module: String,
}

pub(crate) fn build_router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
  let router = Router::new()
    .route(ROUTES_MODULE_PATH, get(modules::handle_routes_module))
    .route(ROUTES_MANIFEST_PATH, get(modules::handle_routes_manifest))
    .route(ENV_MODULE_PATH, get(modules::handle_env_module))
    .route(HMR_ENDPOINT, get(hmr::handle_hmr))
    .with_state(state);

  // Build output (hydration bundle, assets) is served as-is for everything else
  match static_dir {
    Some(dir) => router.fallback_service(ServeDir::new(dir)),
    None => router,
  }
}
