/* src/server/adapter/axum/src/handler/modules.rs */

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};

use super::AppState;

const JS_CONTENT_TYPE: &str = "text/javascript; charset=utf-8";
const JSON_CONTENT_TYPE: &str = "application/json";
pub(super) const GENERATION_HEADER: &str = "x-arbor-generation";

fn module_response(content_type: &'static str, generation: Option<u64>, body: String) -> Response {
  let headers = [
    (CONTENT_TYPE, HeaderValue::from_static(content_type)),
    (CACHE_CONTROL, HeaderValue::from_static("no-cache")),
  ];
  let mut response = (headers, body).into_response();
  if let Some(generation) = generation {
    response
      .headers_mut()
      .insert(HeaderName::from_static(GENERATION_HEADER), HeaderValue::from(generation));
  }
  response
}

/// `/routes/client:routes.js`: the synthesized route module of the latest generation.
pub(super) async fn handle_routes_module(State(state): State<Arc<AppState>>) -> Response {
  let published = state.rebuilder.published();
  module_response(JS_CONTENT_TYPE, Some(published.generation), published.routes.module.clone())
}

pub(super) async fn handle_routes_manifest(State(state): State<Arc<AppState>>) -> Response {
  let published = state.rebuilder.published();
  module_response(JSON_CONTENT_TYPE, Some(published.generation), published.manifest_json.clone())
}

pub(super) async fn handle_env_module(State(state): State<Arc<AppState>>) -> Response {
  module_response(JS_CONTENT_TYPE, None, state.env_module.clone())
}
