/* src/routes/client/rust/src/router.rs */

use std::borrow::Cow;
use std::sync::Arc;

use arbor_routes::{
  ComponentRegistry, RouteManifest, RouteMapping, normalize, resolve_layouts, wrap_with_layouts,
};
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};
use url::Url;

use crate::error::ClientError;
use crate::host::{BrowserHost, ClickOutcome, LinkClick, PassReason, Renderer};

/// Client shell: wraps the composed page once, outside every layout.
pub type Shell<V> = Arc<dyn Fn(V) -> V + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
  Unhydrated,
  Hydrated,
  Navigating,
}

/// Client-side router. Owns its route mapping; hot reloads replace it wholesale.
pub struct Router<V, H, R> {
  mapping: RouteMapping<V>,
  shell: Shell<V>,
  host: H,
  renderer: R,
  state: RouterState,
}

impl<V, H, R> Router<V, H, R>
where
  H: BrowserHost,
  R: Renderer<V>,
{
  pub fn new(mapping: RouteMapping<V>, shell: Shell<V>, host: H, renderer: R) -> Self {
    Self { mapping, shell, host, renderer, state: RouterState::Unhydrated }
  }

  pub fn state(&self) -> RouterState {
    self.state
  }

  pub fn mapping(&self) -> &RouteMapping<V> {
    &self.mapping
  }

  pub fn host(&self) -> &H {
    &self.host
  }

  pub fn renderer(&self) -> &R {
    &self.renderer
  }

  /// Page for `pathname` inside its layouts, inside the shell.
  pub fn compose(&self, pathname: &str) -> Result<V, ClientError> {
    let pathname = normalize(pathname);
    let page = self
      .mapping
      .page(&pathname)
      .ok_or_else(|| ClientError::RouteNotFound(pathname.clone()))?;
    let layouts = resolve_layouts(&pathname, &self.mapping);
    Ok((self.shell)(wrap_with_layouts(&layouts, page(None))))
  }

  /// Attach to the server-rendered page at the current location.
  pub fn hydrate(&mut self) -> Result<(), ClientError> {
    let location = self.host.location();
    match self.compose(&decoded_path(&location)) {
      Ok(tree) => {
        self.renderer.hydrate(tree);
        self.state = RouterState::Hydrated;
        Ok(())
      }
      Err(err) => {
        self.renderer.show_error(&err);
        Err(err)
      }
    }
  }

  /// Decide whether a link click becomes a client navigation, and perform it if so.
  pub fn handle_click(&mut self, click: &LinkClick) -> ClickOutcome {
    let current = self.host.location();
    let target = match self.classify_click(click, &current) {
      Ok(target) => target,
      Err(reason) => {
        debug!(href = %click.href, ?reason, "link left to the browser");
        return ClickOutcome::PassThrough(reason);
      }
    };

    self.state = RouterState::Navigating;
    self.host.push_state(&target);
    // Already checked against the mapping; a failure has been shown by the renderer
    let _ = self.render_current(&decoded_path(&target));
    match target.fragment().filter(|f| !f.is_empty()) {
      Some(fragment) => {
        if !self.host.scroll_to_fragment(fragment) {
          self.host.scroll_to_top();
        }
      }
      None => self.host.scroll_to_top(),
    }
    self.state = RouterState::Hydrated;
    ClickOutcome::Intercepted
  }

  fn classify_click(&self, click: &LinkClick, current: &Url) -> Result<Url, PassReason> {
    if click.modifiers.any() {
      return Err(PassReason::Modified);
    }
    if click.button != crate::host::PRIMARY_BUTTON {
      return Err(PassReason::NonPrimaryButton);
    }
    if click.target.as_deref().is_some_and(|t| !t.is_empty() && t != "_self") {
      return Err(PassReason::Target);
    }
    if click.download {
      return Err(PassReason::Download);
    }
    let target = current.join(&click.href).map_err(|_| PassReason::InvalidHref)?;
    if target.origin() != current.origin() {
      return Err(PassReason::CrossOrigin);
    }
    if target.fragment().is_some()
      && target.path() == current.path()
      && target.query() == current.query()
    {
      return Err(PassReason::FragmentOnly);
    }
    if !self.mapping.contains_page(&decoded_path(&target)) {
      return Err(PassReason::UnknownRoute);
    }
    Ok(target)
  }

  /// Back/forward: re-render whatever the location now is, using the current mapping.
  pub fn handle_pop_state(&mut self) -> Result<(), ClientError> {
    let location = self.host.location();
    self.state = RouterState::Navigating;
    let result = self.render_current(&decoded_path(&location));
    self.state = RouterState::Hydrated;
    result
  }

  /// Swap in a rebuilt mapping and re-render the current pathname. History and scroll stay put.
  pub fn replace_routes(&mut self, mapping: RouteMapping<V>) -> Result<(), ClientError> {
    debug!(routes = mapping.len(), "replacing route mapping");
    self.mapping = mapping;
    let location = self.host.location();
    self.render_current(&decoded_path(&location))
  }

  /// Rebuild the mapping from a fetched manifest. On an unknown component the old mapping stays.
  pub fn apply_manifest(
    &mut self,
    manifest: &RouteManifest,
    registry: &ComponentRegistry<V>,
  ) -> Result<(), ClientError> {
    let mapping = RouteMapping::from_manifest(manifest, registry)?;
    self.replace_routes(mapping)
  }

  fn render_current(&mut self, pathname: &str) -> Result<(), ClientError> {
    match self.compose(pathname) {
      Ok(tree) => {
        self.renderer.commit(tree);
        Ok(())
      }
      Err(err) => {
        warn!(%pathname, "{err}");
        self.renderer.show_error(&err);
        Err(err)
      }
    }
  }
}

/// Route keys are plain text; `Url` keeps the path percent-encoded.
fn decoded_path(url: &Url) -> Cow<'_, str> {
  percent_decode_str(url.path()).decode_utf8().unwrap_or(Cow::Borrowed(url.path()))
}
