/* src/routes/core/rust/src/mapping.rs */

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::errors::{Result, RoutesError};
use crate::layout::is_layout_path;
use crate::manifest::RouteManifest;
use crate::path::normalize;
use crate::synth::component_ident;

/// Component factory. Pages are called with `None`; layouts receive the child subtree.
pub type Component<V> = Arc<dyn Fn(Option<V>) -> V + Send + Sync>;

/// Pathname -> component factory. Keys are stored normalized.
pub struct RouteMapping<V> {
  routes: BTreeMap<String, Component<V>>,
}

impl<V> RouteMapping<V> {
  pub fn new() -> Self {
    Self { routes: BTreeMap::new() }
  }

  pub fn insert(&mut self, pathname: &str, component: Component<V>) -> Option<Component<V>> {
    self.routes.insert(normalize(pathname), component)
  }

  /// Builder form of [`insert`](Self::insert).
  pub fn with<F>(mut self, pathname: &str, component: F) -> Self
  where
    F: Fn(Option<V>) -> V + Send + Sync + 'static,
  {
    self.insert(pathname, Arc::new(component));
    self
  }

  /// Raw lookup; layouts included.
  pub fn get(&self, pathname: &str) -> Option<&Component<V>> {
    self.routes.get(&normalize(pathname))
  }

  /// Lookup restricted to navigable pages.
  pub fn page(&self, pathname: &str) -> Option<&Component<V>> {
    let key = normalize(pathname);
    if is_layout_path(&key) {
      return None;
    }
    self.routes.get(&key)
  }

  pub fn contains_page(&self, pathname: &str) -> bool {
    self.page(pathname).is_some()
  }

  pub fn pathnames(&self) -> impl Iterator<Item = &str> {
    self.routes.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.routes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.routes.is_empty()
  }

  /// Rebuild a mapping from a route manifest, resolving each generated identifier
  /// through `registry`. Fails on the first identifier the registry does not know.
  pub fn from_manifest(manifest: &RouteManifest, registry: &ComponentRegistry<V>) -> Result<Self> {
    let mut mapping = Self::new();
    for (pathname, entry) in &manifest.routes {
      let component = registry.get(&entry.component).ok_or_else(|| {
        RoutesError::UnknownComponent {
          pathname: pathname.clone(),
          component: entry.component.clone(),
        }
      })?;
      mapping.insert(pathname, Arc::clone(component));
    }
    Ok(mapping)
  }
}

impl<V> Default for RouteMapping<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V> Clone for RouteMapping<V> {
  fn clone(&self) -> Self {
    Self { routes: self.routes.clone() }
  }
}

impl<V> fmt::Debug for RouteMapping<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.routes.keys()).finish()
  }
}

/// Components a typed client links in, keyed by the identifier the route
/// module generates for their source file.
pub struct ComponentRegistry<V> {
  components: HashMap<String, Component<V>>,
}

impl<V> ComponentRegistry<V> {
  pub fn new() -> Self {
    Self { components: HashMap::new() }
  }

  pub fn register<F>(&mut self, ident: impl Into<String>, component: F) -> &mut Self
  where
    F: Fn(Option<V>) -> V + Send + Sync + 'static,
  {
    self.components.insert(ident.into(), Arc::new(component));
    self
  }

  /// Register by source path relative to the route root, e.g. `about/layout.tsx`.
  pub fn register_source<F>(&mut self, relative: &str, component: F) -> &mut Self
  where
    F: Fn(Option<V>) -> V + Send + Sync + 'static,
  {
    self.register(component_ident(relative), component)
  }

  pub fn get(&self, ident: &str) -> Option<&Component<V>> {
    self.components.get(ident)
  }

  pub fn len(&self) -> usize {
    self.components.len()
  }

  pub fn is_empty(&self) -> bool {
    self.components.is_empty()
  }
}

impl<V> Default for ComponentRegistry<V> {
  fn default() -> Self {
    Self::new()
  }
}
