/* src/routes/core/rust/src/layout.rs */

use crate::mapping::{Component, RouteMapping};
use crate::path::segments;

pub const LAYOUT_SEGMENT: &str = "layout";

/// `/layout` and `<prefix>/layout` are layout keys, never navigable pages.
pub fn is_layout_path(pathname: &str) -> bool {
  segments(pathname).last() == Some(LAYOUT_SEGMENT)
}

/// Candidate layout keys for `pathname`, outermost first.
/// `/blog/post` -> `["/layout", "/blog/layout", "/blog/post/layout"]`.
pub fn layout_pathnames(pathname: &str) -> Vec<String> {
  let mut candidates = vec![format!("/{LAYOUT_SEGMENT}")];
  let mut prefix = String::new();
  for segment in segments(pathname) {
    prefix.push('/');
    prefix.push_str(segment);
    candidates.push(format!("{prefix}/{LAYOUT_SEGMENT}"));
  }
  candidates
}

/// Layouts that wrap `pathname`, root first. Missing levels are skipped.
pub fn resolve_layouts<'m, V>(
  pathname: &str,
  mapping: &'m RouteMapping<V>,
) -> Vec<&'m Component<V>> {
  layout_pathnames(pathname).iter().filter_map(|key| mapping.get(key)).collect()
}

/// Render `page` inside `layouts`; the first layout ends up outermost.
pub fn wrap_with_layouts<V>(layouts: &[&Component<V>], page: V) -> V {
  layouts.iter().rev().fold(page, |child, layout| layout(Some(child)))
}
