/* src/routes/core/rust/src/table.rs */

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, RoutesError};

/// File that maps to its directory's own path.
const INDEX_STEM: &str = "index";

/// Directory-to-path convention. Only the Next.js-style pages layout exists today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingStyle {
  #[default]
  #[serde(rename = "nextjs")]
  NextJs,
}

pub fn default_extensions() -> Vec<String> {
  vec![".tsx".to_string(), ".jsx".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
  pub pathname: String,
  pub source: PathBuf,
}

/// Immutable snapshot of the route directory, ordered by pathname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
  root: PathBuf,
  routes: BTreeMap<String, PathBuf>,
}

impl RouteTable {
  /// Walk `root` and map every file matching `extensions` to a pathname.
  pub fn build(root: &Path, extensions: &[String]) -> Result<Self> {
    let mut table = Self { root: root.to_path_buf(), routes: BTreeMap::new() };
    let mut segments = Vec::new();
    table.walk(root, &mut segments, extensions)?;
    debug!(root = %root.display(), routes = table.routes.len(), "route table built");
    Ok(table)
  }

  /// Assemble a table from known entries, applying the same duplicate check as `build`.
  pub fn from_entries(
    root: impl Into<PathBuf>,
    entries: impl IntoIterator<Item = RouteEntry>,
  ) -> Result<Self> {
    let mut table = Self { root: root.into(), routes: BTreeMap::new() };
    for entry in entries {
      table.insert(entry.pathname, entry.source)?;
    }
    Ok(table)
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn len(&self) -> usize {
    self.routes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.routes.is_empty()
  }

  pub fn get(&self, pathname: &str) -> Option<&Path> {
    self.routes.get(pathname).map(PathBuf::as_path)
  }

  /// Entries in pathname order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
    self.routes.iter().map(|(k, v)| (k.as_str(), v.as_path()))
  }

  pub fn entries(&self) -> Vec<RouteEntry> {
    self
      .iter()
      .map(|(pathname, source)| RouteEntry {
        pathname: pathname.to_string(),
        source: source.to_path_buf(),
      })
      .collect()
  }

  /// Source path relative to the table root, always `/`-separated.
  pub fn relative_source(&self, source: &Path) -> String {
    let rel = source.strip_prefix(&self.root).unwrap_or(source);
    rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
  }

  fn insert(&mut self, pathname: String, source: PathBuf) -> Result<()> {
    if let Some(first) = self.routes.get(&pathname) {
      return Err(RoutesError::DuplicateRoute { pathname, first: first.clone(), second: source });
    }
    self.routes.insert(pathname, source);
    Ok(())
  }

  fn walk(&mut self, dir: &Path, segments: &mut Vec<String>, extensions: &[String]) -> Result<()> {
    let read_err = |source| RoutesError::ReadDir { path: dir.to_path_buf(), source };
    let mut children = fs::read_dir(dir)
      .map_err(read_err)?
      .collect::<std::result::Result<Vec<_>, _>>()
      .map_err(read_err)?;
    // Sorted so duplicate errors name files in a stable order
    children.sort_by_key(fs::DirEntry::file_name);

    for child in children {
      let name = child.file_name().to_string_lossy().to_string();
      if name.starts_with('.') {
        continue;
      }
      let path = child.path();
      let file_type = child.file_type().map_err(read_err)?;

      if file_type.is_dir() {
        segments.push(name);
        self.walk(&path, segments, extensions)?;
        segments.pop();
        continue;
      }

      // Symlinked files are followed, symlinked directories are not
      let is_file = file_type.is_file() || (file_type.is_symlink() && path.is_file());
      if !is_file {
        continue;
      }
      let Some(stem) = strip_extension(&name, extensions) else {
        continue;
      };
      let pathname = route_pathname(segments, stem);
      debug!(%pathname, source = %path.display(), "route discovered");
      self.insert(pathname, path)?;
    }
    Ok(())
  }
}

/// `about.tsx` -> `about` when `.tsx` is an accepted extension.
fn strip_extension<'a>(name: &'a str, extensions: &[String]) -> Option<&'a str> {
  extensions.iter().find_map(|ext| name.strip_suffix(ext.as_str())).filter(|stem| !stem.is_empty())
}

/// Directory segments + file stem -> pathname (`index` collapses into its directory).
fn route_pathname(segments: &[String], stem: &str) -> String {
  let mut parts: Vec<&str> = segments.iter().map(String::as_str).collect();
  if stem != INDEX_STEM {
    parts.push(stem);
  }
  format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "export default function Page() {}\n").unwrap();
  }

  fn pathnames(table: &RouteTable) -> Vec<&str> {
    table.iter().map(|(p, _)| p).collect()
  }

  #[test]
  fn maps_directories_to_segments() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "index.tsx");
    touch(dir.path(), "about.tsx");
    touch(dir.path(), "layout.tsx");
    touch(dir.path(), "blog/index.jsx");
    touch(dir.path(), "blog/layout.tsx");
    touch(dir.path(), "blog/post.tsx");

    let table = RouteTable::build(dir.path(), &default_extensions()).unwrap();
    assert_eq!(
      pathnames(&table),
      vec!["/", "/about", "/blog", "/blog/layout", "/blog/post", "/layout"]
    );
    assert_eq!(table.get("/blog/post"), Some(dir.path().join("blog/post.tsx").as_path()));
  }

  #[test]
  fn ignores_foreign_extensions_and_hidden_entries() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "index.tsx");
    touch(dir.path(), "styles.css");
    touch(dir.path(), "util.ts");
    touch(dir.path(), ".draft.tsx");
    touch(dir.path(), ".cache/page.tsx");

    let table = RouteTable::build(dir.path(), &default_extensions()).unwrap();
    assert_eq!(pathnames(&table), vec!["/"]);
  }

  #[test]
  fn duplicate_pathname_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "about.tsx");
    touch(dir.path(), "about/index.tsx");

    let err = RouteTable::build(dir.path(), &default_extensions()).unwrap_err();
    assert!(
      matches!(err, RoutesError::DuplicateRoute { ref pathname, .. } if pathname == "/about")
    );
  }

  #[test]
  fn missing_root_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RouteTable::build(&dir.path().join("nope"), &default_extensions()).unwrap_err();
    assert!(matches!(err, RoutesError::ReadDir { .. }));
  }

  #[cfg(unix)]
  #[test]
  fn symlinked_directories_are_skipped() {
    let outside = tempfile::tempdir().unwrap();
    touch(outside.path(), "shared/page.tsx");
    touch(outside.path(), "contact.tsx");

    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "index.tsx");
    std::os::unix::fs::symlink(outside.path().join("shared"), dir.path().join("shared")).unwrap();
    std::os::unix::fs::symlink(outside.path().join("contact.tsx"), dir.path().join("contact.tsx"))
      .unwrap();

    let table = RouteTable::build(dir.path(), &default_extensions()).unwrap();
    assert_eq!(pathnames(&table), vec!["/", "/contact"]);
  }

  #[test]
  fn relative_source_uses_forward_slashes() {
    let table = RouteTable::from_entries(
      "/app/pages",
      [RouteEntry { pathname: "/blog".into(), source: PathBuf::from("/app/pages/blog/index.tsx") }],
    )
    .unwrap();
    assert_eq!(table.relative_source(Path::new("/app/pages/blog/index.tsx")), "blog/index.tsx");
  }

  #[test]
  fn style_parses_from_nextjs() {
    let style: RoutingStyle = serde_json::from_str("\"nextjs\"").unwrap();
    assert_eq!(style, RoutingStyle::NextJs);
    assert!(serde_json::from_str::<RoutingStyle>("\"remix\"").is_err());
  }
}
