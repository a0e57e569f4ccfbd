/* src/routes/core/rust/src/synth.rs */

// Route module synthesis: one import per route file through the `original:`
// namespace, then a single default-exported pathname -> component object.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::fnv::path_hash;
use crate::manifest::{ManifestEntry, RouteManifest};
use crate::table::RouteTable;

/// Namespace prefix that routes imports through the server-only stripper.
pub const ORIGINAL_PREFIX: &str = "original:";

const HEADER: &str = "// Generated by arbor from the route directory. Do not edit.\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedRoutes {
  /// JS module source for the `client:routes` virtual module
  pub module: String,
  pub manifest: RouteManifest,
}

impl SynthesizedRoutes {
  pub fn len(&self) -> usize {
    self.manifest.routes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.manifest.routes.is_empty()
  }
}

/// Emit the route module and manifest for `table`.
/// The output depends only on the table, so regenerating an unchanged table is byte-identical.
pub fn synthesize(table: &RouteTable) -> SynthesizedRoutes {
  let mut imports = String::new();
  let mut object = String::new();
  let mut routes = BTreeMap::new();

  for (pathname, source) in table.iter() {
    let relative = table.relative_source(source);
    let ident = component_ident(&relative);
    let specifier = format!("{ORIGINAL_PREFIX}{}", source.to_string_lossy().replace('\\', "/"));

    let _ = writeln!(imports, "import {{ default as {ident} }} from {};", js_string(&specifier));
    let _ = writeln!(object, "  {}: {ident},", js_string(pathname));
    routes.insert(pathname.to_string(), ManifestEntry { component: ident, source: relative });
  }

  let mut module = String::from(HEADER);
  module.push_str(&imports);
  if !imports.is_empty() {
    module.push('\n');
  }
  if object.is_empty() {
    module.push_str("const routes = {};\n");
  } else {
    module.push_str("const routes = {\n");
    module.push_str(&object);
    module.push_str("};\n");
  }
  module.push_str("\nexport default routes;\n");

  SynthesizedRoutes { module, manifest: RouteManifest::new(routes) }
}

/// Stable JS identifier for a route file: sanitized relative path plus an FNV-1a suffix.
/// `blog/[slug].tsx` -> `blog__slug__tsx_<hash>`.
pub fn component_ident(relative: &str) -> String {
  let mut ident: String = relative
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
    .collect();
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, '_');
  }
  let _ = write!(ident, "_{}", path_hash(relative));
  ident
}

/// Double-quoted JS string literal (JSON string syntax is a subset of JS).
pub(crate) fn js_string(value: &str) -> String {
  serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;
  use crate::table::RouteEntry;

  fn table(entries: &[(&str, &str)]) -> RouteTable {
    RouteTable::from_entries(
      "/app/pages",
      entries.iter().map(|(p, s)| RouteEntry {
        pathname: (*p).to_string(),
        source: PathBuf::from(format!("/app/pages/{s}")),
      }),
    )
    .unwrap()
  }

  #[test]
  fn imports_through_original_namespace() {
    let out = synthesize(&table(&[("/", "index.tsx"), ("/about", "about.tsx")]));
    let home = component_ident("index.tsx");
    let about = component_ident("about.tsx");
    assert!(out.module.contains(&format!(
      "import {{ default as {home} }} from \"original:/app/pages/index.tsx\";"
    )));
    assert!(out.module.contains(&format!("  \"/about\": {about},")));
    assert!(out.module.ends_with("export default routes;\n"));
  }

  #[test]
  fn output_is_deterministic() {
    let t = table(&[
      ("/blog/layout", "blog/layout.tsx"),
      ("/", "index.tsx"),
      ("/blog", "blog/index.tsx"),
    ]);
    let first = synthesize(&t);
    let second = synthesize(&t.clone());
    assert_eq!(first.module.as_bytes(), second.module.as_bytes());
    assert_eq!(first.manifest, second.manifest);
  }

  #[test]
  fn routes_are_emitted_in_pathname_order() {
    let out =
      synthesize(&table(&[("/zoo", "zoo.tsx"), ("/", "index.tsx"), ("/about", "about.tsx")]));
    let root = out.module.find("  \"/\":").unwrap();
    let about = out.module.find("  \"/about\":").unwrap();
    let zoo = out.module.find("  \"/zoo\":").unwrap();
    assert!(root < about && about < zoo);
  }

  #[test]
  fn empty_table_exports_empty_object() {
    let out = synthesize(&table(&[]));
    assert!(out.module.contains("const routes = {};"));
    assert!(!out.module.contains("import"));
    assert!(out.is_empty());
  }

  #[test]
  fn identifiers_do_not_collide_on_lookalike_names() {
    assert_ne!(component_ident("a-b.tsx"), component_ident("a_b.tsx"));
    assert_ne!(component_ident("a b.tsx"), component_ident("a.b.tsx"));
  }

  #[test]
  fn identifiers_are_valid_js() {
    let ident = component_ident("404/[slug] page.tsx");
    assert!(ident.starts_with("_404__slug__page_tsx_"));
    assert!(ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$'));
  }

  #[test]
  fn manifest_mirrors_module() {
    let out = synthesize(&table(&[("/", "index.tsx"), ("/about/layout", "about/layout.tsx")]));
    let entry = &out.manifest.routes["/about/layout"];
    assert_eq!(entry.source, "about/layout.tsx");
    assert!(out.module.contains(&entry.component));
  }

  #[test]
  fn pathnames_are_escaped() {
    let out = synthesize(&table(&[("/say\"hi\"", "hi.tsx")]));
    assert!(out.module.contains(r#"  "/say\"hi\"": "#));
  }
}
