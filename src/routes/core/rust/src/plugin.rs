/* src/routes/core/rust/src/plugin.rs */

// Resolve/load hooks a host bundler drives: the fixed set of virtual client
// modules plus the `original:` indirection that routes page files through the
// server-only stripper.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, RoutesError};
use crate::protocol::{HMR_ENDPOINT, ROUTES_MANIFEST_PATH, ROUTES_MODULE_PATH};
use crate::server_only;
use crate::synth::{ORIGINAL_PREFIX, SynthesizedRoutes, js_string, synthesize};
use crate::table::{RouteTable, RoutingStyle, default_extensions};

pub const SHELL_SPECIFIER: &str = "client:shell";
pub const ROUTES_SPECIFIER: &str = "client:routes";
pub const ENV_SPECIFIER: &str = "client:env";

/// Entrypoint the host build emits the route module under.
pub const ROUTES_ENTRYPOINT: &str = "routes/client:routes";

pub const DEFAULT_HYDRATE_ENTRY: &str = "src/hydrate.tsx";

/// Shell used when the project does not configure one: the router host with no chrome.
pub const DEFAULT_SHELL_SOURCE: &str = r#"import { RouterHost } from "arbor/router";

export default function Shell({ children }) {
  return <RouterHost>{children}</RouterHost>;
}
"#;

pub const RUNTIME_ENTRYPOINTS: &[&str] = &["react", "react-dom"];

/// Development builds of the UI runtime, bundled so hot reloads keep readable stacks.
pub const DEV_RUNTIME_ENTRYPOINTS: &[&str] = &[
  "node_modules/react/cjs/react-jsx-dev-runtime.development.js",
  "node_modules/react/jsx-dev-runtime.js",
  "node_modules/react/cjs/react.development.js",
  "node_modules/react-dom/cjs/react-dom.development.js",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
  #[default]
  Development,
  Production,
}

impl Environment {
  /// Anything but `production` counts as development.
  pub fn from_node_env(value: Option<&str>) -> Self {
    match value {
      Some("production") => Self::Production,
      _ => Self::Development,
    }
  }

  pub fn from_process() -> Self {
    Self::from_node_env(std::env::var("NODE_ENV").ok().as_deref())
  }

  pub fn is_production(self) -> bool {
    self == Self::Production
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HydrationStrategy {
  /// Attach to server-rendered markup
  #[default]
  Hydrate,
}

#[derive(Debug, Clone)]
pub struct PluginOptions {
  /// Absolute route directory
  pub route_dir: PathBuf,
  pub style: RoutingStyle,
  pub extensions: Vec<String>,
  pub client_shell: Option<PathBuf>,
  pub hydrate_entry: PathBuf,
  pub hydration: HydrationStrategy,
  pub hmr_enabled: bool,
  pub env: Environment,
}

impl PluginOptions {
  /// Defaults for `route_dir`; hot reload follows the environment.
  pub fn new(route_dir: impl Into<PathBuf>, env: Environment) -> Self {
    Self {
      route_dir: route_dir.into(),
      style: RoutingStyle::default(),
      extensions: default_extensions(),
      client_shell: None,
      hydrate_entry: PathBuf::from(DEFAULT_HYDRATE_ENTRY),
      hydration: HydrationStrategy::default(),
      hmr_enabled: !env.is_production(),
      env,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellModule {
  Custom(PathBuf),
  Default,
}

/// What a specifier resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
  Shell(ShellModule),
  Routes,
  Env,
  /// Mangled `<dir>/_<stem>_.<ext>` path; see [`demangle_original`]
  Original(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
  Js,
  Jsx,
  Ts,
  Tsx,
}

impl Loader {
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|e| e.to_str()) {
      Some("js" | "mjs" | "cjs") => Self::Js,
      Some("jsx") => Self::Jsx,
      Some("ts" | "mts" | "cts") => Self::Ts,
      _ => Self::Tsx,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Js => "js",
      Self::Jsx => "jsx",
      Self::Ts => "ts",
      Self::Tsx => "tsx",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
  pub contents: String,
  pub loader: Loader,
}

/// `/app/pages/about.tsx` -> `/app/pages/_about_.tsx`.
/// Mangled names never collide with real page files, so other loaders leave them alone.
pub fn mangle_original(path: &Path) -> PathBuf {
  let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
  let name = match path.extension() {
    Some(ext) => format!("_{stem}_.{}", ext.to_string_lossy()),
    None => format!("_{stem}_"),
  };
  path.with_file_name(name)
}

/// Inverse of [`mangle_original`]; `None` for paths it did not produce.
pub fn demangle_original(mangled: &Path) -> Option<PathBuf> {
  let stem = mangled.file_stem()?.to_str()?;
  let inner = stem.strip_prefix('_')?.strip_suffix('_')?;
  if inner.is_empty() {
    return None;
  }
  let name = match mangled.extension() {
    Some(ext) => format!("{inner}.{}", ext.to_str()?),
    None => inner.to_string(),
  };
  Some(mangled.with_file_name(name))
}

pub struct RoutesPlugin {
  options: PluginOptions,
}

impl RoutesPlugin {
  pub fn new(options: PluginOptions) -> Self {
    Self { options }
  }

  pub fn options(&self) -> &PluginOptions {
    &self.options
  }

  pub fn route_dir(&self) -> &Path {
    &self.options.route_dir
  }

  pub fn build_table(&self) -> Result<RouteTable> {
    match self.options.style {
      RoutingStyle::NextJs => RouteTable::build(&self.options.route_dir, &self.options.extensions),
    }
  }

  /// Full build: walk the route directory, check every server-only page can be
  /// stubbed, then synthesize the route module.
  pub fn build(&self) -> Result<SynthesizedRoutes> {
    let table = self.build_table()?;
    Self::prepare(&table)?;
    Ok(synthesize(&table))
  }

  /// Run the stripper over every route file so a malformed server-only page
  /// fails the build instead of the first client load.
  pub fn prepare(table: &RouteTable) -> Result<()> {
    for (_, source) in table.iter() {
      if server_only::is_js_path(source) {
        server_only::strip_file(source)?;
      }
    }
    Ok(())
  }

  /// `None` for specifiers this plugin does not own.
  pub fn resolve(&self, specifier: &str) -> Option<Resolved> {
    if let Some(path) = specifier.strip_prefix(ORIGINAL_PREFIX) {
      return Some(Resolved::Original(mangle_original(Path::new(path))));
    }
    if specifier == SHELL_SPECIFIER {
      let shell = match &self.options.client_shell {
        Some(path) => ShellModule::Custom(path.clone()),
        None => ShellModule::Default,
      };
      return Some(Resolved::Shell(shell));
    }
    if specifier == ENV_SPECIFIER {
      return Some(Resolved::Env);
    }
    // Bare and entrypoint-relative forms (`routes/client:routes`)
    if specifier.ends_with(ROUTES_SPECIFIER) {
      return Some(Resolved::Routes);
    }
    None
  }

  pub fn load(&self, resolved: &Resolved, table: &RouteTable) -> Result<LoadedModule> {
    match resolved {
      Resolved::Shell(ShellModule::Custom(path)) => {
        let contents = std::fs::read_to_string(path)
          .map_err(|source| RoutesError::ReadFile { path: path.clone(), source })?;
        Ok(LoadedModule { contents, loader: Loader::from_path(path) })
      }
      Resolved::Shell(ShellModule::Default) => {
        Ok(LoadedModule { contents: DEFAULT_SHELL_SOURCE.to_string(), loader: Loader::Tsx })
      }
      Resolved::Routes => {
        Ok(LoadedModule { contents: synthesize(table).module, loader: Loader::Js })
      }
      Resolved::Env => Ok(LoadedModule { contents: self.env_module(), loader: Loader::Js }),
      Resolved::Original(mangled) => self.load_original(mangled),
    }
  }

  fn load_original(&self, mangled: &Path) -> Result<LoadedModule> {
    let path = demangle_original(mangled)
      .ok_or_else(|| RoutesError::InvalidOriginalPath(mangled.to_path_buf()))?;
    let contents = std::fs::read_to_string(&path)
      .map_err(|source| RoutesError::ReadFile { path: path.clone(), source })?;
    if !server_only::classify_source(&contents) {
      return Ok(LoadedModule { contents, loader: Loader::from_path(&path) });
    }
    debug!(path = %path.display(), "loading server-only module for the client");
    let contents = if server_only::is_js_path(&path) {
      server_only::strip(&contents, &path)?.into_owned()
    } else {
      String::new()
    };
    Ok(LoadedModule { contents, loader: Loader::Js })
  }

  /// `client:env`: flags the client runtime reads at startup.
  pub fn env_module(&self) -> String {
    let enabled = self.options.hmr_enabled;
    let mut out = String::new();
    let _ = writeln!(out, "globalThis.HMR_ENABLED = {enabled};");
    let _ = writeln!(out, "export const HMR_ENABLED = {enabled};");
    let _ = writeln!(out, "export const HMR_ENDPOINT = {};", js_string(HMR_ENDPOINT));
    let _ = writeln!(out, "export const ROUTES_MODULE = {};", js_string(ROUTES_MODULE_PATH));
    let _ = writeln!(out, "export const ROUTES_MANIFEST = {};", js_string(ROUTES_MANIFEST_PATH));
    out
  }

  /// Entrypoints contributed to the host build, in emission order.
  pub fn entrypoints(&self) -> Vec<String> {
    let mut entries = vec![self.options.hydrate_entry.to_string_lossy().into_owned()];
    if !self.options.env.is_production() {
      entries.extend(RUNTIME_ENTRYPOINTS.iter().map(|e| (*e).to_string()));
      entries.extend(DEV_RUNTIME_ENTRYPOINTS.iter().map(|e| (*e).to_string()));
    }
    entries.push(ROUTES_ENTRYPOINT.to_string());
    entries
  }

  /// Whether a filesystem event at `path` can affect the route table.
  pub fn watches(&self, path: &Path) -> bool {
    path.starts_with(&self.options.route_dir)
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  fn plugin(dir: &Path, env: Environment) -> RoutesPlugin {
    RoutesPlugin::new(PluginOptions::new(dir, env))
  }

  #[test]
  fn mangling_round_trips() {
    let real = Path::new("/app/pages/blog/post.client.tsx");
    let mangled = mangle_original(real);
    assert_eq!(mangled, Path::new("/app/pages/blog/_post.client_.tsx"));
    assert_eq!(demangle_original(&mangled).as_deref(), Some(real));
  }

  #[test]
  fn demangle_rejects_plain_paths() {
    assert_eq!(demangle_original(Path::new("/app/pages/about.tsx")), None);
    assert_eq!(demangle_original(Path::new("/app/pages/__.tsx")), None);
  }

  #[test]
  fn resolves_virtual_specifiers() {
    let p = plugin(Path::new("/app/pages"), Environment::Development);
    assert_eq!(p.resolve("client:shell"), Some(Resolved::Shell(ShellModule::Default)));
    assert_eq!(p.resolve("client:routes"), Some(Resolved::Routes));
    assert_eq!(p.resolve("routes/client:routes"), Some(Resolved::Routes));
    assert_eq!(p.resolve("client:env"), Some(Resolved::Env));
    assert_eq!(
      p.resolve("original:/app/pages/index.tsx"),
      Some(Resolved::Original(PathBuf::from("/app/pages/_index_.tsx")))
    );
    assert_eq!(p.resolve("react"), None);
  }

  #[test]
  fn custom_shell_wins() {
    let mut options = PluginOptions::new("/app/pages", Environment::Development);
    options.client_shell = Some(PathBuf::from("/app/src/client.tsx"));
    let p = RoutesPlugin::new(options);
    assert_eq!(
      p.resolve("client:shell"),
      Some(Resolved::Shell(ShellModule::Custom(PathBuf::from("/app/src/client.tsx"))))
    );
  }

  #[test]
  fn production_drops_dev_runtime() {
    let dev = plugin(Path::new("/app/pages"), Environment::Development).entrypoints();
    let prod = plugin(Path::new("/app/pages"), Environment::Production).entrypoints();
    assert_eq!(prod, vec![DEFAULT_HYDRATE_ENTRY.to_string(), ROUTES_ENTRYPOINT.to_string()]);
    assert_eq!(dev.len(), 2 + RUNTIME_ENTRYPOINTS.len() + DEV_RUNTIME_ENTRYPOINTS.len());
    assert_eq!(dev.last().map(String::as_str), Some(ROUTES_ENTRYPOINT));
  }

  #[test]
  fn hmr_follows_environment() {
    assert!(PluginOptions::new("/p", Environment::from_node_env(None)).hmr_enabled);
    assert!(PluginOptions::new("/p", Environment::from_node_env(Some("test"))).hmr_enabled);
    assert!(!PluginOptions::new("/p", Environment::from_node_env(Some("production"))).hmr_enabled);
  }

  #[test]
  fn env_module_reflects_flag() {
    let mut options = PluginOptions::new("/p", Environment::Production);
    assert!(RoutesPlugin::new(options.clone()).env_module().contains("HMR_ENABLED = false;"));
    options.hmr_enabled = true;
    let text = RoutesPlugin::new(options).env_module();
    assert!(text.starts_with("globalThis.HMR_ENABLED = true;\n"));
    assert!(text.contains("\"/_arbor/hmr\""));
  }

  #[test]
  fn load_original_strips_server_only_pages() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.tsx"), "export default function Home() {}\n").unwrap();
    fs::write(
      dir.path().join("admin.tsx"),
      "\"server-only\";\nexport default function Admin() { return secrets(); }\n",
    )
    .unwrap();
    let p = plugin(dir.path(), Environment::Development);
    let table = p.build_table().unwrap();

    let admin_path = dir.path().join("admin.tsx");
    let resolved = p.resolve(&format!("original:{}", admin_path.display())).unwrap();
    let admin = p.load(&resolved, &table).unwrap();
    assert_eq!(admin.loader, Loader::Js);
    assert!(!admin.contents.contains("secrets"));
    assert!(admin.contents.contains("__arbor_server_only(\"default\")"));

    let index_path = dir.path().join("index.tsx");
    let resolved = p.resolve(&format!("original:{}", index_path.display())).unwrap();
    let home = p.load(&resolved, &table).unwrap();
    assert_eq!(home.loader, Loader::Tsx);
    assert_eq!(home.contents, "export default function Home() {}\n");
  }

  #[test]
  fn load_routes_matches_synthesis() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.tsx"), "export default function Home() {}\n").unwrap();
    let p = plugin(dir.path(), Environment::Development);
    let table = p.build_table().unwrap();
    let loaded = p.load(&Resolved::Routes, &table).unwrap();
    assert_eq!(loaded.contents, p.build().unwrap().module);
  }

  #[test]
  fn build_fails_on_malformed_server_only_page() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.tsx"), "\"server-only\";\nexport * from \"./db\";\n").unwrap();
    let err = plugin(dir.path(), Environment::Development).build().unwrap_err();
    assert!(matches!(err, RoutesError::MalformedSource { .. }));
  }

  #[test]
  fn build_accepts_server_only_page_with_jsx_text() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.tsx"), "export default () => <h1>Home</h1>;\n").unwrap();
    let promo = "\"server-only\";\nconst re = /[}]/g;\nexport default function Promo({ items }) {\n  return <ul>Don't miss {items.map((i) => <li>{i}</li>)}</ul>;\n}\n";
    fs::write(dir.path().join("promo.tsx"), promo).unwrap();
    let built = plugin(dir.path(), Environment::Development).build().unwrap();
    assert_eq!(built.len(), 2);
  }

  #[test]
  fn watches_only_route_dir() {
    let p = plugin(Path::new("/app/pages"), Environment::Development);
    assert!(p.watches(Path::new("/app/pages/blog/post.tsx")));
    assert!(!p.watches(Path::new("/app/src/shell.tsx")));
    assert!(!p.watches(Path::new("/app/pages-old/index.tsx")));
  }
}
