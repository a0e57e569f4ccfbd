/* src/cli/core/src/build.rs */

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use arbor_routes::{Environment, RoutesPlugin};

use crate::config::ArborConfig;
use crate::ui;

pub const ROUTE_MODULE_FILE: &str = "client-routes.js";
pub const MANIFEST_FILE: &str = "routes.json";

/// Write the synthesized route module and its manifest into `out_dir`.
pub fn write_outputs(out_dir: &Path, module: &str, manifest_json: &str) -> Result<()> {
  std::fs::create_dir_all(out_dir)
    .with_context(|| format!("failed to create {}", out_dir.display()))?;
  let module_path = out_dir.join(ROUTE_MODULE_FILE);
  std::fs::write(&module_path, module)
    .with_context(|| format!("failed to write {}", module_path.display()))?;
  let manifest_path = out_dir.join(MANIFEST_FILE);
  std::fs::write(&manifest_path, manifest_json)
    .with_context(|| format!("failed to write {}", manifest_path.display()))?;
  Ok(())
}

pub fn run_build(config: &ArborConfig, base_dir: &Path) -> Result<()> {
  let started = Instant::now();
  let env = Environment::from_process();
  let plugin = RoutesPlugin::new(config.plugin_options(base_dir, env));

  ui::banner("build");
  ui::arrow(&format!("scanning {}", plugin.route_dir().display()));
  let routes = plugin
    .build()
    .with_context(|| format!("failed to build routes in {}", plugin.route_dir().display()))?;
  let manifest_json = routes.manifest.to_json().context("failed to render route manifest")?;

  let out_dir = config.out_dir(base_dir);
  write_outputs(&out_dir, &routes.module, &manifest_json)?;

  for (pathname, entry) in &routes.manifest.routes {
    ui::detail(&format!("{pathname:<28} {}", entry.source));
  }
  ui::arrow("entrypoints");
  for entry in plugin.entrypoints() {
    ui::detail(&entry);
  }
  ui::ok(&format!(
    "{} routes -> {} ({:.1}s)",
    routes.len(),
    out_dir.display(),
    started.elapsed().as_secs_f64()
  ));
  Ok(())
}
