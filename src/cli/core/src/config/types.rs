/* src/cli/core/src/config/types.rs */

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use arbor_routes::{Environment, HydrationStrategy, PluginOptions, RoutingStyle};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ArborConfig {
  pub project: ProjectConfig,
  #[serde(default)]
  pub routes: RoutesSection,
  #[serde(default)]
  pub client: ClientSection,
  #[serde(default)]
  pub dev: DevSection,
  #[serde(default)]
  pub build: BuildSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
  pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutesSection {
  #[serde(default)]
  pub style: RoutingStyle,
  #[serde(default = "default_route_dir")]
  pub dir: String,
  #[serde(default = "arbor_routes::default_extensions")]
  pub extensions: Vec<String>,
}

impl Default for RoutesSection {
  fn default() -> Self {
    Self {
      style: RoutingStyle::default(),
      dir: default_route_dir(),
      extensions: arbor_routes::default_extensions(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
  /// Custom client shell; the built-in router host is used when unset
  pub shell: Option<String>,
  #[serde(default = "default_entry")]
  pub entry: String,
  #[serde(default)]
  pub hydration: HydrationStrategy,
}

impl Default for ClientSection {
  fn default() -> Self {
    Self { shell: None, entry: default_entry(), hydration: HydrationStrategy::default() }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DevSection {
  #[serde(default = "default_port")]
  pub port: u16,
  /// Unset means "follow NODE_ENV"
  pub hmr: Option<bool>,
}

impl Default for DevSection {
  fn default() -> Self {
    Self { port: default_port(), hmr: None }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
  #[serde(default = "default_out_dir")]
  pub out_dir: String,
}

impl Default for BuildSection {
  fn default() -> Self {
    Self { out_dir: default_out_dir() }
  }
}

fn default_route_dir() -> String {
  "src/pages".to_string()
}

fn default_entry() -> String {
  arbor_routes::plugin::DEFAULT_HYDRATE_ENTRY.to_string()
}

fn default_port() -> u16 {
  3000
}

fn default_out_dir() -> String {
  ".arbor".to_string()
}

impl ArborConfig {
  pub fn validate(&self) -> Result<()> {
    if self.routes.dir.trim().is_empty() {
      bail!("routes.dir must not be empty");
    }
    if self.routes.extensions.is_empty() {
      bail!("routes.extensions must list at least one extension");
    }
    if let Some(ext) = self.routes.extensions.iter().find(|ext| !ext.starts_with('.')) {
      bail!("routes.extensions entry \"{ext}\" must start with '.'");
    }
    if self.client.entry.trim().is_empty() {
      bail!("client.entry must not be empty");
    }
    Ok(())
  }

  pub fn hmr_enabled(&self, env: Environment) -> bool {
    self.dev.hmr.unwrap_or(!env.is_production())
  }

  /// Plugin options for a project rooted at `base_dir`. The hydration entry stays
  /// project-relative since the host bundler runs from the project root.
  pub fn plugin_options(&self, base_dir: &Path, env: Environment) -> PluginOptions {
    let mut options = PluginOptions::new(base_dir.join(&self.routes.dir), env);
    options.style = self.routes.style;
    options.extensions.clone_from(&self.routes.extensions);
    options.client_shell = self.client.shell.as_ref().map(|shell| base_dir.join(shell));
    options.hydrate_entry = PathBuf::from(&self.client.entry);
    options.hydration = self.client.hydration;
    options.hmr_enabled = self.hmr_enabled(env);
    options
  }

  pub fn out_dir(&self, base_dir: &Path) -> PathBuf {
    base_dir.join(&self.build.out_dir)
  }
}
