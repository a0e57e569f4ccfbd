/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::types::ArborConfig;

pub const CONFIG_FILE: &str = "arbor.toml";

/// Walk upward from `start` until a directory holding `arbor.toml` is found.
pub fn find_arbor_config(start: &Path) -> Result<PathBuf> {
  for dir in start.ancestors() {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.is_file() {
      return Ok(candidate);
    }
  }
  bail!("no {CONFIG_FILE} found in {} or any parent directory", start.display());
}

pub fn load_arbor_config(path: &Path) -> Result<ArborConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let config: ArborConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  config.validate().with_context(|| format!("invalid config in {}", path.display()))?;
  Ok(config)
}

/// Resolve `--config` (or discovery from `cwd`) to the config and its project root.
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<(ArborConfig, PathBuf)> {
  let path = match explicit {
    Some(path) => cwd.join(path),
    None => find_arbor_config(cwd)?,
  };
  let config = load_arbor_config(&path)?;
  let base_dir = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
  Ok((config, base_dir))
}
