/* src/routes/core/rust/src/manifest.rs */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, RoutesError};

pub const MANIFEST_VERSION: u32 = 1;

/// Machine-readable twin of the synthesized route module.
/// Typed clients rebuild their route mapping from this instead of evaluating JS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifest {
  pub version: u32,
  pub routes: BTreeMap<String, ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
  /// Generated identifier the route module binds the default export to
  pub component: String,
  /// Source file relative to the route root
  pub source: String,
}

impl RouteManifest {
  pub fn new(routes: BTreeMap<String, ManifestEntry>) -> Self {
    Self { version: MANIFEST_VERSION, routes }
  }

  /// Parse a manifest body. A version other than [`MANIFEST_VERSION`] is rejected.
  pub fn from_json(text: &str) -> Result<Self> {
    let manifest: Self = serde_json::from_str(text)?;
    if manifest.version != MANIFEST_VERSION {
      return Err(RoutesError::ManifestVersion {
        found: manifest.version,
        expected: MANIFEST_VERSION,
      });
    }
    Ok(manifest)
  }

  pub fn to_json(&self) -> Result<String> {
    let mut out = serde_json::to_string_pretty(self)?;
    out.push('\n');
    Ok(out)
  }
}
