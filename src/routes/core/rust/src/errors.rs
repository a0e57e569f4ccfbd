/* src/routes/core/rust/src/errors.rs */

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = RoutesError> = std::result::Result<T, E>;

/// Build-time failures. Any of these aborts the current rebuild; callers keep
/// whatever route snapshot they published last.
#[derive(Debug, Error)]
pub enum RoutesError {
  #[error("failed to read route directory {}: {source}", path.display())]
  ReadDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read {}: {source}", path.display())]
  ReadFile {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(
    "duplicate route \"{pathname}\": {} and {}",
    first.display(),
    second.display()
  )]
  DuplicateRoute { pathname: String, first: PathBuf, second: PathBuf },

  #[error("malformed source {}: {reason}", path.display())]
  MalformedSource { path: PathBuf, reason: ScanError },

  #[error("route \"{pathname}\" refers to unknown component \"{component}\"")]
  UnknownComponent { pathname: String, component: String },

  #[error("not a mangled original path: {}", .0.display())]
  InvalidOriginalPath(PathBuf),

  #[error("invalid route manifest: {0}")]
  InvalidManifest(#[from] serde_json::Error),

  #[error("unsupported route manifest version {found} (expected {expected})")]
  ManifestVersion { found: u32, expected: u32 },
}

/// Reasons the export scanner gives up on a source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
  #[error("`export * from \"{0}\"` hides its export names")]
  StarReexport(String),

  /// First parser diagnostic; the source does not parse as a module.
  #[error("syntax error: {0}")]
  Syntax(String),
}
