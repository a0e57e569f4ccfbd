/* src/routes/core/rust/src/path.rs */

/// Canonical form of a URL pathname: trailing slashes removed, except that the
/// root stays `/`.
pub fn normalize(pathname: &str) -> String {
  if pathname == "/" {
    return pathname.to_string();
  }
  let trimmed = pathname.trim_end_matches('/');
  if trimmed.is_empty() && !pathname.is_empty() { "/".to_string() } else { trimmed.to_string() }
}

/// Non-empty segments of a pathname, left to right.
pub fn segments(pathname: &str) -> impl Iterator<Item = &str> {
  pathname.split('/').filter(|s| !s.is_empty())
}
