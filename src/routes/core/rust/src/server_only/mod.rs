/* src/routes/core/rust/src/server_only/mod.rs */

// Server/client boundary: files whose directive prologue marks them
// server-only reach the client bundle as stubs that throw when called.

mod exports;
mod prologue;

use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::Path;

use tracing::debug;

use crate::errors::{Result, RoutesError};
use crate::synth::js_string;

/// Directives that mark a module as server-only.
pub const SERVER_ONLY_DIRECTIVES: &[&str] = &["server-only", "use server-only"];

const JS_EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".ts", ".tsx", ".jsx"];

const STUB_FACTORY: &str = "__arbor_server_only";

pub fn is_js_path(path: &Path) -> bool {
  let name = path.to_string_lossy();
  JS_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// True when the text starts with a server-only directive.
pub fn classify_source(source: &str) -> bool {
  prologue::directive_prologue(source).iter().any(|d| SERVER_ONLY_DIRECTIVES.contains(d))
}

/// Classify a file by its current contents on disk.
pub fn classify(path: &Path) -> Result<bool> {
  let source = read_source(path)?;
  Ok(classify_source(&source))
}

/// Runtime export names of a module, `default` included. `path` picks the
/// dialect (TypeScript, JSX) by extension.
pub fn scan_exports(source: &str, path: &Path) -> Result<Vec<String>> {
  exports::scan_exports(source, path)
    .map_err(|reason| RoutesError::MalformedSource { path: path.to_path_buf(), reason })
}

/// Replace every export of a server-only module with a throwing stub.
/// Modules without the directive are returned untouched.
pub fn strip<'a>(source: &'a str, path: &Path) -> Result<Cow<'a, str>> {
  if !classify_source(source) {
    return Ok(Cow::Borrowed(source));
  }
  let names = scan_exports(source, path)?;
  debug!(path = %path.display(), exports = names.len(), "stubbing server-only module");
  Ok(Cow::Owned(render_stubs(&names, path)))
}

/// Load a file for the client bundle. Server-only files that are not JS become empty modules.
pub fn strip_file(path: &Path) -> Result<String> {
  let source = read_source(path)?;
  if !is_js_path(path) {
    return Ok(if classify_source(&source) { String::new() } else { source });
  }
  Ok(strip(&source, path)?.into_owned())
}

fn read_source(path: &Path) -> Result<String> {
  std::fs::read_to_string(path)
    .map_err(|source| RoutesError::ReadFile { path: path.to_path_buf(), source })
}

/// Second pass of the transform: re-emit each scanned name as a stub binding.
fn render_stubs(names: &[String], path: &Path) -> String {
  let module = path.to_string_lossy().replace('\\', "/");
  let message_prefix = js_string(&format!("Module \"{module}\" is server-only; \""));
  let message_suffix = js_string("\" cannot be used on the client.");

  let mut out = String::new();
  let _ = writeln!(out, "// {module} is server-only; its exports throw on the client.");
  let _ = writeln!(out, "const {STUB_FACTORY} = (name) => () => {{");
  let _ = writeln!(out, "  throw new Error({message_prefix} + name + {message_suffix});");
  out.push_str("};\n");

  for (index, name) in names.iter().enumerate() {
    let binding = format!("__arbor_export_{index}");
    let _ = writeln!(out, "const {binding} = {STUB_FACTORY}({});", js_string(name));
    let exported = if is_plain_ident(name) { name.clone() } else { js_string(name) };
    let _ = writeln!(out, "export {{ {binding} as {exported} }};");
  }
  out
}

fn is_plain_ident(name: &str) -> bool {
  let mut chars = name.chars();
  chars.next().is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
