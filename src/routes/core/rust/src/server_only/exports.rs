/* src/routes/core/rust/src/server_only/exports.rs */

// First pass of the server-only transform: parse the module and list the
// names it exports at runtime. Type-only exports are erased by the compiler
// and never reach the client, so they get no stub.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
  BindingPattern, BindingPatternKind, Declaration, ExportNamedDeclaration, Statement,
};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::errors::ScanError;

/// Exported names of a module, in first-appearance order. `default` is listed as `default`.
pub(super) fn scan_exports(source: &str, path: &Path) -> Result<Vec<String>, ScanError> {
  let allocator = Allocator::default();
  let source_type =
    SourceType::from_path(path).unwrap_or_else(|_| SourceType::default().with_module(true));
  let parsed = Parser::new(&allocator, source, source_type).parse();
  if let Some(diagnostic) = parsed.errors.first() {
    return Err(ScanError::Syntax(diagnostic.to_string()));
  }
  if parsed.panicked {
    return Err(ScanError::Syntax("parser gave up".to_string()));
  }

  let mut names: Vec<String> = Vec::new();
  let mut push = |name: &str| {
    if !names.iter().any(|n| n == name) {
      names.push(name.to_string());
    }
  };

  for stmt in &parsed.program.body {
    match stmt {
      Statement::ExportDefaultDeclaration(_) => push("default"),
      Statement::ExportNamedDeclaration(export) => named_exports(export, &mut push),
      Statement::ExportAllDeclaration(export) => {
        if export.export_kind.is_type() {
          continue;
        }
        match &export.exported {
          Some(namespace) => push(&namespace.name()),
          None => return Err(ScanError::StarReexport(export.source.value.to_string())),
        }
      }
      _ => {}
    }
  }
  Ok(names)
}

fn named_exports(export: &ExportNamedDeclaration<'_>, push: &mut impl FnMut(&str)) {
  if export.export_kind.is_type() {
    return;
  }
  if let Some(decl) = &export.declaration {
    declared_names(decl, push);
  }
  for specifier in &export.specifiers {
    if !specifier.export_kind.is_type() {
      push(&specifier.exported.name());
    }
  }
}

fn declared_names(decl: &Declaration<'_>, push: &mut impl FnMut(&str)) {
  match decl {
    Declaration::VariableDeclaration(var) if !var.declare => {
      for declarator in &var.declarations {
        binding_names(&declarator.id, push);
      }
    }
    Declaration::FunctionDeclaration(func) if !func.declare => {
      if let Some(id) = &func.id {
        push(&id.name);
      }
    }
    Declaration::ClassDeclaration(class) if !class.declare => {
      if let Some(id) = &class.id {
        push(&id.name);
      }
    }
    Declaration::TSEnumDeclaration(decl) if !decl.declare => push(&decl.id.name),
    // Type aliases, interfaces, ambient declarations and namespaces
    _ => {}
  }
}

/// Every identifier a binding pattern introduces, destructuring included.
fn binding_names(pattern: &BindingPattern<'_>, push: &mut impl FnMut(&str)) {
  match &pattern.kind {
    BindingPatternKind::BindingIdentifier(id) => push(&id.name),
    BindingPatternKind::ObjectPattern(object) => {
      for property in &object.properties {
        binding_names(&property.value, push);
      }
      if let Some(rest) = &object.rest {
        binding_names(&rest.argument, push);
      }
    }
    BindingPatternKind::ArrayPattern(array) => {
      for element in array.elements.iter().flatten() {
        binding_names(element, push);
      }
      if let Some(rest) = &array.rest {
        binding_names(&rest.argument, push);
      }
    }
    BindingPatternKind::AssignmentPattern(assign) => binding_names(&assign.left, push),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn names(src: &str) -> Vec<String> {
    scan_exports(src, Path::new("mod.ts")).unwrap()
  }

  #[test]
  fn default_and_function_exports() {
    let src = r#"
      export default function Page() { return null; }
      export async function loader() {}
      export function* ids() {}
      export class Store {}
    "#;
    assert_eq!(names(src), vec!["default", "loader", "ids", "Store"]);
  }

  #[test]
  fn declarations_with_multiple_bindings() {
    let src = "export const a = 1, b = { x: 2 };\nexport let c\nexport var d = [1, 2]";
    assert_eq!(names(src), vec!["a", "b", "c", "d"]);
  }

  #[test]
  fn destructuring_bindings() {
    let src = "export const { host, port: listenPort, tls = false, ...rest } = config;\nexport const [first, , third] = list;";
    assert_eq!(names(src), vec!["host", "listenPort", "tls", "rest", "first", "third"]);
  }

  #[test]
  fn export_lists_and_reexports() {
    let src = r#"
      const secret = 1;
      export { secret, secret as alias, secret as default };
      export { query } from "./db";
      export * as helpers from "./helpers";
    "#;
    assert_eq!(names(src), vec!["secret", "alias", "default", "query", "helpers"]);
  }

  #[test]
  fn ignores_nested_and_quoted_exports() {
    let src = r#"
      // export const commented = 1;
      /* export function alsoCommented() {} */
      const text = "export const inString = 1";
      const tpl = `export const inTemplate = ${ "}" }`;
      const re = /export const inRegex = [}{]/;
      function inner() { const export_like = module.export; }
      export const real = 1;
    "#;
    assert_eq!(names(src), vec!["real"]);
  }

  #[test]
  fn type_only_exports_are_skipped() {
    let src = "const value = 1;\nexport type Props = { id: string };\nexport interface Row { id: string }\nexport { type Props as P, value };\nexport type { Row as R };\nexport declare const ambient: number;\nexport enum Kind { A }";
    assert_eq!(names(src), vec!["value", "Kind"]);
  }

  #[test]
  fn jsx_is_parsed_for_tsx_files() {
    let src = "export default function Note() {\n  return <p>Don't {\"{\"} panic</p>;\n}\nexport const tag = 1;";
    assert_eq!(scan_exports(src, Path::new("note.tsx")).unwrap(), vec!["default", "tag"]);
  }

  #[test]
  fn star_reexport_is_rejected() {
    let err = scan_exports("export * from \"./internal\";", Path::new("a.js")).unwrap_err();
    assert_eq!(err, ScanError::StarReexport("./internal".into()));
  }

  #[test]
  fn syntax_errors_are_reported() {
    let err = scan_exports("export function f() {", Path::new("a.js")).unwrap_err();
    assert!(matches!(err, ScanError::Syntax(_)));
  }
}
