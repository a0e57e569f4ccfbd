/* src/routes/core/rust/src/server_only/prologue.rs */

// Directive prologue reader. It runs on any text, not only JS, because a
// server-only stylesheet or asset is marked the same way.

/// Skip a quoted string starting at `start` (the quote). Returns the index after the closing quote.
fn skip_string(bytes: &[u8], start: usize) -> usize {
  let quote = bytes[start];
  let mut i = start + 1;
  while i < bytes.len() {
    match bytes[i] {
      b'\\' => i += 2,
      b'\n' => return i,
      c if c == quote => return i + 1,
      _ => i += 1,
    }
  }
  bytes.len()
}

/// Skip whitespace and comments. Returns the new index and whether a newline was crossed.
fn skip_trivia(bytes: &[u8], mut i: usize) -> (usize, bool) {
  let mut newline = false;
  while i < bytes.len() {
    match bytes[i] {
      b'\n' => {
        newline = true;
        i += 1;
      }
      c if c.is_ascii_whitespace() => i += 1,
      b'/' if bytes.get(i + 1) == Some(&b'/') => {
        while i < bytes.len() && bytes[i] != b'\n' {
          i += 1;
        }
      }
      b'/' if bytes.get(i + 1) == Some(&b'*') => {
        let end = find(bytes, i + 2, b"*/").map_or(bytes.len(), |p| p + 2);
        if bytes[i..end].contains(&b'\n') {
          newline = true;
        }
        i = end;
      }
      _ => break,
    }
  }
  (i, newline)
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
  bytes.get(from..)?.windows(needle.len()).position(|w| w == needle).map(|p| p + from)
}

/// Values of the leading string-literal statements (`"use strict"; "server-only";`).
pub(super) fn directive_prologue(source: &str) -> Vec<&str> {
  let bytes = source.as_bytes();
  let mut i = if source.starts_with("#!") { source.find('\n').unwrap_or(source.len()) } else { 0 };
  let mut directives = Vec::new();
  loop {
    let (next, _) = skip_trivia(bytes, i);
    i = next;
    match bytes.get(i) {
      Some(b'"' | b'\'') => {
        let end = skip_string(bytes, i);
        if end <= i + 1 || bytes[end - 1] != bytes[i] {
          break;
        }
        directives.push(&source[i + 1..end - 1]);
        i = end;
        let (next, newline) = skip_trivia(bytes, i);
        match bytes.get(next) {
          Some(b';') => i = next + 1,
          None => break,
          // A directive ends at a line break; anything else means the string was an expression
          Some(_) if newline => i = next,
          Some(_) => {
            directives.pop();
            break;
          }
        }
      }
      _ => break,
    }
  }
  directives
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prologue_collects_leading_directives() {
    let src = "#!/usr/bin/env node\n// db access\n\"use strict\";\n'server-only'\nimport db from './db';";
    assert_eq!(directive_prologue(src), vec!["use strict", "server-only"]);
  }

  #[test]
  fn prologue_stops_at_first_statement() {
    let src = "import x from 'y';\n\"server-only\";";
    assert!(directive_prologue(src).is_empty());
  }

  #[test]
  fn string_expression_is_not_a_directive() {
    assert!(directive_prologue("\"server-only\".length;").is_empty());
  }

  #[test]
  fn block_comment_before_directive() {
    assert_eq!(directive_prologue("/* admin */\n\"server-only\";\n.x {}"), vec!["server-only"]);
  }
}
