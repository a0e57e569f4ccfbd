/* src/cli/core/src/ui.rs */

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

pub fn banner(title: &str) {
  println!();
  let version = env!("CARGO_PKG_VERSION");
  println!("  {BOLD}{CYAN}arbor{RESET} {BOLD}{title}{RESET} {DIM}v{version}{RESET}");
  println!();
}

pub fn arrow(msg: &str) {
  println!("  {CYAN}\u{2192}{RESET} {msg}");
}

pub fn ok(msg: &str) {
  println!("  {GREEN}\u{2713}{RESET} {msg}");
}

pub fn fail(msg: &str) {
  println!("  {RED}\u{2717}{RESET} {msg}");
}

pub fn detail(msg: &str) {
  println!("    {DIM}{msg}{RESET}");
}
