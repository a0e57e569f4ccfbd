/* src/cli/core/src/dev/ui.rs */

use std::path::Path;

use arbor_routes::protocol::HMR_ENDPOINT;

use crate::ui::{BOLD, CYAN, DIM, GREEN, RESET, YELLOW};

pub(super) fn print_dev_banner(port: u16, route_dir: &Path, routes: usize, hmr: bool) {
  crate::ui::banner("dev");
  println!("  {GREEN}\u{279c}{RESET}  {BOLD}Local:{RESET}   {CYAN}http://localhost:{port}/{RESET}");
  println!("  {DIM}\u{279c}  routes:  {} ({routes} entries){RESET}", route_dir.display());
  if hmr {
    println!("  {DIM}\u{279c}  hmr:     ws://localhost:{port}{HMR_ENDPOINT}{RESET}");
  } else {
    println!("  {YELLOW}\u{279c}  hmr:     disabled{RESET}");
  }
  println!();
}
