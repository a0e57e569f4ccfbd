/* src/cli/core/src/dev/network.rs */

use anyhow::{Result, bail};

const PORT_RANGE: std::ops::Range<u16> = 3000..3100;

/// `preferred` when free, else the first free port in 3000-3099.
pub(super) fn find_available_port(preferred: u16) -> Result<u16> {
  if std::net::TcpListener::bind(("0.0.0.0", preferred)).is_ok() {
    return Ok(preferred);
  }
  for port in PORT_RANGE {
    if port != preferred && std::net::TcpListener::bind(("0.0.0.0", port)).is_ok() {
      return Ok(port);
    }
  }
  bail!("no available port found in range 3000-3099");
}
