/* src/cli/core/src/config/tests/mod.rs */

use super::ArborConfig;
use super::loader::{CONFIG_FILE, find_arbor_config, load_arbor_config, resolve_config};
