/* src/cli/core/src/routes.rs */

use std::path::Path;

use anyhow::{Context, Result};
use arbor_routes::{Environment, RouteTable, RoutesPlugin, is_layout_path, server_only};
use serde::Serialize;

use crate::config::ArborConfig;
use crate::ui::{self, CYAN, DIM, RESET, YELLOW};

#[derive(Debug, Serialize)]
struct RouteRow {
  pathname: String,
  source: String,
  layout: bool,
  server_only: bool,
}

fn describe(table: &RouteTable) -> Result<Vec<RouteRow>> {
  table
    .iter()
    .map(|(pathname, source)| {
      let server_only = server_only::classify(source)
        .with_context(|| format!("failed to classify {}", source.display()))?;
      Ok(RouteRow {
        pathname: pathname.to_string(),
        source: table.relative_source(source),
        layout: is_layout_path(pathname),
        server_only,
      })
    })
    .collect()
}

pub fn run_routes(config: &ArborConfig, base_dir: &Path, json: bool) -> Result<()> {
  let plugin = RoutesPlugin::new(config.plugin_options(base_dir, Environment::from_process()));
  let table = plugin
    .build_table()
    .with_context(|| format!("failed to scan {}", plugin.route_dir().display()))?;
  let rows = describe(&table)?;

  if json {
    let out = serde_json::to_string_pretty(&rows).context("failed to serialize route table")?;
    println!("{out}");
    return Ok(());
  }

  ui::banner("routes");
  ui::arrow(&format!("{} ({} entries)", plugin.route_dir().display(), rows.len()));
  for row in &rows {
    let mut tags = String::new();
    if row.layout {
      tags.push_str(&format!(" {CYAN}layout{RESET}"));
    }
    if row.server_only {
      tags.push_str(&format!(" {YELLOW}server-only{RESET}"));
    }
    println!("    {:<28} {DIM}{}{RESET}{tags}", row.pathname, row.source);
  }
  Ok(())
}
