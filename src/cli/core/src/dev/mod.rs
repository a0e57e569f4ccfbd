/* src/cli/core/src/dev/mod.rs */

mod network;
mod ui;
mod watcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use arbor_routes::{Environment, RoutesPlugin};
use arbor_server_axum::{DevServer, RebuildOutcome, Rebuilder};
use tokio::signal;
use tokio::sync::mpsc;

use crate::build::write_outputs;
use crate::config::ArborConfig;
use crate::ui::{CYAN, DIM, GREEN, RED, RESET};

use network::find_available_port;
use ui::print_dev_banner;
use watcher::{pick_change, setup_watcher};

/// Quiet period that folds an editor's burst of events into one change.
const DEBOUNCE: Duration = Duration::from_millis(300);

async fn handle_change(rebuilder: Arc<Rebuilder>, path: PathBuf, out_dir: PathBuf) {
  let started = Instant::now();
  match rebuilder.on_change(&path).await {
    RebuildOutcome::Rebuilt { generation, notified } => {
      let published = rebuilder.published();
      if let Err(e) = write_outputs(&out_dir, &published.routes.module, &published.manifest_json) {
        crate::ui::fail(&format!("{e:#}"));
      }
      println!(
        "  {GREEN}[arbor]{RESET} routes rebuilt {DIM}(gen {generation}, {} routes, {notified} \
         clients, {:.1}s){RESET}",
        published.routes.len(),
        started.elapsed().as_secs_f64()
      );
    }
    RebuildOutcome::Failed(reason) => println!("  {RED}[arbor]{RESET} rebuild error: {reason}"),
    RebuildOutcome::InFlight => {
      println!("  {CYAN}[arbor]{RESET} {DIM}rebuild in progress, change dropped{RESET}");
    }
    RebuildOutcome::Ignored => {}
  }
}

pub async fn run_dev(config: &ArborConfig, base_dir: &Path, port: Option<u16>) -> Result<()> {
  let options = config.plugin_options(base_dir, Environment::from_process());
  let route_dir = options.route_dir.clone();
  let hmr = options.hmr_enabled;
  let out_dir = config.out_dir(base_dir);

  let server = DevServer::from_plugin(RoutesPlugin::new(options), Some(out_dir.clone()))
    .with_context(|| format!("initial route build failed in {}", route_dir.display()))?;
  let published = server.rebuilder().published();
  write_outputs(&out_dir, &published.routes.module, &published.manifest_json)?;

  let port = find_available_port(port.unwrap_or(config.dev.port))?;
  let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
    .await
    .with_context(|| format!("failed to bind port {port}"))?;
  print_dev_banner(port, &route_dir, published.routes.len(), hmr);

  // Without hot reload the sender is dropped at once and the change branch never fires
  let (_watcher, mut changes) = if hmr {
    let (watcher, rx) = setup_watcher(&route_dir)?;
    (Some(watcher), rx)
  } else {
    (None, mpsc::channel(1).1)
  };

  let server = Arc::new(server);
  let serving = Arc::clone(&server);
  let mut serve_task = tokio::spawn(async move { serving.serve(listener).await });

  loop {
    tokio::select! {
      _ = signal::ctrl_c() => {
        println!();
        println!("  {DIM}shutting down...{RESET}");
        break;
      }
      result = &mut serve_task => {
        result.context("dev server task failed")?.context("dev server stopped")?;
        break;
      }
      Some(first) = changes.recv() => {
        tokio::time::sleep(DEBOUNCE).await;
        let mut batch = vec![first];
        while let Ok(path) = changes.try_recv() {
          batch.push(path);
        }
        if let Some(path) = pick_change(batch, &route_dir) {
          tokio::spawn(handle_change(Arc::clone(server.rebuilder()), path, out_dir.clone()));
        }
      }
    }
  }

  serve_task.abort();
  Ok(())
}
