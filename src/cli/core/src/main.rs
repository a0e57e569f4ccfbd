/* src/cli/core/src/main.rs */

mod build;
mod config;
mod dev;
mod routes;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ARBOR_LOG";

#[derive(Parser)]
#[command(name = "arbor", version, about = "File-based routing and route hot-reload")]
struct Cli {
  /// Path to arbor.toml (searched upward from the current directory when omitted)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Write the route module and manifest to build.out_dir
  Build,
  /// Print the route table
  Routes {
    /// Machine-readable output
    #[arg(long)]
    json: bool,
  },
  /// Serve route modules and push route updates on change
  Dev {
    /// Overrides dev.port
    #[arg(short, long)]
    port: Option<u16>,
  },
}

fn init_tracing() {
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();
  let cwd = std::env::current_dir().context("failed to read current directory")?;
  let (config, base_dir) = config::resolve_config(cli.config.as_deref(), &cwd)?;
  debug!(project = %config.project.name, base_dir = %base_dir.display(), "config loaded");

  match cli.command {
    Command::Build => build::run_build(&config, &base_dir),
    Command::Routes { json } => routes::run_routes(&config, &base_dir, json),
    Command::Dev { port } => dev::run_dev(&config, &base_dir, port).await,
  }
}
