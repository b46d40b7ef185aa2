//! `duka`: command-line client for the MyDuka API.
//!
//! # Usage
//!
//! ```text
//! duka --url http://localhost:5000 login --username m1 --password pw
//! export DUKA_TOKEN=<access_token>
//! duka stores
//! duka sell 3 4
//! duka report 1 --kind sales --period weekly
//! ```

mod client;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use duka_core::{
  inventory::PaymentStatus,
  report::{Period, ReportKind},
};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:5000";

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "duka", about = "Command-line client for the MyDuka API")]
struct Args {
  /// Path to a TOML config file (url, token).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the MyDuka server (default: http://localhost:5000).
  #[arg(long, env = "DUKA_URL")]
  url: Option<String>,

  /// Access token from `duka login`.
  #[arg(long, env = "DUKA_TOKEN", hide_env_values = true)]
  token: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Exchange credentials for an access token.
  Login {
    /// Username or email address.
    #[arg(long)]
    username: String,
    #[arg(long, env = "DUKA_PASSWORD", hide_env_values = true)]
    password: String,
  },
  /// List the stores visible to you.
  Stores,
  /// List inventory, optionally filtered by payment status.
  Inventory {
    #[arg(long)]
    status: Option<PaymentStatus>,
  },
  /// Record a sale.
  Sell { item: i64, quantity: i64 },
  /// Generate a sales or stock report for a store.
  Report {
    store: i64,
    #[arg(long, default_value = "sales")]
    kind: ReportKind,
    #[arg(long)]
    period: Option<Period>,
  },
  /// Total sales, top products and stock for one store.
  Performance { store: i64 },
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug, PartialEq)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

/// Flags (and their environment variables) override the config file, which
/// overrides defaults.
fn resolve(url: Option<String>, token: Option<String>, file: ConfigFile) -> ApiConfig {
  ApiConfig {
    base_url: url
      .or_else(|| (!file.url.is_empty()).then_some(file.url))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    token:    token.or_else(|| (!file.token.is_empty()).then_some(file.token)),
  }
}

fn print_json(value: &impl Serialize) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let client = ApiClient::new(resolve(args.url, args.token, file_cfg))?;

  match args.command {
    Command::Login { username, password } => {
      print_json(&client.login(&username, &password).await?)
    }
    Command::Stores => print_json(&client.list_stores().await?),
    Command::Inventory { status } => print_json(&client.list_inventory(status).await?),
    Command::Sell { item, quantity } => print_json(&client.sell(item, quantity).await?),
    Command::Report { store, kind, period } => {
      print_json(&client.report(store, kind, period).await?)
    }
    Command::Performance { store } => print_json(&client.performance(store).await?),
  }
}
