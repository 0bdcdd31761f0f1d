// SPDX-License-Identifier: GPL-3.0-or-later

//! Command-line front end for the acquisition engine: parse release titles
//! and filter/rank candidate batches against the configured rule catalog.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidarr_application::{filter_and_rank, parse_title, PriorityExpr, RuleExpr};
use vidarr_config::{load as load_config, AppConfig};
use vidarr_domain::Candidate;

#[derive(Parser)]
#[command(name = "vidarr", version)]
#[command(about = "Media acquisition decision engine")]
struct Cli {
    /// Path to a TOML config file (defaults to the VIDARR_CONFIG env var)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a release title into structured metadata
    Parse {
        /// Release title, e.g. "Show.S01E05.1080p.WEB-DL"
        title: String,
        /// Optional release subtitle/description
        subtitle: Option<String>,
    },
    /// Filter and rank a JSON candidate batch with the configured rules
    Filter {
        /// Path to a JSON array of candidates
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os("VIDARR_CONFIG").map(PathBuf::from));
    let config = load_config(config_path.as_deref())?;
    init_tracing(&config.telemetry.log_level);

    let output = run(&config, cli.command)?;
    println!("{}", output);
    Ok(())
}

fn init_tracing(default_level: &str) {
    let fmt_layer = fmt::layer().with_target(true).with_level(true);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn run(config: &AppConfig, command: Command) -> Result<String> {
    match command {
        Command::Parse { title, subtitle } => cmd_parse(&title, subtitle.as_deref()),
        Command::Filter { file } => cmd_filter(config, &file),
    }
}

/// Parse a release title (and optional subtitle) and print the metadata.
fn cmd_parse(title: &str, subtitle: Option<&str>) -> Result<String> {
    let meta = parse_title(title, subtitle);
    Ok(serde_json::to_string_pretty(&meta)?)
}

/// Filter and rank a JSON candidate batch with the configured rules.
fn cmd_filter(config: &AppConfig, path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let candidates: Vec<Candidate> =
        serde_json::from_str(&raw).with_context(|| format!("decoding {}", path.display()))?;

    let catalog = config.rules.catalog();
    let priority = PriorityExpr::parse(&config.rules.priority);
    let filter = config.rules.filter.as_deref().and_then(|raw| {
        match RuleExpr::parse(raw) {
            Ok(expr) => Some(expr),
            Err(error) => {
                warn!(target: "cli", %error, "ignoring malformed filter expression");
                None
            }
        }
    });

    let mut ranked = filter_and_rank(candidates, &catalog, filter.as_ref(), &priority, None);
    ranked.truncate(config.selection.max_candidates);
    Ok(serde_json::to_string_pretty(&ranked)?)
}
