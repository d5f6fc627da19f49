//! `repo-ledger` CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration** — layer defaults, the TOML config file, and the
//!    environment (see [`config`]) and validate the result.
//! 2. **Wire observability** — install `tracing-subscriber` with a JSON or
//!    pretty layer and, when configured, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure** — build the [`notion::NotionClient`] from
//!    explicit configuration.
//! 4. **Dispatch** — run the selected command against the client:
//!    - `sync` — upsert a GitHub access snapshot and close stale rows.
//!    - `query` — print rows for a repository, optionally one user.
//!    - `set-status` — change one row's status.

mod commands;
mod config;
mod telemetry;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledger::SyncRunId;
use tracing::{info_span, Instrument};

use crate::config::{CliConfig, DEFAULT_CONFIG_PATH};

#[derive(Debug, Parser)]
#[command(
    name = "repo-ledger",
    version,
    about = "Record GitHub repository access in a Notion audit ledger"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "REPO_LEDGER_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upsert access records from a JSON file and close rows of removed users.
    Sync {
        /// JSON array of access records exported from GitHub.
        #[arg(long)]
        input: PathBuf,
    },
    /// Print ledger rows for a repository as JSON lines.
    Query {
        #[arg(long)]
        repository: String,
        /// Restrict to one user login.
        #[arg(long)]
        user: Option<String>,
    },
    /// Set the status of one ledger row.
    SetStatus {
        #[arg(long)]
        page_id: String,
        #[arg(long)]
        status: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(&cli.config)
        .with_context(|| format!("Invalid configuration ({})", cli.config.display()))?;
    let _telemetry = telemetry::init(&config.logging)?;

    let run_id = SyncRunId::new_random();
    let client = notion::open_client(&config.notion);
    let mut stdout = std::io::stdout().lock();

    let span = info_span!("repo_ledger", %run_id, database_id = %client.database_id());
    async {
        match cli.command {
            Command::Sync { input } => {
                commands::sync(&client, &input, &mut stdout).await?;
            }
            Command::Query { repository, user } => {
                commands::query(&client, &repository, user.as_deref(), &mut stdout).await?;
            }
            Command::SetStatus { page_id, status } => {
                commands::set_status(&client, &page_id, &status, &mut stdout).await?;
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .instrument(span)
    .await
}
