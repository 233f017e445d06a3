//! Synapse - command-line client for the Synapse Cortex
//!
//! Main entry point for the Synapse CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

mod commands;

use commands::{auth, axon, health, query, storm, vars};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Synapse - command-line client for the Synapse Cortex
#[derive(Parser)]
#[command(name = "synapse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Cortex host name
    #[arg(long, global = true, env = "SYNAPSE_HOST", default_value = "localhost")]
    pub host: String,

    /// Cortex HTTPS port
    #[arg(long, global = true, env = "SYNAPSE_PORT", default_value = "443")]
    pub port: String,

    /// API key sent in the X-API-KEY header
    #[arg(long, global = true, env = "SYNAPSE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// View iden to run queries in
    #[arg(long, global = true, env = "SYNAPSE_VIEW_ID")]
    pub view: Option<String>,

    /// Log in as this user before running the command
    #[arg(long, global = true, env = "SYNAPSE_USER")]
    pub user: Option<String>,

    /// Password for --user (prompted for if omitted)
    #[arg(long, global = true, env = "SYNAPSE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive Storm prompt
    Storm(storm::StormArgs),

    /// Run a single Storm query
    Query(query::QueryArgs),

    /// Check that the Cortex is up and answering queries
    Health(health::HealthArgs),

    /// User and role administration
    Auth(auth::AuthArgs),

    /// Global Cortex variables
    Vars(vars::VarsArgs),

    /// Axon blob storage
    Axon(axon::AxonArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "synapse=debug,synapse_client=debug,info"
    } else {
        "synapse=info,synapse_client=info,warn"
    };

    let log_dir = dirs::config_dir()
        .map(|d| d.join("synapse").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let (file_layer, _guard) = match tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("synapse.log")
        .build(&log_dir)
    {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "synapse=trace,synapse_client=trace,info",
                ));
            (Some(layer), Some(guard))
        }
        // Logging to file is best effort; the console layer still works
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_layer)
        .init();

    // Create context for commands
    let ctx = commands::Context {
        host: cli.host,
        port: cli.port,
        api_key: cli.api_key,
        view: cli.view,
        user: cli.user,
        password: cli.password,
        insecure: cli.insecure,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Storm(args) => storm::run(args, &ctx).await,
        Commands::Query(args) => query::run(args, &ctx).await,
        Commands::Health(args) => health::run(args, &ctx).await,
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Vars(args) => vars::run(args, &ctx).await,
        Commands::Axon(args) => axon::run(args, &ctx).await,
    }
}
