//! ytingest CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ytingest::cli::{commands, Cli, Commands};
use ytingest::config::{RuntimeConfig, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_ref().map(PathBuf::from);

    // Load configuration
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("ytingest={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Config { action } => {
            commands::run_config(action, &settings, config_path)?;
        }

        Commands::Ingest { url, document_id, json } => {
            let config = RuntimeConfig::from_env(settings)?;
            commands::run_ingest(url, document_id.clone(), *json, config).await?;
        }

        Commands::Search {
            query,
            limit,
            min_score,
        } => {
            let config = RuntimeConfig::from_env(settings)?;
            commands::run_search(query, *limit, *min_score, config).await?;
        }

        Commands::Serve { host, port } => {
            let config = RuntimeConfig::from_env(settings)?;
            commands::run_serve(host.clone(), *port, config).await?;
        }
    }

    Ok(())
}
