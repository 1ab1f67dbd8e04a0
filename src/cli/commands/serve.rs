//! Serve command implementation.

use crate::cli::Output;
use crate::config::RuntimeConfig;
use crate::orchestrator::Orchestrator;
use crate::server;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, config: RuntimeConfig) -> Result<()> {
    let host = host.unwrap_or_else(|| config.settings.server.host.clone());
    let port = port.unwrap_or(config.settings.server.port);

    let orchestrator = Arc::new(Orchestrator::new(config)?);
    let app = server::router(orchestrator);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    Output::header("ytingest API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ingest", "POST /ingest");
    Output::kv("Search", "POST /search");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
