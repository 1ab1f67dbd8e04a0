//! Ingest command implementation.

use crate::cli::Output;
use crate::config::RuntimeConfig;
use crate::orchestrator::{IngestRequest, IngestResponse, Orchestrator};
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(
    url: &str,
    document_id: Option<String>,
    json: bool,
    config: RuntimeConfig,
) -> Result<()> {
    let orchestrator = Orchestrator::new(config)?;
    let request = IngestRequest::new(url, document_id);

    if json {
        let response = orchestrator.handle(&request).await;
        println!("{}", serde_json::to_string_pretty(&response)?);
        if !response.ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    let spinner = Output::spinner("Ingesting transcript...");
    let result = orchestrator.ingest_logged(&request).await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => {
            let response = IngestResponse::success(&outcome);
            Output::success(response.message.as_deref().unwrap_or("Ingested"));
            Output::kv("Video", outcome.video_id.as_str());
            Output::kv("Title", &outcome.video_title);
            Output::kv("Chunks", &outcome.chunks_created.to_string());
            Ok(())
        }
        Err(e) => {
            Output::error(&e.to_string());
            if let Some(suggestion) = e.suggestion() {
                Output::info(suggestion);
            }
            Err(e.into())
        }
    }
}
