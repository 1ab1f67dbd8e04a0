//! Search command implementation.

use crate::cli::Output;
use crate::config::RuntimeConfig;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, min_score: f32, config: RuntimeConfig) -> Result<()> {
    let orchestrator = Orchestrator::new(config)?;

    let spinner = Output::spinner("Searching...");
    let results = orchestrator.search(query, limit, min_score).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            if results.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", results.len()));

                for result in &results {
                    Output::search_result(
                        &result.metadata.video_title,
                        result.metadata.chunk_index,
                        result.metadata.total_chunks,
                        result.score,
                        &result.content,
                        &result.metadata.source,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
