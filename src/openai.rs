//! OpenAI client configuration.

use crate::error::{IngestError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client for `api_key`, with a request timeout.
///
/// Uses a 5-minute timeout when none is configured.
pub fn create_client(api_key: &str, timeout_secs: Option<u64>) -> Result<Client<OpenAIConfig>> {
    let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| IngestError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new().with_api_key(api_key);
    Ok(Client::with_config(config).with_http_client(http_client))
}
