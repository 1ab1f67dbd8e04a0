//! HTTP access to YouTube pages.

use crate::config::{HttpSettings, YoutubeSettings};
use crate::error::{IngestError, Result};
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Build the shared HTTP client.
pub fn build_client(http: &HttpSettings) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = http.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| IngestError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Fetches page bodies with a browser user agent and optional bounded retries.
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    user_agent: String,
    max_attempts: u32,
}

impl PageFetcher {
    pub fn new(client: reqwest::Client, settings: &YoutubeSettings) -> Self {
        Self {
            client,
            user_agent: settings.user_agent.clone(),
            max_attempts: settings.max_attempts.max(1),
        }
    }

    /// GET `url` and return the body of a successful response.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let mut attempt = 1;
        loop {
            debug!(url, attempt, "GET");
            let result = self
                .client
                .get(url)
                .header(USER_AGENT, &self.user_agent)
                .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .send()
                .await
                .and_then(|resp| resp.error_for_status());

            match result {
                Ok(resp) => return Ok(resp.text().await?),
                Err(err) if attempt < self.max_attempts && should_retry(&err) => {
                    warn!(url, attempt, "Request failed, retrying: {}", err);
                    tokio::time::sleep(retry_backoff(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn should_retry(err: &reqwest::Error) -> bool {
    if err.is_connect() || err.is_timeout() {
        return true;
    }
    err.status()
        .is_some_and(|s| s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error())
}

fn retry_backoff(attempt: u32) -> Duration {
    let capped = attempt.min(5);
    Duration::from_millis(500 * (1 << capped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_backoff_is_capped() {
        assert_eq!(retry_backoff(1), Duration::from_millis(1000));
        assert_eq!(retry_backoff(2), Duration::from_millis(2000));
        assert_eq!(retry_backoff(9), retry_backoff(5));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let settings = YoutubeSettings {
            max_attempts: 0,
            ..YoutubeSettings::default()
        };
        let fetcher = PageFetcher::new(reqwest::Client::new(), &settings);
        assert_eq!(fetcher.max_attempts, 1);
    }
}
