//! Video title lookup through the public oEmbed endpoint.

use super::http::PageFetcher;
use super::{TitleResolver, VideoId};
use crate::config::YoutubeSettings;
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    title: String,
}

/// Resolves titles via oEmbed, falling back to a placeholder on any failure.
pub struct OEmbedTitleResolver {
    fetcher: PageFetcher,
    endpoint: String,
    placeholder: String,
}

impl OEmbedTitleResolver {
    pub fn new(fetcher: PageFetcher, settings: &YoutubeSettings) -> Self {
        Self {
            fetcher,
            endpoint: settings.oembed_url.clone(),
            placeholder: settings.placeholder_title.clone(),
        }
    }

    fn request_url(&self, video_id: &VideoId) -> Result<Url> {
        Url::parse_with_params(
            &self.endpoint,
            &[("url", video_id.canonical_url().as_str()), ("format", "json")],
        )
        .map_err(|e| IngestError::Config(format!("Invalid oEmbed endpoint: {}", e)))
    }

    async fn lookup(&self, video_id: &VideoId) -> Result<String> {
        let url = self.request_url(video_id)?;
        let body = self.fetcher.get_text(url.as_str()).await?;
        let response: OEmbedResponse = serde_json::from_str(&body)?;
        Ok(response.title.trim().to_string())
    }
}

#[async_trait]
impl TitleResolver for OEmbedTitleResolver {
    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn resolve_title(&self, video_id: &VideoId) -> String {
        match self.lookup(video_id).await {
            Ok(title) if !title.is_empty() => {
                debug!("Resolved title: {}", title);
                title
            }
            Ok(_) => {
                warn!("oEmbed returned an empty title, using placeholder");
                self.placeholder.clone()
            }
            Err(e) => {
                warn!("Title lookup failed, using placeholder: {}", e);
                self.placeholder.clone()
            }
        }
    }
}
