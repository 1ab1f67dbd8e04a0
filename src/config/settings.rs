//! Configuration settings for ytingest.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub youtube: YoutubeSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub server: ServerSettings,
    pub http: HttpSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// How transcripts are acquired.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStrategy {
    /// Scrape the watch page and caption endpoints directly.
    #[default]
    Scrape,
    /// Delegate to the yt-transcript-rs crate.
    Library,
}

/// YouTube access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Transcript acquisition strategy (scrape, library).
    pub transcript_source: TranscriptStrategy,
    /// Base URL for watch pages.
    pub base_url: String,
    /// oEmbed endpoint used for title lookup.
    pub oembed_url: String,
    /// Browser user agent sent with scraping requests.
    pub user_agent: String,
    /// Preferred caption language code.
    pub preferred_language: String,
    /// Title used when the oEmbed lookup fails.
    pub placeholder_title: String,
    /// Attempts per scraping request (1 disables retries).
    pub max_attempts: u32,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            transcript_source: TranscriptStrategy::Scrape,
            base_url: "https://www.youtube.com".to_string(),
            oembed_url: "https://www.youtube.com/oembed".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
            preferred_language: "en".to_string(),
            placeholder_title: "YouTube Video".to_string(),
            max_attempts: 1,
        }
    }
}

/// Text chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Window size in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Embedding provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Google Generative Language API (embedding-001).
    #[default]
    Gemini,
    /// OpenAI embeddings API.
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(EmbeddingProvider::Gemini),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Gemini => write!(f, "gemini"),
            EmbeddingProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (gemini, openai).
    pub provider: EmbeddingProvider,
    /// Embedding model to use (defaults per provider).
    pub model: Option<String>,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Environment variable holding the provider API key (defaults per provider).
    pub api_key_env: Option<String>,
    /// REST endpoint for the Gemini provider.
    pub endpoint: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Gemini,
            model: None,
            dimensions: 768,
            api_key_env: None,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl EmbeddingSettings {
    /// Configured model, or the provider's default.
    pub fn model_name(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model.as_str(),
            (None, EmbeddingProvider::Gemini) => "embedding-001",
            (None, EmbeddingProvider::OpenAI) => "text-embedding-3-small",
        }
    }

    /// Configured API key variable, or the provider's default.
    pub fn api_key_var(&self) -> &str {
        match (&self.api_key_env, self.provider) {
            (Some(var), _) => var.as_str(),
            (None, EmbeddingProvider::Gemini) => "GOOGLE_API_KEY",
            (None, EmbeddingProvider::OpenAI) => "OPENAI_API_KEY",
        }
    }
}

/// Vector store backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreProvider {
    /// Supabase (PostgREST + pgvector).
    #[default]
    Supabase,
    /// Local SQLite file.
    Sqlite,
    /// Process-local memory.
    Memory,
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (supabase, sqlite, memory).
    pub provider: VectorStoreProvider,
    /// Supabase project URL. Falls back to `supabase_url_env` when unset.
    pub supabase_url: Option<String>,
    /// Environment variable holding the Supabase project URL.
    pub supabase_url_env: String,
    /// Environment variable holding the Supabase service key.
    pub supabase_key_env: String,
    /// Table documents are written to.
    pub table_name: String,
    /// Similarity search function exposed over RPC.
    pub query_name: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: VectorStoreProvider::Supabase,
            supabase_url: None,
            supabase_url_env: "SUPABASE_URL".to_string(),
            supabase_key_env: "SUPABASE_SERVICE_KEY".to_string(),
            table_name: "documents".to_string(),
            query_name: "match_documents".to_string(),
            sqlite_path: "~/.ytingest/vectors.db".to_string(),
        }
    }
}

/// HTTP API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in seconds. None keeps the transport default.
    pub timeout_seconds: Option<u64>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::IngestError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ytingest")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert_eq!(settings.embedding.model_name(), "embedding-001");
        assert_eq!(settings.embedding.api_key_var(), "GOOGLE_API_KEY");
        assert_eq!(settings.vector_store.table_name, "documents");
        assert_eq!(settings.vector_store.query_name, "match_documents");
        assert_eq!(settings.youtube.max_attempts, 1);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [chunking]
            chunk_size = 500

            [embedding]
            provider = "openai"
            "#,
        )
        .unwrap();

        assert_eq!(settings.chunking.chunk_size, 500);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::OpenAI);
        assert_eq!(settings.embedding.api_key_var(), "OPENAI_API_KEY");
        assert_eq!(settings.embedding.model_name(), "text-embedding-3-small");
        assert_eq!(settings.youtube.transcript_source, TranscriptStrategy::Scrape);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 8080;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 8080);
    }

    #[test]
    fn test_embedding_provider_from_str() {
        assert_eq!("Google".parse::<EmbeddingProvider>(), Ok(EmbeddingProvider::Gemini));
        assert!("cohere".parse::<EmbeddingProvider>().is_err());
    }
}
