//! Validated runtime configuration.
//!
//! Secrets are read from the environment exactly once, at startup, and
//! checked together with the settings that cannot be validated by serde
//! alone. Everything downstream depends on [`RuntimeConfig`] instead of
//! reading environment state on its own.

use super::{Settings, VectorStoreProvider};
use crate::error::{IngestError, Result};

/// Supabase project credentials.
#[derive(Clone)]
pub struct SupabaseCredentials {
    pub url: String,
    pub service_key: String,
}

impl std::fmt::Debug for SupabaseCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseCredentials")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

/// Settings plus the secrets resolved from the environment.
#[derive(Clone)]
pub struct RuntimeConfig {
    pub settings: Settings,
    pub embedding_api_key: String,
    pub supabase: Option<SupabaseCredentials>,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("settings", &self.settings)
            .field("embedding_api_key", &"<redacted>")
            .field("supabase", &self.supabase)
            .finish()
    }
}

impl RuntimeConfig {
    /// Resolve secrets from the process environment.
    pub fn from_env(settings: Settings) -> Result<Self> {
        Self::from_lookup(settings, |name| std::env::var(name).ok())
    }

    /// Resolve secrets through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(settings: Settings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chunking = &settings.chunking;
        if chunking.chunk_size == 0 {
            return Err(IngestError::Config("chunking.chunk_size must be positive".to_string()));
        }
        if chunking.chunk_overlap >= chunking.chunk_size {
            return Err(IngestError::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                chunking.chunk_overlap, chunking.chunk_size
            )));
        }

        let embedding_api_key = required(&lookup, settings.embedding.api_key_var())?;

        let supabase = match settings.vector_store.provider {
            VectorStoreProvider::Supabase => {
                let url = match &settings.vector_store.supabase_url {
                    Some(url) if !url.trim().is_empty() => url.trim().to_string(),
                    _ => required(&lookup, &settings.vector_store.supabase_url_env)?,
                };
                let service_key = required(&lookup, &settings.vector_store.supabase_key_env)?;
                Some(SupabaseCredentials {
                    url: url.trim_end_matches('/').to_string(),
                    service_key,
                })
            }
            VectorStoreProvider::Sqlite | VectorStoreProvider::Memory => None,
        };

        Ok(Self {
            settings,
            embedding_api_key,
            supabase,
        })
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(_) => Err(IngestError::Config(format!("{} is empty", name))),
        None => Err(IngestError::Config(format!("{} is not set", name))),
    }
}
