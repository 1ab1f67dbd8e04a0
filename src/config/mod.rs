//! Configuration module for ytingest.
//!
//! Handles loading settings from disk and resolving secrets from the environment.

mod runtime;
mod settings;

pub use runtime::{RuntimeConfig, SupabaseCredentials};
pub use settings::{
    ChunkingSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings, HttpSettings,
    ServerSettings, Settings, TranscriptStrategy, VectorStoreProvider, VectorStoreSettings,
    YoutubeSettings,
};
