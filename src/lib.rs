//! ytingest - YouTube transcripts into a vector store
//!
//! Given a YouTube URL, ytingest fetches the video's transcript, splits it
//! into overlapping chunks, embeds each chunk, and stores the chunks with
//! their metadata for later semantic retrieval.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings file and validated runtime configuration
//! - `youtube` - Video IDs, transcript sources, and title lookup
//! - `chunking` - Sliding-window chunking and metadata annotation
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `orchestrator` - Pipeline coordination
//! - `server` - HTTP API
//!
//! # Example
//!
//! ```rust,no_run
//! use ytingest::config::{RuntimeConfig, Settings};
//! use ytingest::orchestrator::{IngestRequest, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RuntimeConfig::from_env(Settings::load()?)?;
//!     let orchestrator = Orchestrator::new(config)?;
//!
//!     let request = IngestRequest::new("https://youtu.be/dQw4w9WgXcQ", None);
//!     let outcome = orchestrator.ingest(&request).await?;
//!     println!("Stored {} chunks", outcome.chunks_created);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod server;
pub mod vector_store;
pub mod youtube;

pub use error::{IngestError, Result};
