//! CLI module for ytingest.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// ytingest - YouTube transcripts into a vector store
///
/// Fetches a video's transcript, splits it into overlapping chunks, embeds
/// each chunk, and stores the result for semantic retrieval.
#[derive(Parser, Debug)]
#[command(name = "ytingest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a YouTube video's transcript
    Ingest {
        /// YouTube URL or 11-character video ID
        url: String,

        /// Identifier copied onto every stored chunk
        #[arg(short, long)]
        document_id: Option<String>,

        /// Print the JSON response instead of formatted output
        #[arg(long)]
        json: bool,
    },

    /// Search stored chunks
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.3")]
        min_score: f32,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
