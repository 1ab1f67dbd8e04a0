//! CLI command implementations.

mod config;
mod ingest;
mod search;
mod serve;

pub use config::run_config;
pub use ingest::run_ingest;
pub use search::run_search;
pub use serve::run_serve;
