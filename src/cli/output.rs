//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a search match.
    pub fn search_result(title: &str, chunk_index: usize, total_chunks: usize, score: f32, content: &str, source: &str) {
        println!(
            "\n{} {} [{}/{}] (score: {:.2})",
            style(">>").green(),
            style(title).bold(),
            chunk_index + 1,
            total_chunks,
            score
        );
        println!("   {}", content_preview(content, 200));
        println!("   {}", style(source).dim());
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content to `max_chars` characters with an ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
