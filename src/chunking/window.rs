//! Fixed-size sliding-window chunking.

use crate::config::ChunkingSettings;
use crate::error::{IngestError, Result};

/// Splits text into windows of `chunk_size` characters, each sharing
/// `chunk_overlap` characters with the one before it.
///
/// Sizes count Unicode scalar values, so multi-byte text is never split
/// inside a character.
#[derive(Debug, Clone, Copy)]
pub struct SlidingWindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SlidingWindowChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(IngestError::Config("chunk size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(IngestError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    /// Split `text`. Empty input yields no chunks; only the last chunk may be short.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        if chars.is_empty() {
            return chunks;
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

impl Default for SlidingWindowChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(len: usize) -> String {
        (0..len)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect()
    }

    #[test]
    fn test_three_chunks_with_overlap() {
        let text = sample(2500);
        let chunks = SlidingWindowChunker::new(1000, 200).unwrap().split(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[1].len(), 1000);
        assert_eq!(chunks[2].len(), 900);

        for pair in chunks.windows(2) {
            let prev_tail = &pair[0][pair[0].len() - 200..];
            let next_head = &pair[1][..200];
            assert_eq!(prev_tail, next_head);
        }
    }

    #[test]
    fn test_chunks_cover_input() {
        let text = sample(3333);
        let chunks = SlidingWindowChunker::new(1000, 200).unwrap().split(&text);

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk[200..]);
        }
        assert_eq!(rebuilt, text);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_short_and_empty_input() {
        let chunker = SlidingWindowChunker::default();
        assert!(chunker.split("").is_empty());
        assert_eq!(chunker.split("short"), vec!["short"]);
        assert_eq!(chunker.split(&sample(1000)).len(), 1);
        assert_eq!(chunker.split(&sample(1001)).len(), 2);
    }

    #[test]
    fn test_multibyte_characters() {
        let text: String = "é".repeat(15);
        let chunks = SlidingWindowChunker::new(10, 4).unwrap().split(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 10);
        assert_eq!(chunks[1].chars().count(), 9);
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(SlidingWindowChunker::new(0, 0).is_err());
        assert!(SlidingWindowChunker::new(100, 100).is_err());
        assert!(SlidingWindowChunker::new(100, 99).is_ok());
    }
}
