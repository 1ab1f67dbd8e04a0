//! Chunk metadata annotation.

use super::{Chunk, ChunkMetadata};

/// Per-document values copied onto every chunk.
#[derive(Debug, Clone)]
pub struct ChunkContext {
    pub video_id: String,
    pub video_title: String,
    pub document_id: Option<String>,
    pub source: String,
}

/// Attach metadata to a complete list of chunk texts.
///
/// Takes the whole list because `total_chunks` is only known once chunking is done.
pub fn annotate(pieces: Vec<String>, context: &ChunkContext) -> Vec<Chunk> {
    let total_chunks = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(chunk_index, content)| Chunk {
            content,
            metadata: ChunkMetadata {
                video_id: context.video_id.clone(),
                video_title: context.video_title.clone(),
                document_id: context.document_id.clone(),
                chunk_index,
                total_chunks,
                source: context.source.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_dense_indices() {
        let context = ChunkContext {
            video_id: "dQw4w9WgXcQ".to_string(),
            video_title: "Title".to_string(),
            document_id: Some("doc-7".to_string()),
            source: "https://youtu.be/dQw4w9WgXcQ".to_string(),
        };
        let chunks = annotate(vec!["a".into(), "b".into(), "c".into()], &context);

        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.total_chunks, 3);
            assert_eq!(chunk.metadata.document_id.as_deref(), Some("doc-7"));
            assert_eq!(chunk.metadata.source, context.source);
        }
        assert_eq!(chunks[2].content, "c");
    }

    #[test]
    fn test_annotate_empty() {
        let context = ChunkContext {
            video_id: String::new(),
            video_title: String::new(),
            document_id: None,
            source: String::new(),
        };
        assert!(annotate(Vec::new(), &context).is_empty());
    }
}
