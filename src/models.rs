//! Core data models used throughout Farm Advisor.
//!
//! These types represent the documents, chunks, and retrieval results that
//! flow through the indexing and question-answering pipeline.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A unit of loaded corpus text before chunking: one PDF page, one text
/// file, or one CSV row. `source` is the bare file name (never a full
/// path) so citations can be deduplicated by file later; `page` is 1-based
/// and present only for PDF pages.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
}

/// A bounded slice of a document's text, carrying its provenance.
///
/// Metadata is copied verbatim from the parent [`Document`]; the chunk has
/// an independent lifetime once created. `hash` is a SHA-256 of the text.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub source: String,
    pub page: Option<u32>,
    pub chunk_index: i64,
    pub text: String,
    pub hash: String,
}

impl Chunk {
    pub fn new(parent: &Document, chunk_index: i64, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        Chunk {
            id: Uuid::new_v4().to_string(),
            source: parent.source.clone(),
            page: parent.page,
            chunk_index,
            text: text.to_string(),
            hash,
        }
    }
}

/// An index entry returned by similarity search, best-first.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
    /// Cosine similarity against the query embedding.
    pub score: f32,
}

/// A synthesized answer plus its deduplicated source citations.
///
/// `grounded` is false when retrieval produced no context; the answer text
/// still comes from the generation service but is not backed by the corpus.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<String>,
    pub grounded: bool,
}
