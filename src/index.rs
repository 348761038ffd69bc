use crate::chunking::TextChunk;
use crate::embeddings::{EmbeddedChunk, Embedding};
use crate::error::IndexError;

/// Number of chunks retrieved for each question
pub const DEFAULT_TOP_K: usize = 4;

/// A retrieved chunk and its similarity to the query
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: TextChunk,
    pub score: f32,
}

/// In-memory vector index scoped to a single document.
///
/// Entries are kept in insertion order, which is also the tie-break order
/// for equal similarity scores.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<EmbeddedChunk>,
}

impl VectorIndex {
    pub fn new() -> Self {
        VectorIndex::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension of the stored entries, if any
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.dimension())
    }

    /// Append chunks. Duplicates are not detected.
    pub fn add(&mut self, chunks: Vec<EmbeddedChunk>) -> Result<(), IndexError> {
        let expected = self
            .dimension()
            .or_else(|| chunks.first().map(|e| e.embedding.dimension()));

        if let Some(expected) = expected {
            if let Some(bad) = chunks
                .iter()
                .find(|e| e.embedding.dimension() != expected)
            {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    found: bad.embedding.dimension(),
                });
            }
        }

        self.entries.extend(chunks);
        Ok(())
    }

    /// Return the `limit` chunks most similar to `query_embedding`, best first
    pub fn search(
        &self,
        query_embedding: &Embedding,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, IndexError> {
        if self.entries.is_empty() {
            return Err(IndexError::Empty);
        }
        if let Some(expected) = self.dimension() {
            if query_embedding.dimension() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    found: query_embedding.dimension(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                (
                    idx,
                    cosine_similarity(&query_embedding.values, &entry.embedding.values),
                )
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(idx, score)| ScoredChunk {
                chunk: self.entries[idx].chunk.clone(),
                score,
            })
            .collect())
    }
}

/// Cosine similarity; zero when either vector has no magnitude and negative
/// infinity when either holds non-finite values
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    let similarity = dot_product / denominator;
    if similarity.is_finite() {
        similarity
    } else {
        f32::NEG_INFINITY
    }
}
