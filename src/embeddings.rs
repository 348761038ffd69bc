use crate::chunking::TextChunk;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Representation of a vector embedding
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Embedding { values }
    }
}

/// A chunk together with the embedding of its text
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: TextChunk,
    pub embedding: Embedding,
}

/// Turns text into fixed-dimension vectors.
///
/// Implementations are shared between concurrent requests.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError>;

    /// Largest number of texts sent to [`EmbeddingProvider::embed_batch`] at once.
    ///
    /// Each batch is one provider call and gets its own timeout.
    fn batch_size(&self) -> usize {
        1
    }

    /// Embed several texts, returning one embedding per input in input order.
    ///
    /// The default issues one call per text; providers with a batch endpoint
    /// should override it together with `batch_size`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, ProviderError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

/// Embed one group of texts, checking the provider answered for every text
pub async fn embed_texts(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
) -> Result<Vec<Embedding>, ProviderError> {
    let embeddings = provider.embed_batch(texts).await?;

    if embeddings.len() != texts.len() {
        return Err(ProviderError::Decode(format!(
            "expected {} embeddings, received {}",
            texts.len(),
            embeddings.len()
        )));
    }

    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::KeywordEmbedder;

    struct ShortBatch;

    #[async_trait]
    impl EmbeddingProvider for ShortBatch {
        async fn embed(&self, _text: &str) -> Result<Embedding, ProviderError> {
            Ok(Embedding::from(vec![1.0]))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Embedding>, ProviderError> {
            Ok(vec![Embedding::from(vec![1.0])])
        }
    }

    #[tokio::test]
    async fn test_embed_texts_preserves_order() {
        let embedder = KeywordEmbedder::new(&["apple", "pear"]);
        let texts = vec!["apple apple".to_string(), "pear".to_string()];

        let embeddings = embed_texts(&embedder, &texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].values, vec![2.0, 0.0]);
        assert_eq!(embeddings[1].values, vec![0.0, 1.0]);
        assert_eq!(embedder.batch_size(), 1);
    }

    #[tokio::test]
    async fn test_embed_texts_rejects_short_batch() {
        let texts = vec!["a".to_string(), "b".to_string()];
        let err = embed_texts(&ShortBatch, &texts).await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }
}
