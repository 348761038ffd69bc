use crate::chunking::TextSegmenter;
use crate::config::PipelineConfig;
use crate::document::{DocumentLoader, PageText};
use crate::embeddings::{embed_texts, EmbeddedChunk, EmbeddingProvider};
use crate::error::{GenerationError, ProviderError, Stage};
use crate::index::{VectorIndex, DEFAULT_TOP_K};
use crate::llm::{LanguageModel, Prompt};
use log::{debug, info};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Separator between retrieved chunks in the prompt context
const CONTEXT_SEPARATOR: &str = "\n\n";

/// RAG (Retrieval-Augmented Generation) pipeline.
///
/// Runs load → segment → embed → index for a document, then retrieve →
/// generate for a question. Stages run strictly in sequence and the first
/// failure aborts the rest.
#[derive(Clone)]
pub struct RagPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    model: Arc<dyn LanguageModel>,
    segmenter: TextSegmenter,
    top_k: usize,
    embed_timeout: Duration,
    llm_timeout: Duration,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn LanguageModel>,
        config: &PipelineConfig,
    ) -> Self {
        RagPipeline {
            embedder,
            model,
            segmenter: TextSegmenter::default(),
            top_k: DEFAULT_TOP_K,
            embed_timeout: config.embed_timeout,
            llm_timeout: config.llm_timeout,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Load a document and build a fresh index over it
    pub async fn build_index(&self, loader: &DocumentLoader) -> Result<VectorIndex, GenerationError> {
        info!("{}: {}", Stage::Loading, loader.path().display());
        let pages = loader.load().await?;
        self.index_pages(&pages).await
    }

    /// Segment, embed and index already-loaded pages
    pub async fn index_pages(&self, pages: &[PageText]) -> Result<VectorIndex, GenerationError> {
        let chunks = self.segmenter.split_pages(pages);
        info!(
            "{}: split {} pages into {} chunks",
            Stage::Segmenting,
            pages.len(),
            chunks.len()
        );

        // One timeout per provider call, not for the whole stage
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for group in texts.chunks(self.embedder.batch_size().max(1)) {
            let batch = guarded(
                Stage::Embedding,
                self.embed_timeout,
                embed_texts(self.embedder.as_ref(), group),
            )
            .await?;
            embeddings.extend(batch);
        }
        debug!("{}: embedded {} chunks", Stage::Embedding, embeddings.len());

        let embedded: Vec<EmbeddedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding })
            .collect();

        let mut index = VectorIndex::new();
        index
            .add(embedded)
            .map_err(|source| GenerationError::Index {
                stage: Stage::Indexed,
                source,
            })?;
        info!("{}: {} entries", Stage::Indexed, index.len());

        Ok(index)
    }

    /// Retrieve context for `question` from `index` and ask the model.
    ///
    /// Returns the model's raw answer with surrounding whitespace trimmed.
    pub async fn answer(
        &self,
        index: &VectorIndex,
        question: &str,
    ) -> Result<String, GenerationError> {
        let question_embedding = guarded(
            Stage::Retrieving,
            self.embed_timeout,
            self.embedder.embed(question),
        )
        .await?;

        let retrieved = index
            .search(&question_embedding, self.top_k)
            .map_err(|source| GenerationError::Index {
                stage: Stage::Retrieving,
                source,
            })?;
        info!("{}: {} chunks", Stage::Retrieving, retrieved.len());

        // Create context from chunks, best match first
        let context = retrieved
            .iter()
            .map(|scored| scored.chunk.text.as_str())
            .collect::<Vec<&str>>()
            .join(CONTEXT_SEPARATOR);

        let prompt = Prompt::new(question, context);
        let answer = guarded(
            Stage::Generating,
            self.llm_timeout,
            self.model.complete(&prompt),
        )
        .await?;
        debug!("{}: {} chars", Stage::Generating, answer.len());

        Ok(answer.trim().to_string())
    }

    /// Run every stage for one question against the document behind `loader`
    pub async fn run(
        &self,
        loader: &DocumentLoader,
        question: &str,
    ) -> Result<String, GenerationError> {
        let index = self.build_index(loader).await?;
        self.answer(&index, question).await
    }
}

/// Await a provider call under a timeout, tagging failures with `stage`
async fn guarded<T, F>(stage: Stage, after: Duration, call: F) -> Result<T, GenerationError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(GenerationError::Provider { stage, source }),
        Err(_) => Err(GenerationError::Timeout { stage, after }),
    }
}
