use crate::cache::{fingerprint, IndexCache};
use crate::document::DocumentLoader;
use crate::error::GenerationError;
use crate::index::VectorIndex;
use crate::parsers::{ArtifactParser, Flashcard, KeyConcept, PermissiveParser, Quiz};
use crate::rag::RagPipeline;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Question used for every key-concepts request, whatever the caller passes
pub const KEY_CONCEPTS_PROMPT: &str = "Generate me the key points of the document and a short description for each key point. Give me response in the following format: Name of Key Point 1: Description 1\n\n Name of Key Point 2: Description 2\n\n Name of Key Point 3: Description 3 etc. Don't give me any other text or extra strings. Just give me the response in the format I asked. Always generate atleast 3 key points each with a name and description.";

/// Default question for the summary endpoint
pub const SUMMARY_PROMPT: &str = "Generate a detailed summary of the given document in 300 words.";

fn key_concept_detail_prompt(concept: &str) -> String {
    format!("Provide detailed information about the key concept: {}", concept)
}

fn quiz_prompt(concept: &str) -> String {
    format!(
        "Generate 3 quiz questions and answers for the key concept: {}",
        concept
    )
}

fn flashcard_prompt(concept: &str) -> String {
    format!(
        "Generate 10 flashcards (question-answer pairs) for the key concept: {}",
        concept
    )
}

/// Study-artifact generation for a single PDF.
///
/// Each call runs the pipeline for its own question and parses the answer.
/// While the cache TTL is non-zero, the index built for the file is reused
/// by later calls as long as the file content is unchanged.
pub struct GenerationService {
    loader: DocumentLoader,
    pipeline: RagPipeline,
    parser: Arc<dyn ArtifactParser>,
    cache: IndexCache,
}

impl GenerationService {
    pub fn new<P: AsRef<Path>>(file_path: P, pipeline: RagPipeline, cache_ttl: Duration) -> Self {
        GenerationService {
            loader: DocumentLoader::new(file_path),
            pipeline,
            parser: Arc::new(PermissiveParser),
            cache: IndexCache::new(cache_ttl),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn ArtifactParser>) -> Self {
        self.parser = parser;
        self
    }

    async fn index(&self) -> Result<Arc<VectorIndex>, GenerationError> {
        if !self.cache.is_enabled() {
            return Ok(Arc::new(self.pipeline.build_index(&self.loader).await?));
        }

        let key = fingerprint(self.loader.path()).await?;
        if let Some(index) = self.cache.get(&key).await {
            info!("Reusing index for {}", self.loader.path().display());
            return Ok(index);
        }

        let index = Arc::new(self.pipeline.build_index(&self.loader).await?);
        self.cache.insert(key, index.clone()).await;
        Ok(index)
    }

    async fn ask(&self, question: &str) -> Result<String, GenerationError> {
        let index = self.index().await?;
        self.pipeline.answer(&index, question).await
    }

    pub async fn get_summary(&self, question: &str) -> Result<String, GenerationError> {
        self.ask(question).await
    }

    /// Extract the document's key concepts.
    ///
    /// `_question` is accepted for call-site compatibility but ignored:
    /// [`KEY_CONCEPTS_PROMPT`] is always sent instead.
    pub async fn get_key_concepts(
        &self,
        _question: &str,
    ) -> Result<Vec<KeyConcept>, GenerationError> {
        let answer = self.ask(KEY_CONCEPTS_PROMPT).await?;
        let concepts = self.parser.key_concepts(&answer);
        if concepts.is_empty() {
            warn!("Model answer contained no key concepts in the expected format");
        }
        Ok(concepts)
    }

    pub async fn get_key_concept_details(&self, concept: &str) -> Result<String, GenerationError> {
        let answer = self.ask(&key_concept_detail_prompt(concept)).await?;
        Ok(self.parser.detail(&answer))
    }

    pub async fn generate_quizzes_for_key_concept(
        &self,
        concept: &str,
    ) -> Result<Vec<Quiz>, GenerationError> {
        let answer = self.ask(&quiz_prompt(concept)).await?;
        let quizzes = self.parser.quizzes(&answer);
        if quizzes.is_empty() {
            warn!("Model answer contained no quizzes for {}", concept);
        }
        Ok(quizzes)
    }

    pub async fn generate_flashcards_for_key_concept(
        &self,
        concept: &str,
    ) -> Result<Vec<Flashcard>, GenerationError> {
        let answer = self.ask(&flashcard_prompt(concept)).await?;
        let flashcards = self.parser.flashcards(&answer);
        if flashcards.is_empty() {
            warn!("Model answer contained no flashcards for {}", concept);
        }
        Ok(flashcards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::document::PageText;
    use crate::error::{LoadError, Stage};
    use crate::testing::{KeywordEmbedder, ScriptedModel};

    fn service_for(
        path: &Path,
        model: Arc<ScriptedModel>,
        embedder: Arc<KeywordEmbedder>,
        ttl: Duration,
    ) -> GenerationService {
        let pipeline = RagPipeline::new(embedder, model, &PipelineConfig::default());
        GenerationService::new(path, pipeline, ttl)
    }

    #[test]
    fn test_concept_prompts() {
        assert_eq!(
            quiz_prompt("TF-IDF"),
            "Generate 3 quiz questions and answers for the key concept: TF-IDF"
        );
        assert_eq!(
            flashcard_prompt("TF-IDF"),
            "Generate 10 flashcards (question-answer pairs) for the key concept: TF-IDF"
        );
        assert_eq!(
            key_concept_detail_prompt("TF-IDF"),
            "Provide detailed information about the key concept: TF-IDF"
        );
    }

    #[tokio::test]
    async fn test_missing_file_fails_every_call_at_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.pdf");
        let embedder = Arc::new(KeywordEmbedder::new(&["a"]));
        let model = Arc::new(ScriptedModel::new("x"));

        for ttl in [Duration::ZERO, Duration::from_secs(60)] {
            let service = service_for(&path, model.clone(), embedder.clone(), ttl);
            let err = service.get_summary("summarize").await.unwrap_err();
            assert_eq!(err.stage(), Stage::Loading);
            assert!(matches!(err, GenerationError::Load(LoadError::NotFound(_))));

            let err = service.get_key_concepts("ignored").await.unwrap_err();
            assert_eq!(err.stage(), Stage::Loading);
        }
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_a_load_error() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        std::fs::write(file.path(), "hello").unwrap();
        let service = service_for(
            file.path(),
            Arc::new(ScriptedModel::new("x")),
            Arc::new(KeywordEmbedder::new(&["a"])),
            Duration::ZERO,
        );

        let err = service.generate_quizzes_for_key_concept("x").await.unwrap_err();
        assert!(matches!(err, GenerationError::Load(LoadError::InvalidPdf { .. })));
    }

    // The facade methods below are driven through a pre-built index so the
    // parsing and prompt wiring can be checked without a real PDF.
    async fn seeded_service(reply: &str) -> (GenerationService, Arc<ScriptedModel>, tempfile::NamedTempFile) {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        std::fs::write(file.path(), "%PDF-1.4 fixture").unwrap();

        let model = Arc::new(ScriptedModel::new(reply));
        let embedder = Arc::new(KeywordEmbedder::new(&["retrieval", "vector"]));
        let service = service_for(file.path(), model.clone(), embedder, Duration::from_secs(60));

        let pages = vec![PageText {
            document_id: "fixture.pdf".to_string(),
            page_index: 0,
            text: "Retrieval augmented generation ranks vector matches.".to_string(),
        }];
        let index = service.pipeline.index_pages(&pages).await.unwrap();
        let key = fingerprint(file.path()).await.unwrap();
        service.cache.insert(key, Arc::new(index)).await;

        (service, model, file)
    }

    #[tokio::test]
    async fn test_key_concepts_ignore_caller_question() {
        let (service, model, _file) =
            seeded_service("Here you go\n\nRetrieval: finding chunks\nVectors: numbers").await;

        let concepts = service.get_key_concepts("my own question").await.unwrap();

        assert_eq!(concepts.len(), 2);
        assert_eq!(concepts[0].key_concept, "Retrieval");
        assert_eq!(concepts[1].description, "numbers");
        assert_eq!(model.prompts()[0].question, KEY_CONCEPTS_PROMPT);
    }

    #[tokio::test]
    async fn test_summary_and_detail_return_trimmed_text() {
        let (service, model, _file) = seeded_service("\n A summary: of things. \n").await;

        assert_eq!(
            service.get_summary(SUMMARY_PROMPT).await.unwrap(),
            "A summary: of things."
        );
        assert_eq!(
            service.get_key_concept_details("vectors").await.unwrap(),
            "A summary: of things."
        );
        let prompts = model.prompts();
        assert_eq!(prompts[0].question, SUMMARY_PROMPT);
        assert_eq!(prompts[1].question, key_concept_detail_prompt("vectors"));
        assert_eq!(
            prompts[0].context,
            "Retrieval augmented generation ranks vector matches."
        );
    }

    #[tokio::test]
    async fn test_quizzes_and_flashcards_are_parsed() {
        let (service, _model, _file) = seeded_service("Q1: A1\n\nno colon\n\nQ2: A2: more").await;

        let quizzes = service.generate_quizzes_for_key_concept("vectors").await.unwrap();
        assert_eq!(
            quizzes,
            vec![Quiz::with_answer("Q1", "A1"), Quiz::with_answer("Q2", "A2: more")]
        );

        let cards = service
            .generate_flashcards_for_key_concept("vectors")
            .await
            .unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].answer, "A2: more");
    }

    #[tokio::test]
    async fn test_off_format_answer_is_an_empty_result() {
        let (service, _model, _file) = seeded_service("I cannot help with that").await;

        assert!(service.get_key_concepts("").await.unwrap().is_empty());
        assert!(service
            .generate_quizzes_for_key_concept("x")
            .await
            .unwrap()
            .is_empty());
    }

    /// Ignores the model output and records what it was given
    struct FixedParser {
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl ArtifactParser for FixedParser {
        fn key_concepts(&self, raw: &str) -> Vec<KeyConcept> {
            self.seen.lock().unwrap().push(raw.to_string());
            vec![KeyConcept {
                key_concept: "Fixed".to_string(),
                description: "from the custom parser".to_string(),
            }]
        }

        fn quizzes(&self, raw: &str) -> Vec<Quiz> {
            self.seen.lock().unwrap().push(raw.to_string());
            vec![Quiz::with_options("Pick one", vec!["a".into(), "b".into()])]
        }

        fn flashcards(&self, _raw: &str) -> Vec<Flashcard> {
            Vec::new()
        }

        fn detail(&self, raw: &str) -> String {
            raw.to_uppercase()
        }
    }

    #[tokio::test]
    async fn test_custom_parser_replaces_default() {
        let (service, _model, _file) = seeded_service("  raw model answer ").await;
        let parser = Arc::new(FixedParser {
            seen: std::sync::Mutex::new(Vec::new()),
        });
        let service = service.with_parser(parser.clone());

        let concepts = service.get_key_concepts("").await.unwrap();
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].key_concept, "Fixed");

        let quizzes = service.generate_quizzes_for_key_concept("x").await.unwrap();
        assert_eq!(
            quizzes,
            vec![Quiz::with_options("Pick one", vec!["a".into(), "b".into()])]
        );

        assert_eq!(
            service.get_key_concept_details("x").await.unwrap(),
            "RAW MODEL ANSWER"
        );
        assert_eq!(
            *parser.seen.lock().unwrap(),
            vec!["raw model answer".to_string(), "raw model answer".to_string()]
        );
    }

    #[tokio::test]
    async fn test_changed_file_is_not_served_from_cache() {
        let (service, model, file) = seeded_service("Q: A").await;
        std::fs::write(file.path(), "changed, and no longer a pdf").unwrap();

        let err = service.get_summary("again").await.unwrap_err();

        assert!(matches!(err, GenerationError::Load(LoadError::InvalidPdf { .. })));
        assert!(model.prompts().is_empty());
    }
}
