use crate::config::GeminiConfig;
use crate::embeddings::{Embedding, EmbeddingProvider};
use crate::error::ProviderError;
use crate::llm::{LanguageModel, Prompt};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

/// Gemini accepts at most this many texts per batchEmbedContents call
const MAX_BATCH_SIZE: usize = 100;

/// Client for interacting with Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> Self {
        let client = reqwest::Client::new();
        GeminiClient { config, client }
    }

    fn method_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/{}:{}?key={}",
            self.config.api_base.trim_end_matches('/'),
            model,
            method,
            self.config.api_key
        )
    }

    async fn post<Req, Resp>(&self, url: &str, request: &Req) -> Result<Resp, ProviderError>
    where
        Req: Serialize + ?Sized,
        Resp: for<'de> Deserialize<'de>,
    {
        let response = self.client.post(url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::HttpStatus { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn embed_group(&self, texts: &[String]) -> Result<Vec<Embedding>, ProviderError> {
        let model = self.config.embedding_model.as_str();
        let request = BatchEmbeddingRequest {
            requests: texts
                .iter()
                .map(|text| EmbeddingRequest {
                    model,
                    content: Content::new(text),
                })
                .collect(),
        };

        let url = self.method_url(model, "batchEmbedContents");
        let response: BatchEmbeddingResponse = self.post(&url, &request).await?;

        Ok(response
            .embeddings
            .into_iter()
            .map(|data| Embedding {
                values: data.values,
            })
            .collect())
    }

    /// Generate text using the configured Gemini model
    pub async fn generate_text(
        &self,
        prompt: &str,
        temperature: f32,
        top_p: f32,
        top_k: i32,
        max_output_tokens: i32,
    ) -> Result<String, ProviderError> {
        let model = self.config.generate_model.as_str();
        let request = GenerateRequest {
            contents: vec![Content::new_with_role(prompt, "user")],
            generation_config: GenerationConfig {
                temperature,
                top_p,
                top_k,
                max_output_tokens,
            },
        };

        debug!("Gemini generateContent, prompt_len={}", prompt.len());
        let url = self.method_url(model, "generateContent");
        let response: GenerateResponse = self.post(&url, &request).await?;
        response.into_text()
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        let model = self.config.embedding_model.as_str();
        let request = EmbeddingRequest {
            model,
            content: Content::new(text),
        };

        let url = self.method_url(model, "embedContent");
        let response: EmbeddingResponse = self.post(&url, &request).await?;

        Ok(Embedding {
            values: response.embedding.values,
        })
    }

    fn batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, ProviderError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for group in texts.chunks(MAX_BATCH_SIZE) {
            debug!("Gemini batchEmbedContents, {} texts", group.len());
            embeddings.extend(self.embed_group(group).await?);
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        self.generate_text(&prompt.render(), 0.2, 0.8, 40, 2048).await
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Serialize)]
struct BatchEmbeddingRequest<'a> {
    requests: Vec<EmbeddingRequest<'a>>,
}

#[derive(Deserialize, Debug)]
struct EmbeddingResponse {
    embedding: EmbeddingData,
}

#[derive(Deserialize, Debug)]
struct BatchEmbeddingResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct EmbeddingData {
    values: Vec<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
}

impl<'a> Content<'a> {
    fn new(text: &'a str) -> Self {
        Content {
            parts: vec![Part { text }],
            role: None,
        }
    }

    fn new_with_role(text: &'a str, role: &'static str) -> Self {
        Content {
            parts: vec![Part { text }],
            role: Some(role),
        }
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate
    fn into_text(self) -> Result<String, ProviderError> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[derive(Deserialize, Debug)]
struct Candidate {
    // Absent when the candidate was blocked
    #[serde(default)]
    content: ResponseContent,
}

#[derive(Deserialize, Debug, Default)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: String,
}
