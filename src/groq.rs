//! Chat completions against an OpenAI-compatible endpoint (Groq by default).
//!
//! Only `POST {api_base}/v1/chat/completions` is used, non-streaming.

use crate::config::GroqConfig;
use crate::error::ProviderError;
use crate::llm::{LanguageModel, Prompt};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct GroqClient {
    config: GroqConfig,
    client: reqwest::Client,
    url_chat: String,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> Self {
        let url_chat = format!(
            "{}/v1/chat/completions",
            config.api_base.trim_end_matches('/')
        );
        GroqClient {
            config,
            client: reqwest::Client::new(),
            url_chat,
        }
    }

    pub async fn chat(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.2,
        };

        debug!(
            "POST {} model={} prompt_len={}",
            self.url_chat,
            self.config.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.url_chat)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::HttpStatus { status, body });
        }

        let out: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        out.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        self.chat(&prompt.render()).await
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}
