use crate::error::ProviderError;
use async_trait::async_trait;

/// Question plus the retrieved document context it should be answered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub question: String,
    pub context: String,
}

impl Prompt {
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Prompt {
            question: question.into(),
            context: context.into(),
        }
    }

    /// Render the prompt as a single user message
    pub fn render(&self) -> String {
        format!(
            "You are an assistant for question-answering tasks. Use the following pieces of \
             retrieved context to answer the question. If you don't know the answer, just say \
             that you don't know.\nQuestion: {}\nContext: {}\nAnswer:",
            self.question, self.context
        )
    }
}

/// Generates free text for a prompt.
///
/// Latency is unbounded; callers wrap calls in a timeout.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, ProviderError>;
}
