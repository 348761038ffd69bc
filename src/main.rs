use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::info;
use std::sync::Arc;

use study_rag::config::{AppConfig, LlmProvider};
use study_rag::embeddings::EmbeddingProvider;
use study_rag::gemini::GeminiClient;
use study_rag::groq::GroqClient;
use study_rag::http::{self, AppState};
use study_rag::llm::LanguageModel;
use study_rag::rag::RagPipeline;

/// Study-artifact generator: upload a PDF, get a summary, key concepts, quizzes and flashcards
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDRESS")]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    // Load configuration from environment
    let config = AppConfig::from_env().context("Invalid configuration")?;

    let gemini = GeminiClient::new(config.gemini.clone());
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(gemini.clone());
    let model: Arc<dyn LanguageModel> = match config.llm_provider {
        LlmProvider::Gemini => Arc::new(gemini),
        LlmProvider::Groq => {
            let groq = config.groq.clone().context("Missing Groq configuration")?;
            Arc::new(GroqClient::new(groq))
        }
    };
    info!(
        "Using {:?} for generation, {} for embeddings",
        config.llm_provider, config.gemini.embedding_model
    );

    let pipeline = RagPipeline::new(embedder, model, &config.pipeline);
    let state = AppState::new(pipeline, config.pipeline.index_cache_ttl);
    let app = http::router(state, &config.cors_allowed_origin)
        .context("Invalid CORS_ALLOWED_ORIGIN")?;

    let addr = args.addr.unwrap_or_else(|| config.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(http::shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
